//! Unit tests for the listener registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use eventdock_types::{EventTarget, HostEvent, ListenerOptions};

use crate::{AttachError, Binding, EventHandler, LocalEventSource, Registry, SubscriptionToken};

fn setup() -> (Arc<LocalEventSource>, Registry) {
    let host = Arc::new(LocalEventSource::new());
    let registry = Registry::new(host.clone());
    (host, registry)
}

fn counting_handler() -> (Arc<AtomicUsize>, EventHandler) {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    (
        count,
        EventHandler::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }),
    )
}

// ── register / unregister ────────────────────────────────────────────

#[test]
fn register_then_unregister_detaches_resize_handler() {
    let (host, registry) = setup();
    let (count, handler) = counting_handler();

    let token = registry
        .register("resize", handler.clone(), EventTarget::Window)
        .expect("register should succeed");
    assert!(host.is_attached(EventTarget::Window, "resize", &handler));

    host.dispatch(EventTarget::Window, &HostEvent::new("resize"));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    assert!(registry.unregister(token));
    assert!(!host.is_attached(EventTarget::Window, "resize", &handler));

    host.dispatch(EventTarget::Window, &HostEvent::new("resize"));
    assert_eq!(count.load(Ordering::SeqCst), 1, "detached handler must not run");
}

#[test]
fn unregister_twice_is_a_noop() {
    let (host, registry) = setup();
    let (_, handler) = counting_handler();

    let token = registry
        .register("scroll", handler, EventTarget::Document)
        .expect("register should succeed");
    assert!(registry.unregister(token));
    assert!(!registry.unregister(token), "second unregister releases nothing");
    assert_eq!(host.total_listeners(), 0);
    assert!(registry.is_empty());
}

#[test]
fn unregister_only_touches_its_own_subscription() {
    let (host, registry) = setup();
    let (_, a) = counting_handler();
    let (_, b) = counting_handler();

    let ta = registry
        .register("keydown", a.clone(), EventTarget::Window)
        .expect("register a");
    let tb = registry
        .register("keydown", b.clone(), EventTarget::Window)
        .expect("register b");
    assert_ne!(ta, tb);

    registry.unregister(ta);
    assert!(!host.is_attached(EventTarget::Window, "keydown", &a));
    assert!(host.is_attached(EventTarget::Window, "keydown", &b));
    assert!(registry.contains(tb));
    assert!(!registry.contains(ta));
}

#[test]
fn tokens_are_never_reused() {
    let (_, registry) = setup();
    let mut seen = Vec::new();
    for _ in 0..5 {
        let (_, handler) = counting_handler();
        let token = registry
            .register("click", handler, EventTarget::Document)
            .expect("register should succeed");
        registry.unregister(token);
        assert!(!seen.contains(&token));
        seen.push(token);
    }
    let raw: Vec<u64> = seen.iter().map(|t| t.as_u64()).collect();
    assert!(raw.windows(2).all(|w| w[0] < w[1]), "tokens increase monotonically");
}

#[test]
fn attach_failure_propagates_and_stores_nothing() {
    let (host, registry) = setup();
    host.reject("beforeunload");
    let (_, handler) = counting_handler();

    let err = registry
        .register("beforeunload", handler, EventTarget::Window)
        .expect_err("attach should fail");
    assert_eq!(
        err,
        AttachError::Rejected {
            event: "beforeunload".into(),
            target: EventTarget::Window,
        }
    );
    assert!(registry.is_empty());
    assert_eq!(host.total_listeners(), 0);
}

#[test]
fn options_are_forwarded_to_host() {
    let (host, registry) = setup();
    let (_, handler) = counting_handler();

    let token = registry
        .register_with("click", handler.clone(), EventTarget::Document, ListenerOptions::CAPTURE)
        .expect("register should succeed");
    assert_eq!(host.listener_count(EventTarget::Document, "click"), 1);

    registry.unregister(token);
    assert_eq!(
        host.listener_count(EventTarget::Document, "click"),
        0,
        "capture listener must be detached with matching options"
    );
}

#[test]
fn duplicate_registration_shares_one_attachment() {
    let (host, registry) = setup();
    let (count, handler) = counting_handler();

    let first = registry
        .register("resize", handler.clone(), EventTarget::Window)
        .expect("first register");
    let second = registry
        .register("resize", handler.clone(), EventTarget::Window)
        .expect("second register");
    assert_ne!(first, second);
    assert_eq!(registry.len(), 2);
    assert_eq!(host.listener_count(EventTarget::Window, "resize"), 1);

    host.dispatch(EventTarget::Window, &HostEvent::new("resize"));
    assert_eq!(count.load(Ordering::SeqCst), 1, "attached once, runs once");

    assert!(registry.unregister(first));
    assert!(registry.contains(second));
    assert!(
        host.is_attached(EventTarget::Window, "resize", &handler),
        "a live token keeps its listener attached"
    );

    assert!(registry.unregister(second));
    assert!(!host.is_attached(EventTarget::Window, "resize", &handler));
    assert!(registry.is_empty());
}

#[test]
fn same_handler_in_other_phase_is_a_separate_attachment() {
    let (host, registry) = setup();
    let (_, handler) = counting_handler();

    let bubble = registry
        .register("click", handler.clone(), EventTarget::Document)
        .expect("bubble register");
    registry
        .register_with("click", handler.clone(), EventTarget::Document, ListenerOptions::CAPTURE)
        .expect("capture register");
    assert_eq!(host.listener_count(EventTarget::Document, "click"), 2);

    registry.unregister(bubble);
    assert_eq!(host.listener_count(EventTarget::Document, "click"), 1);
}

#[test]
fn unregister_all_detaches_shared_listener_once() {
    let (host, registry) = setup();
    let (_, handler) = counting_handler();
    let (_, other) = counting_handler();

    for _ in 0..3 {
        registry
            .register("scroll", handler.clone(), EventTarget::Document)
            .expect("register shared");
    }
    registry
        .register("scroll", other, EventTarget::Document)
        .expect("register other");
    assert_eq!(host.listener_count(EventTarget::Document, "scroll"), 2);

    assert_eq!(registry.unregister_all(), 4);
    assert_eq!(host.total_listeners(), 0);
}

// ── unregister_all ───────────────────────────────────────────────────

#[test]
fn unregister_all_on_empty_registry() {
    let (_, registry) = setup();
    assert_eq!(registry.unregister_all(), 0);
    assert_eq!(registry.unregister_all(), 0);
}

#[test]
fn unregister_all_detaches_everything() {
    let (host, registry) = setup();
    let mut tokens = Vec::new();
    for (event, target) in [
        ("resize", EventTarget::Window),
        ("scroll", EventTarget::Document),
        ("online", EventTarget::Window),
        ("click", EventTarget::Node(4)),
    ] {
        let (_, handler) = counting_handler();
        tokens.push(registry.register(event, handler, target).expect("register"));
    }
    assert_eq!(host.total_listeners(), 4);

    assert_eq!(registry.unregister_all(), 4);
    assert_eq!(host.total_listeners(), 0);
    assert!(registry.is_empty());
    for token in tokens {
        assert!(!registry.unregister(token), "released tokens stay released");
    }
}

// ── re-entrancy ──────────────────────────────────────────────────────

#[test]
fn handler_may_unregister_itself_during_dispatch() {
    let (host, registry) = setup();
    let slot: Arc<Mutex<Option<SubscriptionToken>>> = Arc::new(Mutex::new(None));
    let count = Arc::new(AtomicUsize::new(0));

    let handler = {
        let registry = registry.clone();
        let slot = Arc::clone(&slot);
        let count = Arc::clone(&count);
        EventHandler::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = *slot.lock().unwrap() {
                registry.unregister(token);
            }
        })
    };
    let token = registry
        .register("load", handler, EventTarget::Window)
        .expect("register should succeed");
    *slot.lock().unwrap() = Some(token);

    host.dispatch(EventTarget::Window, &HostEvent::new("load"));
    host.dispatch(EventTarget::Window, &HostEvent::new("load"));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());
}

#[test]
fn handler_may_tear_down_everything_during_dispatch() {
    let (host, registry) = setup();
    let (later_count, later) = counting_handler();

    let teardown = {
        let registry = registry.clone();
        EventHandler::new(move |_| {
            registry.unregister_all();
        })
    };
    registry
        .register("pagehide", teardown, EventTarget::Window)
        .expect("register teardown");
    registry
        .register("pagehide", later, EventTarget::Window)
        .expect("register later");

    let invoked = host.dispatch(EventTarget::Window, &HostEvent::new("pagehide"));
    assert_eq!(invoked, 1, "listener removed mid-dispatch is skipped");
    assert_eq!(later_count.load(Ordering::SeqCst), 0);
    assert_eq!(host.total_listeners(), 0);
}

// ── groups and guards ────────────────────────────────────────────────

#[test]
fn register_all_rolls_back_on_failure() {
    let (host, registry) = setup();
    host.reject("blur");
    let (_, focus) = counting_handler();
    let (_, blur) = counting_handler();

    let err = registry
        .register_all([
            Binding::new("focus", EventTarget::Window, focus),
            Binding::new("blur", EventTarget::Window, blur),
        ])
        .expect_err("group should fail");
    assert!(matches!(err, AttachError::Rejected { .. }));
    assert!(registry.is_empty());
    assert_eq!(host.total_listeners(), 0);
}

#[test]
fn disposer_releases_its_group_once() {
    let (host, registry) = setup();
    let (_, online) = counting_handler();
    let (_, offline) = counting_handler();
    let (_, other) = counting_handler();

    let group = registry
        .register_all([
            Binding::new("online", EventTarget::Window, online),
            Binding::new("offline", EventTarget::Window, offline),
        ])
        .expect("group should register");
    registry
        .register("resize", other, EventTarget::Window)
        .expect("register other");
    assert_eq!(group.tokens().len(), 2);

    assert_eq!(group.dispose(), 2);
    assert_eq!(registry.len(), 1);
    assert_eq!(host.total_listeners(), 1);
}

#[test]
fn disposer_after_unregister_all_releases_nothing() {
    let (_, registry) = setup();
    let (_, handler) = counting_handler();
    let group = registry
        .register_all([Binding::new("copy", EventTarget::Document, handler)])
        .expect("group should register");

    registry.unregister_all();
    assert_eq!(group.dispose(), 0);
}

#[test]
fn guard_releases_on_drop() {
    let (host, registry) = setup();
    let (_, handler) = counting_handler();
    {
        let _guard = registry
            .register_all([Binding::new("drop", EventTarget::Document, handler)])
            .expect("group should register")
            .into_guard();
        assert_eq!(host.total_listeners(), 1);
    }
    assert_eq!(host.total_listeners(), 0);
    assert!(registry.is_empty());
}

#[test]
fn guard_into_inner_keeps_listeners() {
    let (host, registry) = setup();
    let (_, handler) = counting_handler();
    let guard = registry
        .register_all([Binding::new("cut", EventTarget::Document, handler)])
        .expect("group should register")
        .into_guard();

    let disposer = guard.into_inner();
    assert_eq!(host.total_listeners(), 1);
    assert_eq!(disposer.dispose(), 1);
}

#[test]
fn disposer_outliving_registry_is_inert() {
    let host = Arc::new(LocalEventSource::new());
    let (_, handler) = counting_handler();
    let group = {
        let registry = Registry::new(host.clone());
        registry
            .register_all([Binding::new("paste", EventTarget::Document, handler)])
            .expect("group should register")
    };
    assert_eq!(group.dispose(), 0);
}
