use std::sync::Arc;

use eventdock::config::{StorageBackend, StorageConfig};
use eventdock::{
    DockError, EventDock, ExportPipeline, HostSnapshot, LocalEventSource, Registry,
    SimulatedHost, DEFAULT_CAPTURE,
};
use eventdock_log::{MemorySlot, StoreEvent};
use eventdock_share::{parse_payload, MemoryClipboard, ShareKind};
use eventdock_types::{DockConfig, EventTarget, HostEvent, SlotStorage};
use serde_json::json;

struct Harness {
    source: Arc<LocalEventSource>,
    host: Arc<SimulatedHost>,
    registry: Registry,
    slot: Arc<MemorySlot>,
}

impl Harness {
    fn new() -> Self {
        let source = Arc::new(LocalEventSource::new());
        Self {
            registry: Registry::new(source.clone()),
            source,
            host: Arc::new(SimulatedHost::default()),
            slot: Arc::new(MemorySlot::new()),
        }
    }

    fn dock(&self, config: DockConfig) -> EventDock {
        self.dock_with(config, ExportPipeline::new())
    }

    fn dock_with(&self, config: DockConfig, pipeline: ExportPipeline) -> EventDock {
        EventDock::create(
            config,
            self.registry.clone(),
            self.host.clone(),
            self.slot.clone(),
            pipeline,
        )
        .expect("dock should be created")
    }
}

fn quiet() -> DockConfig {
    DockConfig {
        capture_defaults: false,
        ..DockConfig::default()
    }
}

#[test]
fn default_capture_records_host_events() {
    let h = Harness::new();
    let dock = h.dock(DockConfig::default());

    assert_eq!(h.source.listener_count(EventTarget::Document, "click"), 1);
    assert_eq!(h.source.listener_count(EventTarget::Window, "beforeunload"), 1);
    // Connection tracking plus capture.
    assert_eq!(h.source.listener_count(EventTarget::Window, "online"), 2);

    h.source.dispatch(
        EventTarget::Window,
        &HostEvent::new("keydown").at(12.0).with("key", "a"),
    );
    h.source.dispatch(EventTarget::Document, &HostEvent::new("click"));

    let kinds: Vec<_> = dock.get_all().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec!["keydown", "click"]);
    assert_eq!(
        dock.get_all()[0].payload,
        Some(json!({"type": "keydown", "timeStamp": 12.0, "key": "a"}))
    );
}

#[test]
fn capture_list_matches_targets_and_phases() {
    assert_eq!(DEFAULT_CAPTURE.len(), 28);
    let click = DEFAULT_CAPTURE
        .iter()
        .find(|s| s.event == "click")
        .expect("click captured");
    assert_eq!((click.target, click.capture), (EventTarget::Document, true));
    let error = DEFAULT_CAPTURE
        .iter()
        .find(|s| s.event == "error")
        .expect("error captured");
    assert_eq!((error.target, error.capture), (EventTarget::Window, true));
    let scroll = DEFAULT_CAPTURE
        .iter()
        .find(|s| s.event == "scroll")
        .expect("scroll captured");
    assert_eq!((scroll.target, scroll.capture), (EventTarget::Window, false));
}

#[test]
fn count_limit_keeps_most_recent() {
    let h = Harness::new();
    let dock = h.dock(DockConfig {
        max_entries: 3,
        ..quiet()
    });

    for s in ["A", "B", "C", "D"] {
        dock.add_log(s);
    }

    let summaries: Vec<_> = dock.get_all().into_iter().map(|e| e.summary).collect();
    assert_eq!(summaries, vec!["B", "C", "D"]);
}

#[test]
fn badge_counts_unread_and_resets() {
    let h = Harness::new();
    let dock = h.dock(quiet());

    assert_eq!(dock.badge_label(), "");
    dock.add_log("one");
    dock.add_log("two");
    assert_eq!(dock.unread(), 2);
    assert_eq!(dock.badge_label(), "2");

    dock.open();
    assert!(dock.is_open());
    assert_eq!(dock.unread(), 0);

    for i in 0..120 {
        dock.add_log(format!("burst {i}"));
    }
    assert_eq!(dock.badge_label(), "99+");

    dock.clear();
    assert!(dock.is_empty());
    assert_eq!(dock.unread(), 0);
    assert_eq!(dock.badge_label(), "");
}

#[test]
fn disabled_badge_never_counts() {
    let h = Harness::new();
    let dock = h.dock(DockConfig {
        show_badge: false,
        ..quiet()
    });
    dock.add_log("ignored by the badge");
    assert_eq!(dock.unread(), 0);
    assert_eq!(dock.len(), 1);
}

#[test]
fn loaded_entries_start_unread() {
    let h = Harness::new();
    {
        let dock = h.dock(quiet());
        dock.add_log("from last session");
        dock.add_log("also old");
    }
    let dock = h.dock(quiet());
    assert_eq!(dock.len(), 2);
    assert_eq!(dock.unread(), 2);
}

#[test]
fn toggle_and_escape_close() {
    let h = Harness::new();
    let dock = h.dock(quiet());

    assert!(dock.toggle());
    h.source.dispatch(
        EventTarget::Document,
        &HostEvent::new("keydown").with("key", "Enter"),
    );
    assert!(dock.is_open());

    h.source.dispatch(
        EventTarget::Document,
        &HostEvent::new("keydown").with("key", "Escape"),
    );
    assert!(!dock.is_open());
    assert!(dock.toggle());
    assert!(!dock.toggle());
}

#[test]
fn tracks_connection_status() {
    let h = Harness::new();
    h.host.update(|s| s.online = false);
    let dock = h.dock(quiet());
    assert!(!dock.is_online());

    h.source.dispatch(EventTarget::Window, &HostEvent::new("online"));
    assert!(dock.is_online());
    h.source.dispatch(EventTarget::Window, &HostEvent::new("offline"));
    assert!(!dock.is_online());
    assert!(dock.is_empty(), "tracking alone does not log");
}

#[test]
fn dispose_all_detaches_every_listener() {
    let h = Harness::new();
    let dock = h.dock(DockConfig::default());
    let attached = h.source.total_listeners();
    assert_eq!(attached, DEFAULT_CAPTURE.len() + 3);

    assert_eq!(dock.dispose_all(), attached);
    assert_eq!(h.source.total_listeners(), 0);
    assert_eq!(dock.dispose_all(), 0);

    h.source.dispatch(EventTarget::Document, &HostEvent::new("click"));
    assert!(dock.is_empty());
}

#[test]
fn dropping_the_dock_releases_listeners() {
    let h = Harness::new();
    let dock = h.dock(DockConfig::default());
    assert!(h.source.total_listeners() > 0);
    drop(dock);
    assert_eq!(h.source.total_listeners(), 0);
    assert!(h.registry.is_empty());
}

#[test]
fn capture_failure_rolls_back_everything() {
    let h = Harness::new();
    h.source.reject("touchend");

    let err = EventDock::create(
        DockConfig::default(),
        h.registry.clone(),
        h.host.clone(),
        h.slot.clone(),
        ExportPipeline::new(),
    )
    .expect_err("attach should fail");

    assert!(matches!(err, DockError::Attach(_)));
    assert_eq!(h.source.total_listeners(), 0);
    assert!(h.registry.is_empty());
}

#[test]
fn zero_limits_are_rejected() {
    let h = Harness::new();
    let err = EventDock::create(
        DockConfig {
            max_bytes: 0,
            ..quiet()
        },
        h.registry.clone(),
        h.host.clone(),
        h.slot.clone(),
        ExportPipeline::new(),
    )
    .expect_err("zero byte limit");
    assert!(matches!(err, DockError::Limits(_)));
    assert_eq!(h.source.total_listeners(), 0);
}

#[test]
fn appends_persist_under_the_configured_key() {
    let h = Harness::new();
    let dock = h.dock(DockConfig {
        storage_key: "tests:dock".into(),
        ..quiet()
    });
    dock.add_log("saved");

    let raw = h.slot.read("tests:dock").unwrap().expect("slot written");
    assert_eq!(parse_payload(&raw).unwrap(), dock.get_all());
    assert_eq!(h.slot.get("kibEventDock:logs:v1"), None);
}

#[test]
fn subscribers_see_dock_appends() {
    let h = Harness::new();
    let dock = h.dock(quiet());
    let mut rx = dock.subscribe();

    let outcome = dock.add_log("watched");
    dock.clear();

    assert_eq!(
        rx.try_recv().unwrap(),
        StoreEvent::Appended {
            entry_id: outcome.entry.id,
            total: 1
        }
    );
    assert_eq!(rx.try_recv().unwrap(), StoreEvent::Cleared);
}

#[test]
fn export_round_trips() {
    let h = Harness::new();
    let dock = h.dock(quiet());
    dock.add_log("text");
    dock.add_log(json!({"type": "metric", "payload": {"v": 1}}));
    dock.add_log(HostEvent::new("pageshow").at(3.5));

    let payload = dock.export_payload().unwrap();
    assert!(payload.starts_with("[\n  {"));
    assert_eq!(parse_payload(&payload).unwrap(), dock.get_all());
}

#[tokio::test]
async fn share_falls_back_to_clipboard() {
    let h = Harness::new();
    let clipboard = Arc::new(MemoryClipboard::new());
    let dock = h.dock_with(
        quiet(),
        ExportPipeline::new().with_clipboard(clipboard.clone()),
    );
    dock.add_log("shared entry");

    let outcome = dock.share(true).await;

    assert_eq!(outcome.channel, ShareKind::Clipboard);
    assert!(outcome.ok);
    assert_eq!(clipboard.contents(), Some(dock.export_payload().unwrap()));
}

#[test]
fn sqlite_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageConfig {
        backend: StorageBackend::Sqlite,
        path: dir.path().join("dock.db").to_str().unwrap().to_string(),
        ..StorageConfig::default()
    };
    let source = Arc::new(LocalEventSource::new());
    let host = Arc::new(SimulatedHost::new(HostSnapshot::default()));

    let first = {
        let dock = EventDock::create(
            quiet(),
            Registry::new(source.clone()),
            host.clone(),
            storage.open().unwrap(),
            ExportPipeline::new(),
        )
        .unwrap();
        dock.add_log("persisted across restarts");
        dock.get_all()
    };

    let dock = EventDock::create(
        quiet(),
        Registry::new(source),
        host,
        storage.open().unwrap(),
        ExportPipeline::new(),
    )
    .unwrap();
    assert_eq!(dock.get_all(), first);
}
