//! Snapshots of platform events as seen by listeners.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A description of the element an event originated from.
///
/// Only descriptive strings are kept; a live element handle is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementRef {
    /// Tag name as reported by the host (any case).
    pub tag_name: Option<String>,
    /// Element id attribute, if any.
    pub id: Option<String>,
    /// Class list in document order.
    #[serde(default)]
    pub class_list: Vec<String>,
}

impl ElementRef {
    /// Creates a descriptor for an element with the given tag name.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            id: None,
            class_list: Vec::new(),
        }
    }

    /// Sets the id attribute.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Appends classes to the class list.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_list.extend(classes.into_iter().map(Into::into));
        self
    }

    /// Renders `tag#id.class1.class2`, with the tag lowercased.
    ///
    /// Returns `None` when the host did not report a tag name.
    pub fn describe(&self) -> Option<String> {
        let tag = self.tag_name.as_deref().filter(|t| !t.is_empty())?;
        let mut out = tag.to_lowercase();
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            out.push('#');
            out.push_str(id);
        }
        for class in self.class_list.iter().filter(|c| !c.is_empty()) {
            out.push('.');
            out.push_str(class);
        }
        Some(out)
    }
}

/// A platform event delivered to a listener.
///
/// The host copies whatever properties it can read into `props`; consumers
/// must treat every property as optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostEvent {
    name: String,
    time_stamp: Option<f64>,
    origin: Option<ElementRef>,
    #[serde(default)]
    props: BTreeMap<String, Value>,
}

impl HostEvent {
    /// Creates an event of the given category with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the host timestamp (milliseconds since page start).
    pub fn at(mut self, time_stamp: f64) -> Self {
        self.time_stamp = Some(time_stamp);
        self
    }

    /// Adds a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Sets the originating element.
    pub fn with_origin(mut self, origin: ElementRef) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The event category, e.g. `keydown`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_stamp(&self) -> Option<f64> {
        self.time_stamp
    }

    pub fn origin(&self) -> Option<&ElementRef> {
        self.origin.as_ref()
    }

    /// Returns a raw property, if the host supplied it.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.prop(key).and_then(Value::as_str)
    }

    pub fn f64_prop(&self, key: &str) -> Option<f64> {
        self.prop(key).and_then(Value::as_f64)
    }

    pub fn i64_prop(&self, key: &str) -> Option<i64> {
        self.prop(key).and_then(Value::as_i64)
    }

    /// Reads a boolean flag, treating an absent property as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.prop(key).and_then(Value::as_bool).unwrap_or(false)
    }
}
