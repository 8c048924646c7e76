//! Core types for spark-fiber.
//!
//! These are the values that flow from element descriptions through fibers
//! into the host adapter. The reserved constants here are the contract between
//! the reconciler, the commit phase and every [`HostAdapter`](crate::host::HostAdapter).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Reserved names
// =============================================================================

/// Element kind used for text content.
pub const TEXT_KIND: &str = "TEXT_ELEMENT";

/// Attribute carrying the content of a [`TEXT_KIND`] element.
pub const TEXT_VALUE_KEY: &str = "nodeValue";

/// Attribute keys starting with this prefix are event bindings (`onClick`).
pub const EVENT_PREFIX: &str = "on";

/// Reserved key. Children are never treated as an attribute.
pub const CHILDREN_KEY: &str = "children";

/// Returns true if `key` names an event binding.
#[inline]
pub fn is_event_key(key: &str) -> bool {
    key.len() > EVENT_PREFIX.len() && key.starts_with(EVENT_PREFIX)
}

/// Returns true if `key` names a plain attribute.
#[inline]
pub fn is_plain_key(key: &str) -> bool {
    key != CHILDREN_KEY && !is_event_key(key)
}

/// Host event name for an event-binding key: `onClick` -> `click`.
pub fn event_name(key: &str) -> String {
    key[EVENT_PREFIX.len()..].to_lowercase()
}

// =============================================================================
// Events
// =============================================================================

/// Event delivered by a host to a bound handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Host event name (e.g. "click").
    pub name: String,
    /// Optional payload (e.g. the text of an input).
    pub detail: Option<Value>,
}

impl Event {
    /// Create an event without payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    /// Create an event with payload.
    pub fn with_detail(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail),
        }
    }
}

/// Shared event handler.
///
/// Two callbacks are equal only if they are the same allocation, so a handler
/// recreated on every render counts as changed and gets rebound.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Event)>);

impl Callback {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    /// Pointer identity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// Values
// =============================================================================

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(Callback),
}

impl Value {
    /// Text value, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Handler, if this is one.
    pub fn as_handler(&self) -> Option<&Callback> {
        match self {
            Value::Handler(cb) => Some(cb),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Callback> for Value {
    fn from(cb: Callback) -> Self {
        Value::Handler(cb)
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Attribute map of one element. Ordered so host mutations are deterministic.
pub type Attributes = BTreeMap<String, Value>;

/// Build an attribute map from `(key, value)` pairs.
///
/// The reserved [`CHILDREN_KEY`] is dropped.
pub fn attrs<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, _)| k != CHILDREN_KEY)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_partition() {
        assert!(is_event_key("onClick"));
        assert!(!is_event_key("on"));
        assert!(!is_event_key("id"));
        assert!(is_plain_key("id"));
        assert!(!is_plain_key(CHILDREN_KEY));
        assert!(!is_plain_key("onInput"));
    }

    #[test]
    fn test_event_name() {
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onKeyDown"), "keydown");
    }

    #[test]
    fn test_callback_identity() {
        let a = Callback::new(|_| {});
        let b = a.clone();
        let c = Callback::new(|_| {});
        assert_eq!(Value::Handler(a.clone()), Value::Handler(b));
        assert_ne!(Value::Handler(a), Value::Handler(c));
    }

    #[test]
    fn test_attrs_drops_children_key() {
        let map = attrs([("id", "main"), (CHILDREN_KEY, "nope")]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("id"), Some(&Value::from("main")));
    }
}
