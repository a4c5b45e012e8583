//! The state document: persistent nested key-value data.
//!
//! State is handed to the runtime and returned from it — never stored
//! here. A [`StateDocument`] wraps a JSON object addressable by dot
//! paths (`counts.runs`). Script variables live in the execution context
//! and are a separate namespace; only `STATE GET` / `STATE SET` touch
//! this document.

use serde_json::{json, Value as Json};

use crate::ast::Value;

/// Nested key-value document, dot-path addressable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateDocument {
    root: Json,
}

impl StateDocument {
    /// Create an empty document (`{}`).
    pub fn new() -> Self {
        Self { root: json!({}) }
    }

    /// Wrap an existing JSON value. Non-object roots are accepted as-is;
    /// the first `set` on such a document replaces the root with an
    /// object.
    pub fn from_json(root: Json) -> Self {
        Self { root }
    }

    /// The underlying JSON value.
    pub fn as_json(&self) -> &Json {
        &self.root
    }

    /// Consume the document, returning the underlying JSON value.
    pub fn into_json(self) -> Json {
        self.root
    }

    /// Read a dot path. Missing paths read as [`Value::Null`].
    pub fn get(&self, path: &str) -> Value {
        let mut node = &self.root;
        for segment in path.split('.') {
            match node.get(segment) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        json_to_value(node)
    }

    /// Write a dot path, creating intermediate objects as needed.
    /// Writing through a non-object intermediate replaces it.
    pub fn set(&mut self, path: &str, value: Value) {
        if !self.root.is_object() {
            self.root = json!({});
        }
        let mut node = &mut self.root;
        let segments: Vec<&str> = path.split('.').collect();
        for segment in &segments[..segments.len() - 1] {
            let map = node.as_object_mut().expect("intermediate is an object");
            let child = map
                .entry(segment.to_string())
                .or_insert_with(|| json!({}));
            if !child.is_object() {
                *child = json!({});
            }
            node = child;
        }
        let map = node.as_object_mut().expect("intermediate is an object");
        map.insert(segments[segments.len() - 1].to_string(), value_to_json(&value));
    }
}

/// Convert a script value to JSON for the state document.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Convert JSON from the state document to a script value.
///
/// Objects have no script-level counterpart; they flatten to their JSON
/// text so scripts can still print or compare them.
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Int(0)
            }
        }
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        Json::Object(_) => Value::Str(json.to_string()),
    }
}
