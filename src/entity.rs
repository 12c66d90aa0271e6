//! Snapshot semantics shared by dataverses and datasets.
//!
//! Every entity wraps the JSON the server returned when it was fetched. The
//! snapshot is never edited in place; `refresh` replaces it as a whole.

use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use crate::error::Result;

/// Immutable JSON object captured at fetch or refresh time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn new(data: Map<String, Value>) -> Self {
        Self(data)
    }

    /// Builds a snapshot from any JSON value. Non-objects give an empty snapshot.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Nested lookup. Segments address object keys, or array indices when the
    /// current value is an array.
    pub fn dig(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter().try_fold(self.0.get(*first)?, |value, segment| match value {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl Hash for Snapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Map keys are sorted, so the serialization is canonical.
        Value::Object(self.0.clone()).to_string().hash(state);
    }
}

/// A server-side object represented by a snapshot of its JSON.
pub trait Entity {
    fn snapshot(&self) -> &Snapshot;

    /// Re-fetches the entity and replaces the snapshot and every derived cache.
    fn refresh(&mut self) -> Result<()>;

    fn get(&self, key: &str) -> Option<&Value> {
        self.snapshot().get(key)
    }

    fn keys(&self) -> Vec<&String> {
        self.snapshot().keys().collect()
    }

    fn dig(&self, path: &[&str]) -> Option<&Value> {
        self.snapshot().dig(path)
    }
}
