//! Folding header accumulator: scalar on first sight, ordered list after.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;

/// Value of one header name: a scalar when the name was seen once, an
/// ordered list (arrival order) when seen more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// View the value as a sequence, scalar or not.
    pub fn as_slice(&self) -> &[String] {
        match self {
            HeaderValue::Single(value) => std::slice::from_ref(value),
            HeaderValue::Multiple(values) => values,
        }
    }
}

/// Map from lower-cased header name to folded value. Preserves the position
/// of each name's first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderMap(IndexMap<String, HeaderValue>);

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one header occurrence. The name is trimmed and lower-cased;
    /// a repeated name promotes the existing scalar to a two-element list,
    /// further repeats append.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let key = name.trim().to_ascii_lowercase();
        let value = value.into();
        match self.0.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(HeaderValue::Single(value));
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                HeaderValue::Multiple(values) => values.push(value),
                HeaderValue::Single(first) => {
                    let first = std::mem::take(first);
                    entry.insert(HeaderValue::Multiple(vec![first, value]));
                }
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.0.get(&name.trim().to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}
