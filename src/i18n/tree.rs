//! Translation tree: the loaded key/value structure of one locale bundle.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A node of a translation bundle.
///
/// Bundles are JSON objects whose values are strings, arrays of strings or
/// nested objects. Keys are addressed with dot-separated paths such as
/// `"hero.title"` or `"experience.markeaze.achievements"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TranslationTree {
    Leaf(String),
    List(Vec<String>),
    Node(BTreeMap<String, TranslationTree>),
}

/// Result of a key lookup.
///
/// A lookup never fails: a missing key resolves to the key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation<'a> {
    Found(&'a TranslationTree),
    Missing(&'a str),
}

impl TranslationTree {
    /// An empty bundle. Every lookup against it returns the key.
    pub fn empty() -> Self {
        TranslationTree::Node(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TranslationTree::Node(children) if children.is_empty())
    }

    /// Walk the tree along the dot-separated `key`.
    pub fn lookup<'a>(&'a self, key: &'a str) -> Translation<'a> {
        let mut current = self;
        for segment in key.split('.') {
            current = match current {
                TranslationTree::Node(children) => match children.get(segment) {
                    Some(child) => child,
                    None => return Translation::Missing(key),
                },
                TranslationTree::Leaf(_) | TranslationTree::List(_) => {
                    return Translation::Missing(key)
                }
            };
        }
        Translation::Found(current)
    }

    /// Leaf text under `key`, or the key itself for anything else.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        match self.lookup(key) {
            Translation::Found(TranslationTree::Leaf(text)) => text.as_str(),
            _ => key,
        }
    }

    /// Convert an arbitrary JSON value into a tree.
    ///
    /// Numbers and booleans become leaves, `null` entries are dropped and
    /// arrays keep only their scalar members.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => TranslationTree::Leaf(s),
            Value::Number(n) => TranslationTree::Leaf(n.to_string()),
            Value::Bool(b) => TranslationTree::Leaf(b.to_string()),
            Value::Null => TranslationTree::Leaf(String::new()),
            Value::Array(items) => {
                TranslationTree::List(items.into_iter().filter_map(scalar_text).collect())
            }
            Value::Object(map) => TranslationTree::Node(
                map.into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k, TranslationTree::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Default for TranslationTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de> Deserialize<'de> for TranslationTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TranslationTree::from_json)
    }
}

impl<'a> Translation<'a> {
    /// The list items under the key, or an empty slice.
    pub fn as_list(&self) -> &'a [String] {
        match *self {
            Translation::Found(TranslationTree::List(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Translation::Found(_))
    }
}
