//! The document tree
//!
//! A document is a tree of [`Node`] values. The set of variants is closed, so
//! callers match on the enum instead of downcasting. Each container owns its
//! children outright: there is no sharing and no way to build a cycle.
//!
//! Object entries are kept in a `BTreeMap`, which means keys come back (and are
//! serialized) in sorted order regardless of how they were written.

use super::error::UsageError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Entries of an object node, ordered by key
pub type ObjectMap = BTreeMap<String, Node>;

/// A value in a document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f32),
    Boolean(bool),
    String(String),
    Object(ObjectMap),
    Array(Vec<Node>),
}

/// The variant of a node, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Number,
    Boolean,
    String,
    Object,
    Array,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::String => "string",
            NodeKind::Object => "object",
            NodeKind::Array => "array",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Node {
    /// An empty object node
    pub fn object() -> Self {
        Node::Object(ObjectMap::new())
    }

    /// An empty array node
    pub fn array() -> Self {
        Node::Array(Vec::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Number(_) => NodeKind::Number,
            Node::Boolean(_) => NodeKind::Boolean,
            Node::String(_) => NodeKind::String,
            Node::Object(_) => NodeKind::Object,
            Node::Array(_) => NodeKind::Array,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Node::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Node::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectMap> {
        match self {
            Node::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up an object entry. Returns `None` for missing keys and for
    /// non-object nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Checked positional access into an array node.
    pub fn at(&self, index: usize) -> Result<&Node, UsageError> {
        let items = self.as_array().ok_or(UsageError::NotA {
            expected: "array",
            found: self.kind().name(),
        })?;
        items.get(index).ok_or(UsageError::IndexOutOfBounds {
            index,
            len: items.len(),
        })
    }

    /// Insert an object entry, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Result<Option<Node>, UsageError> {
        let found = self.kind().name();
        let entries = self.as_object_mut().ok_or(UsageError::NotA {
            expected: "object",
            found,
        })?;
        Ok(entries.insert(key.into(), value))
    }

    /// Append to an array node.
    pub fn push(&mut self, value: Node) -> Result<(), UsageError> {
        let found = self.kind().name();
        let items = self.as_array_mut().ok_or(UsageError::NotA {
            expected: "array",
            found,
        })?;
        items.push(value);
        Ok(())
    }

    /// Number of entries of a container; scalars have none.
    pub fn len(&self) -> usize {
        match self {
            Node::Object(entries) => entries.len(),
            Node::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a `serde_json::Value`. Numbers go through their shortest
    /// `f32` spelling so `0.1` stays `0.1` instead of widening to
    /// `0.10000000149011612`. Non-finite numbers become `null`.
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Node::Number(value) => value
                .to_string()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::Boolean(value) => Value::Bool(*value),
            Node::String(value) => Value::String(value.clone()),
            Node::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json_value()))
                    .collect(),
            ),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_json_value).collect()),
        }
    }
}

impl TryFrom<serde_json::Value> for Node {
    type Error = UsageError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        Ok(match value {
            Value::Null => return Err(UsageError::NoEquivalent("JSON null")),
            Value::Bool(value) => Node::Boolean(value),
            Value::Number(number) => Node::Number(number.as_f64().unwrap_or(0.0) as f32),
            Value::String(value) => Node::String(value),
            Value::Array(items) => Node::Array(
                items
                    .into_iter()
                    .map(Node::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(entries) => Node::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| Node::try_from(value).map(|node| (key, node)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Number(value) => serializer.serialize_f32(*value),
            Node::Boolean(value) => serializer.serialize_bool(*value),
            Node::String(value) => serializer.serialize_str(value),
            Node::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<f32> for Node {
    fn from(value: f32) -> Self {
        Node::Number(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Boolean(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

impl From<ObjectMap> for Node {
    fn from(entries: ObjectMap) -> Self {
        Node::Object(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        let mut root = Node::object();
        root.insert("name", "lconf".into()).unwrap();
        root.insert("ratio", 0.1f32.into()).unwrap();
        root.insert(
            "flags",
            Node::Array(vec![true.into(), false.into()]),
        )
        .unwrap();
        root
    }

    #[test]
    fn test_kind_and_accessors() {
        let root = sample();
        assert_eq!(root.kind(), NodeKind::Object);
        assert_eq!(root.get("name").and_then(Node::as_str), Some("lconf"));
        assert_eq!(root.get("ratio").and_then(Node::as_number), Some(0.1));
        assert_eq!(root.get("name").and_then(Node::as_number), None);
        assert!(root.get("missing").is_none());
        assert_eq!(root.len(), 3);
    }

    #[test]
    fn test_at_checks_bounds_and_type() {
        let root = sample();
        let flags = root.get("flags").unwrap();
        assert_eq!(flags.at(1), Ok(&Node::Boolean(false)));
        assert_eq!(
            flags.at(2),
            Err(UsageError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(
            root.at(0),
            Err(UsageError::NotA {
                expected: "array",
                found: "object"
            })
        );
    }

    #[test]
    fn test_insert_and_push_reject_wrong_variants() {
        let mut scalar = Node::Number(1.0);
        assert!(scalar.insert("a", Node::Boolean(true)).is_err());
        assert!(scalar.push(Node::Boolean(true)).is_err());

        let mut list = Node::array();
        list.push(Node::Number(1.0)).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_json_value_conversion_keeps_short_floats() {
        let value = sample().to_json_value();
        assert_eq!(value["ratio"], serde_json::json!(0.1));
        assert_eq!(value["flags"], serde_json::json!([true, false]));
    }

    #[test]
    fn test_try_from_json_value() {
        let node = Node::try_from(serde_json::json!({"a": [1, "x", true]})).unwrap();
        assert_eq!(node.get("a").unwrap().at(1), Ok(&Node::String("x".into())));

        assert_eq!(
            Node::try_from(serde_json::json!({"a": null})),
            Err(UsageError::NoEquivalent("JSON null"))
        );
    }

    #[test]
    fn test_serde_serialize() {
        let text = serde_json::to_string(&sample()).unwrap();
        assert_eq!(text, r#"{"flags":[true,false],"name":"lconf","ratio":0.1}"#);
    }
}
