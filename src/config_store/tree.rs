use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{ConfigError, ConfigKey, key::validate_segment};

/// Nested configuration reconstructed from a flat key-value listing.
///
/// Trees are built fresh from the backend on every read and never cached.
/// Every leaf holds the string stored at its storage key; typing is left to
/// whoever consumes the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    children: BTreeMap<String, ConfigNode>,
}

/// A position in a [`ConfigTree`]: either a stored value or a nested tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigNode {
    /// A stored value.
    Leaf(String),
    /// A nested mapping.
    Branch(ConfigTree),
}

/// A decoded key together with its stored value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigEntry {
    /// Key relative to the namespace root.
    pub key: ConfigKey,
    /// Stored value.
    pub value: String,
}

impl ConfigEntry {
    /// Pairs a key with a value.
    pub fn new(key: ConfigKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the tree has no children at all.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Looks up a direct child.
    pub fn get(&self, segment: &str) -> Option<&ConfigNode> {
        self.children.get(segment)
    }

    /// Iterates direct children in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigNode)> {
        self.children.iter()
    }

    /// Total number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                ConfigNode::Leaf(_) => 1,
                ConfigNode::Branch(tree) => tree.leaf_count(),
            })
            .sum()
    }

    pub(super) fn children_mut(&mut self) -> &mut BTreeMap<String, ConfigNode> {
        &mut self.children
    }

    pub(super) fn into_children(self) -> BTreeMap<String, ConfigNode> {
        self.children
    }

    pub(super) fn from_children(children: BTreeMap<String, ConfigNode>) -> Self {
        Self { children }
    }

    /// Converts an import document into a tree.
    ///
    /// Strings are stored verbatim. Numbers, booleans, `null` and arrays are
    /// stored as their JSON text, so `5432` becomes `"5432"`.
    ///
    /// # Errors
    /// * `ConfigError::InvalidImport` - if `json` is not an object
    /// * `ConfigError::InvalidKey` - if an object key is empty or contains `/` or `.`
    pub fn from_json(json: &Value) -> Result<Self, ConfigError> {
        match json {
            Value::Object(map) => Self::from_object(map, &[]),
            other => Err(ConfigError::InvalidImport(format!(
                "expected a JSON object at the root, found {}",
                json_type_name(other)
            ))),
        }
    }

    fn from_object(map: &Map<String, Value>, path: &[&str]) -> Result<Self, ConfigError> {
        let mut children = BTreeMap::new();

        for (key, value) in map {
            let mut child_path = path.to_vec();
            child_path.push(key);

            validate_segment(key, &child_path.join("."))?;

            let node = match value {
                Value::Object(nested) => {
                    ConfigNode::Branch(Self::from_object(nested, &child_path)?)
                }
                Value::String(s) => ConfigNode::Leaf(s.clone()),
                scalar => ConfigNode::Leaf(scalar.to_string()),
            };

            children.insert(key.clone(), node);
        }

        Ok(Self { children })
    }

    /// Renders the tree as a JSON object with string leaves.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.children
                .iter()
                .map(|(key, node)| (key.clone(), node.to_json()))
                .collect(),
        )
    }
}

impl ConfigNode {
    /// The stored value, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            ConfigNode::Leaf(value) => Some(value),
            ConfigNode::Branch(_) => None,
        }
    }

    /// The nested tree, if this is a branch.
    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigNode::Leaf(_) => None,
            ConfigNode::Branch(tree) => Some(tree),
        }
    }

    /// Renders the node as JSON; leaves become JSON strings.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigNode::Leaf(value) => Value::String(value.clone()),
            ConfigNode::Branch(tree) => tree.to_json(),
        }
    }
}

impl From<ConfigTree> for ConfigNode {
    fn from(tree: ConfigTree) -> Self {
        ConfigNode::Branch(tree)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
