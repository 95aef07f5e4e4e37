use std::collections::btree_map;

use crate::backend::Entry;

use super::{ConfigEntry, ConfigError, ConfigKey, ConfigNode, ConfigTree, key::decode_key};

/// Reconstructs a tree from a flat backend listing taken below `prefix`.
///
/// # Errors
/// * `ConfigError::OutOfNamespace` - if a listed key is not below `prefix`
/// * `ConfigError::InvalidKey` - if a listed key decodes to an invalid key
/// * `ConfigError::StructuralConflict` - if a key is both a value and a parent
pub fn build_tree(prefix: &str, entries: &[Entry]) -> Result<ConfigTree, ConfigError> {
    let decoded = entries
        .iter()
        .map(|entry| {
            decode_key(prefix, &entry.key).map(|key| ConfigEntry::new(key, entry.value.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tree_from_entries(&decoded)
}

/// Builds a tree from decoded entries; a repeated key keeps its last value.
///
/// # Errors
/// * `ConfigError::StructuralConflict` - if a key is both a value and a parent
pub fn tree_from_entries(entries: &[ConfigEntry]) -> Result<ConfigTree, ConfigError> {
    let mut tree = ConfigTree::new();

    for entry in entries {
        insert_leaf(&mut tree, &entry.key, entry.value.clone())?;
    }

    Ok(tree)
}

/// Walks the tree depth-first and yields one entry per leaf.
///
/// Siblings come out in key order; callers must not rely on it.
pub fn flatten_tree(tree: &ConfigTree) -> Vec<ConfigEntry> {
    let mut entries = Vec::new();
    let mut path = Vec::new();

    collect_entries(tree, &mut path, &mut entries);
    entries
}

fn collect_entries(tree: &ConfigTree, path: &mut Vec<String>, entries: &mut Vec<ConfigEntry>) {
    for (segment, node) in tree.iter() {
        path.push(segment.clone());

        match node {
            ConfigNode::Leaf(value) => entries.push(ConfigEntry::new(
                ConfigKey::from_trusted(path.clone()),
                value.clone(),
            )),
            ConfigNode::Branch(child) => collect_entries(child, path, entries),
        }

        path.pop();
    }
}

/// Descends `tree` along `key`.
///
/// # Errors
/// * `ConfigError::NotFound` - if any segment is missing or a value is reached early
pub fn extract_path<'a>(
    tree: &'a ConfigTree,
    key: &ConfigKey,
) -> Result<&'a ConfigNode, ConfigError> {
    let segments = key.segments();
    let (first, rest) = segments
        .split_first()
        .ok_or_else(|| ConfigError::NotFound("empty key".to_string()))?;

    let mut current = tree.get(first).ok_or_else(|| not_found_at(segments, 0))?;

    for (i, segment) in rest.iter().enumerate() {
        current = match current {
            ConfigNode::Branch(child) => child
                .get(segment)
                .ok_or_else(|| not_found_at(segments, i + 1))?,
            ConfigNode::Leaf(_) => return Err(not_found_at(segments, i + 1)),
        };
    }

    Ok(current)
}

fn not_found_at(segments: &[String], index: usize) -> ConfigError {
    let parent = segments[..index].join(".");
    let location = if parent.is_empty() { "<root>" } else { &parent };

    ConfigError::NotFound(format!(
        "key '{}' not found under '{}' while resolving '{}'",
        segments[index],
        location,
        segments.join(".")
    ))
}

/// Inserts a leaf, creating intermediate branches as needed.
fn insert_leaf(tree: &mut ConfigTree, key: &ConfigKey, value: String) -> Result<(), ConfigError> {
    let segments = key.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Err(ConfigError::InvalidKey {
            key: key.to_string(),
            reason: "key has no segments".to_string(),
        });
    };

    let mut current = tree;
    for (i, segment) in parents.iter().enumerate() {
        current = navigate_step_mut(current, segment, &segments[..=i])?;
    }

    match current.children_mut().entry(last.clone()) {
        btree_map::Entry::Vacant(slot) => {
            slot.insert(ConfigNode::Leaf(value));
            Ok(())
        }
        btree_map::Entry::Occupied(mut slot) => match slot.get_mut() {
            ConfigNode::Leaf(existing) => {
                *existing = value;
                Ok(())
            }
            ConfigNode::Branch(_) => Err(ConfigError::StructuralConflict {
                path: key.to_string(),
                details: "value stored at a key that already has nested keys".to_string(),
            }),
        },
    }
}

/// Steps into the branch `key`, creating it when absent.
fn navigate_step_mut<'a>(
    current: &'a mut ConfigTree,
    key: &str,
    path_so_far: &[String],
) -> Result<&'a mut ConfigTree, ConfigError> {
    let node = current
        .children_mut()
        .entry(key.to_string())
        .or_insert_with(|| ConfigNode::Branch(ConfigTree::new()));

    match node {
        ConfigNode::Branch(child) => Ok(child),
        ConfigNode::Leaf(_) => Err(ConfigError::StructuralConflict {
            path: path_so_far.join("."),
            details: "nested keys stored below a key that holds a value".to_string(),
        }),
    }
}
