use tracing::{debug, instrument};

use crate::backend::KvBackend;

use super::{ConfigError, ConfigNode, ConfigTree, path_ops::build_tree};

/// Overlays `source` onto `target`, with `source` winning on conflict.
///
/// Paths present only in `target` are kept and paths present only in
/// `source` are added. Where both trees hold a branch the branches are
/// merged recursively; anywhere else the source node replaces the target
/// node whole, so a source value overwrites a target subtree and vice versa.
pub fn overlay_trees(target: ConfigTree, source: ConfigTree) -> ConfigTree {
    let mut merged = target.into_children();

    for (key, source_node) in source.into_children() {
        let node = match (merged.remove(&key), source_node) {
            (Some(ConfigNode::Branch(target_tree)), ConfigNode::Branch(source_tree)) => {
                ConfigNode::Branch(overlay_trees(target_tree, source_tree))
            }
            (_, source_node) => source_node,
        };

        merged.insert(key, node);
    }

    ConfigTree::from_children(merged)
}

/// Reads two namespaces concurrently and returns their overlay.
///
/// Nothing is written; persisting the result is up to the caller.
///
/// # Errors
/// Listing failures from either backend, or structural conflicts in either tree.
#[instrument(skip(target, source))]
pub async fn merge_namespaces(
    target: &dyn KvBackend,
    target_prefix: &str,
    source: &dyn KvBackend,
    source_prefix: &str,
) -> Result<ConfigTree, ConfigError> {
    let (target_entries, source_entries) = futures::try_join!(
        target.list_by_prefix(target_prefix),
        source.list_by_prefix(source_prefix),
    )?;

    debug!(
        target = target_entries.len(),
        source = source_entries.len(),
        "fetched namespaces for merge"
    );

    let target_tree = build_tree(target_prefix, &target_entries)?;
    let source_tree = build_tree(source_prefix, &source_entries)?;

    Ok(overlay_trees(target_tree, source_tree))
}
