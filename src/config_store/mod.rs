//! Namespace engine: maps a flat key-value backend onto nested configuration.
//!
//! Storage keys look like `/{application}/{environment}/{segment}/...`. The
//! leading two segments select a [`Namespace`]; the rest is a dotted
//! [`ConfigKey`]. [`ConfigService`] composes parsing, tree building and
//! concurrent backend I/O into the operations the CLI exposes.

mod bulk;
mod error;
mod key;
mod merge;
mod pairs;
mod path_ops;
mod service;
mod tree;


pub use bulk::{BulkReport, KeyFailure};
pub use error::ConfigError;
pub use key::{
    ConfigKey, KEY_DELIMITER, Namespace, ROOT_PREFIX, SEPARATOR, decode_key, encode_key,
};
pub use merge::{merge_namespaces, overlay_trees};
pub use pairs::parse_pairs;
pub use path_ops::{build_tree, extract_path, flatten_tree, tree_from_entries};
pub use service::ConfigService;
pub use tree::{ConfigEntry, ConfigNode, ConfigTree};
