use std::{fs, path::Path};

use serde::Deserialize;
use toml::{Value, map::Map};
use tracing::debug;

use crate::{RenvError, Result};

/// Reads each existing file as TOML and merges them, later files winning.
///
/// Files that do not exist are skipped.
pub fn load_layers<P: AsRef<Path>>(paths: &[P]) -> Result<Value> {
    let mut layers = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }

        debug!(path = %path.display(), "loading settings file");
        let content = fs::read_to_string(path).map_err(|e| RenvError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        let value: Value =
            toml::from_str(&content).map_err(|e| RenvError::toml_parse(e, Some(path)))?;

        layers.push(value);
    }

    Ok(merge_layers(layers))
}

#[derive(Deserialize)]
struct Manifest {
    name: Option<serde_json::Value>,
}

/// Reads the application name from a `package.json` manifest.
///
/// A missing file, or a manifest without a non-empty string `name`, yields `None`.
pub fn manifest_application(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    debug!(path = %path.display(), "reading project manifest");
    let content = fs::read_to_string(path).map_err(|e| RenvError::IoError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    let manifest: Manifest =
        serde_json::from_str(&content).map_err(|e| RenvError::ManifestParse {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

    Ok(match manifest.name {
        Some(serde_json::Value::String(name)) if !name.is_empty() => Some(name),
        _ => None,
    })
}

/// Merges TOML layers with later layers taking precedence
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers
        .into_iter()
        .fold(Value::Table(Map::new()), merge_two_layers)
}

/// Deep merges two TOML values while preserving precedence
///
/// Tables are merged key by key; for anything else `overlay` replaces `base`
/// outright, so a `hosts` array is never concatenated.
pub fn merge_two_layers(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            let mut merged_table = overlay_table;

            for (key, base_value) in base_table {
                let merged_value = match merged_table.remove(&key) {
                    None => base_value,
                    Some(overlay_value) => merge_two_layers(base_value, overlay_value),
                };
                merged_table.insert(key, merged_value);
            }

            Value::Table(merged_table)
        }
        (_, overlay) => overlay,
    }
}
