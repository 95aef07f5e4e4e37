//! Formatting utilities for CLI output.
//!
//! Configuration trees render either as aligned `key  value` rows or as
//! pretty-printed JSON. Help text and messages share a small set of ANSI styles.

use clap::ValueEnum;

use crate::config_store::{ConfigKey, ConfigNode, ConfigTree, flatten_tree};

use super::CliError;

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Yellow color
    pub const YELLOW: &'static str = "\x1b[33m";
    /// Blue color
    pub const BLUE: &'static str = "\x1b[34m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// How configuration trees are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned `key  value` rows under a namespace header
    #[default]
    Console,
    /// Pretty-printed JSON object
    Json,
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats subheaders with styling
pub fn format_subheader(text: &str) -> String {
    format!(
        "{}{}{}{}",
        Colors::BOLD,
        Colors::YELLOW,
        text,
        Colors::RESET
    )
}

/// Formats command names with styling
pub fn format_command(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::GREEN, text, Colors::RESET)
}

/// Formats category names with styling
pub fn format_category(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::BLUE, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats usage examples with styling
pub fn format_usage(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats a confirmation such as `set: a = 1, b = 2`.
pub fn format_action(action: &str, items: &[String]) -> String {
    format!(
        "{}{action}:{} {}",
        Colors::BOLD,
        Colors::RESET,
        items.join(", ")
    )
}

/// Renders the result of a read.
///
/// `header` names what was read, typically the namespace prefix. When the
/// read was narrowed to `sub_key`, keys are shown in full below it.
///
/// # Errors
/// Returns `CliError::Output` if JSON serialization fails.
pub fn render_node(
    header: &str,
    sub_key: Option<&ConfigKey>,
    node: &ConfigNode,
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&node.to_json())?),
        OutputFormat::Console => {
            let rows = match node {
                ConfigNode::Leaf(value) => {
                    let key = sub_key.map(ToString::to_string).unwrap_or_default();
                    vec![(key, value.clone())]
                }
                ConfigNode::Branch(tree) => tree_rows(sub_key, tree),
            };

            let mut out = format!(
                "{}==>{} {}{}{}",
                Colors::BLUE,
                Colors::RESET,
                Colors::BOLD,
                header,
                Colors::RESET
            );
            let table = format_rows(&rows);
            if !table.is_empty() {
                out.push('\n');
                out.push_str(&table);
            }
            Ok(out)
        }
    }
}

/// Every leaf of `tree` as a `(dotted key, value)` row, keys joined below `root`.
pub fn tree_rows(root: Option<&ConfigKey>, tree: &ConfigTree) -> Vec<(String, String)> {
    flatten_tree(tree)
        .into_iter()
        .map(|entry| {
            let key = match root {
                Some(root) => root.join(&entry.key),
                None => entry.key,
            };
            (key.to_string(), entry.value)
        })
        .collect()
}

/// Aligns rows into two columns separated by two spaces.
pub fn format_rows(rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(key, value)| format!("{key:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
