//! Command-line interface for configuration management.
//!
//! Provides a hierarchical command system over a [`ConfigService`](crate::config_store::ConfigService).
//! Commands are organized by category and generate their help text from metadata.

mod commands;
pub mod formatting;
mod registry;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use commands::config::{
    CATEGORY_NAME, ConfigContext, DumpCommand, ImportCommand, MergeCommand, NukeCommand,
    SetCommand, ShowCommand, UnsetCommand,
};
pub use registry::CommandRegistry;
pub use service::{CliService, route};
pub use types::{ArgType, CliError, Command, CommandArg, CommandMetadata, CommandResult};
