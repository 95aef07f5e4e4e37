use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::{RenvError, config_store::ConfigError};

/// Errors that can occur during CLI command execution.
///
/// Engine failures are carried through unchanged so the message the user
/// sees is the one the engine produced.
#[derive(Error, Debug)]
pub enum CliError {
    /// A command or category was not found in the registry.
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid arguments were provided to a command.
    ///
    /// Returned when argument count validation fails or an argument does
    /// not have the expected form.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// An error from the configuration engine.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Settings could not be resolved.
    #[error(transparent)]
    Settings(#[from] RenvError),

    /// An import file could not be read or is not JSON.
    #[error("cannot import '{path}': {details}")]
    ImportFile {
        /// The file given on the command line
        path: PathBuf,
        /// Read or parse error details
        details: String,
    },

    /// Output could not be rendered.
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Type alias for command execution results.
///
/// All CLI commands return this type, providing either the text to print
/// or a CliError describing what went wrong.
pub type CommandResult = Result<String, CliError>;

/// Metadata for a single command argument.
///
/// Used for help generation and argument count validation.
#[derive(Debug, Clone)]
pub struct CommandArg {
    /// The name of the argument (e.g., "key", "file").
    pub name: String,

    /// Human-readable description of what this argument does.
    pub description: String,

    /// Whether this argument is required for command execution.
    pub required: bool,

    /// Whether this argument may repeat. Only the last argument may.
    pub variadic: bool,

    /// The expected type of this argument for help display.
    pub value_type: ArgType,
}

/// Type classification for command arguments.
#[derive(Debug, Clone)]
pub enum ArgType {
    /// A general string value.
    String,

    /// A dotted configuration key such as `database.host`.
    Key,

    /// A `key=value` assignment.
    Pair,

    /// A file system path.
    Path,
}

impl ArgType {
    /// Placeholder shown in usage lines.
    pub fn placeholder(&self) -> &'static str {
        match self {
            ArgType::String => "<value>",
            ArgType::Key => "<key>",
            ArgType::Pair => "<key=value>",
            ArgType::Path => "<path>",
        }
    }
}

/// Complete metadata for a CLI command.
///
/// The single source of truth for a command's identity, arguments, usage
/// examples and category.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// The command name (e.g., "show", "set", "nuke").
    pub name: String,

    /// Brief description of what this command does.
    pub description: String,

    /// Every argument this command accepts, in order.
    pub args: Vec<CommandArg>,

    /// Example usage strings to show in help text.
    pub examples: Vec<String>,

    /// Category this command belongs to (e.g., "config").
    pub category: String,
}

/// Trait defining the interface for all CLI commands.
///
/// Commands receive their dependencies through their constructors.
#[async_trait]
pub trait Command: Send + Sync {
    /// Executes the command with the provided arguments.
    ///
    /// The registry has already checked the argument count against the
    /// command's metadata; the command validates argument contents.
    ///
    /// # Errors
    ///
    /// Returns `CliError` for invalid argument values, engine failures and
    /// I/O failures.
    async fn execute(&self, args: &[String]) -> CommandResult;

    /// Returns the complete metadata for this command.
    fn metadata(&self) -> CommandMetadata;
}
