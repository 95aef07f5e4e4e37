use std::path::Path;

use thiserror::Error;

/// Error types for settings resolution.
///
/// Failures inside a configuration namespace are reported as
/// [`ConfigError`](crate::config_store::ConfigError); this enum covers
/// everything that happens before a service is connected.
#[derive(Error, Debug)]
pub enum RenvError {
    /// Settings are missing or inconsistent
    #[error("invalid settings: {details}")]
    SettingsValidation {
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: std::path::PathBuf,
        /// I/O error details
        details: String,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// A project manifest exists but is not valid JSON
    #[error("failed to parse manifest '{path}': {details}")]
    ManifestParse {
        /// The `package.json` file
        path: std::path::PathBuf,
        /// Parse error details
        details: String,
    },

    /// A TLS file could not be read
    #[error("failed to load TLS material from '{path}': {details}")]
    TlsMaterial {
        /// The certificate or key file
        path: std::path::PathBuf,
        /// I/O error details
        details: String,
    },
}

/// A specialized `Result` type for settings resolution.
pub type Result<T> = std::result::Result<T, RenvError>;

impl RenvError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        RenvError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates a TLS loading error for `path`.
    pub fn tls(error: impl std::fmt::Display, path: &Path) -> Self {
        RenvError::TlsMaterial {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
