use thiserror::Error;

use crate::backend::BackendError;

use super::BulkReport;

/// Errors that can occur while reading or mutating a configuration namespace.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key segment is empty or contains the storage separator.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey {
        /// The offending key as supplied
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// A storage key does not live under the namespace it was decoded against.
    #[error("storage key '{key}' is outside namespace '{prefix}'")]
    OutOfNamespace {
        /// The storage key
        key: String,
        /// The namespace prefix it was expected under
        prefix: String,
    },

    /// A `key=value` token has no `=` or an empty key.
    #[error("malformed pair '{token}': {reason}")]
    MalformedPair {
        /// The token as supplied
        token: String,
        /// Why it was rejected
        reason: String,
    },

    /// A key is used both as a value and as a parent of other keys.
    #[error("structural conflict at '{path}': {details}")]
    StructuralConflict {
        /// Dotted path where the collision was found
        path: String,
        /// What collided
        details: String,
    },

    /// A key or sub-path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend could not be reached.
    #[error("connection failed ({endpoint}): {details}")]
    Connection {
        /// Endpoint involved, if known
        endpoint: String,
        /// Transport error details
        details: String,
    },

    /// The backend rejected the operation.
    #[error("backend error on '{key}': {details}")]
    Backend {
        /// Storage key the operation targeted
        key: String,
        /// Error reported by the backend
        details: String,
    },

    /// Some operations of a bulk call failed; applied ones are left in place.
    #[error("{report}")]
    PartialFailure {
        /// Which keys succeeded and which failed, with causes
        report: BulkReport,
    },

    /// An import payload does not have the shape of a configuration tree.
    #[error("invalid import payload: {0}")]
    InvalidImport(String),
}

impl From<BackendError> for ConfigError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotFound { key } => ConfigError::NotFound(key),
            BackendError::Connection { endpoint, details } => {
                ConfigError::Connection { endpoint, details }
            }
            BackendError::Tls { details } => ConfigError::Connection {
                endpoint: "tls".to_string(),
                details,
            },
            BackendError::Rejected { key, details }
            | BackendError::InvalidResponse { key, details } => {
                ConfigError::Backend { key, details }
            }
        }
    }
}
