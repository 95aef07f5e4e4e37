use thiserror::Error;

/// Failures reported by a [`KvBackend`](super::KvBackend).
#[derive(Error, Debug)]
pub enum BackendError {
    /// Nothing is stored at the requested key.
    #[error("key '{key}' not found")]
    NotFound {
        /// The storage key that was requested
        key: String,
    },

    /// The store could not be reached.
    #[error("cannot reach '{endpoint}': {details}")]
    Connection {
        /// Endpoint that was contacted last
        endpoint: String,
        /// Transport error details
        details: String,
    },

    /// TLS material could not be turned into a client configuration.
    #[error("invalid TLS material: {details}")]
    Tls {
        /// Parse or configuration error details
        details: String,
    },

    /// The store refused the operation, or the key cannot be sent to it.
    #[error("operation on '{key}' rejected: {details}")]
    Rejected {
        /// The storage key the operation targeted
        key: String,
        /// Error message returned by the store
        details: String,
    },

    /// The store answered with a payload that could not be understood.
    #[error("unexpected response for '{key}': {details}")]
    InvalidResponse {
        /// The storage key the operation targeted
        key: String,
        /// Decoding error details
        details: String,
    },
}
