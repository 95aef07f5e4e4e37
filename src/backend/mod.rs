//! Key-value backends the configuration engine reads from and writes to.
//!
//! The engine only ever talks to a [`KvBackend`]; the etcd client and the
//! in-memory store are the two implementations shipped with the crate.

mod error;
mod etcd;
mod memory;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::BackendError;
pub use etcd::{EtcdBackend, TlsMaterial};
pub use memory::{MemoryBackend, Operation};

/// A single value stored at a flat storage key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entry {
    /// Full storage key, e.g. `/app/production/database/host`.
    pub key: String,
    /// Opaque string value.
    pub value: String,
}

impl Entry {
    /// Creates an entry from anything string-like.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Path-structured key-value store.
///
/// Keys are `/`-separated storage paths. Listing is directory-like: listing
/// `/a/b` yields `/a/b` itself (if it holds a value) and every key below
/// `/a/b/`, but never `/a/bc`. Implementations do not retry; a failed call
/// surfaces immediately.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Reads the value stored at `key`.
    ///
    /// # Errors
    /// `BackendError::NotFound` if nothing is stored there.
    async fn get(&self, key: &str) -> Result<String, BackendError>;

    /// Stores `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    /// Connection or remote rejection errors.
    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Removes the value stored at `key`.
    ///
    /// # Errors
    /// `BackendError::NotFound` if nothing is stored there.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Lists every leaf at or below `prefix`, in no particular order.
    ///
    /// A prefix with nothing under it yields an empty listing.
    ///
    /// # Errors
    /// Connection or remote rejection errors.
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Entry>, BackendError>;
}

#[async_trait]
impl<T: KvBackend + ?Sized> KvBackend for Arc<T> {
    async fn get(&self, key: &str) -> Result<String, BackendError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        (**self).delete(key).await
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Entry>, BackendError> {
        (**self).list_by_prefix(prefix).await
    }
}

/// Returns true when `key` sits at or below the directory `prefix`.
pub(crate) fn is_under_prefix(key: &str, prefix: &str) -> bool {
    let dir = prefix.trim_end_matches('/');

    key == dir
        || key
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}
