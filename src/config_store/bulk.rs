use std::fmt;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::backend::{BackendError, KvBackend};

use super::{ConfigError, ConfigKey};

/// Outcome of a bulk write or delete.
///
/// Keys are reported in dotted form, in the order the operations were
/// requested.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Keys whose operation was applied.
    pub succeeded: Vec<String>,
    /// Keys whose operation failed, with the cause.
    pub failed: Vec<KeyFailure>,
}

/// A single failed operation within a bulk call.
#[derive(Debug)]
pub struct KeyFailure {
    /// Dotted key the operation targeted.
    pub key: String,
    /// Why it failed.
    pub cause: ConfigError,
}

impl BulkReport {
    /// True when every operation succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Keys whose operation failed.
    pub fn failed_keys(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.key.as_str()).collect()
    }

    /// Turns an incomplete report into `ConfigError::PartialFailure`.
    pub(super) fn into_result(self) -> Result<BulkReport, ConfigError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(ConfigError::PartialFailure { report: self })
        }
    }

    fn record(&mut self, key: &ConfigKey, outcome: Result<(), ConfigError>) {
        match outcome {
            Ok(()) => self.succeeded.push(key.to_string()),
            Err(cause) => {
                warn!(key = %key, error = %cause, "bulk operation failed for key");
                self.failed.push(KeyFailure {
                    key: key.to_string(),
                    cause,
                });
            }
        }
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.succeeded.len() + self.failed.len();
        write!(f, "{} of {} operations failed", self.failed.len(), total)?;

        for (i, failure) in self.failed.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{} ({})", failure.key, failure.cause)?;
        }

        Ok(())
    }
}

/// A write of `value` to `storage_key`, reported as `key`.
pub(super) struct Write {
    pub key: ConfigKey,
    pub storage_key: String,
    pub value: String,
}

/// A delete of `storage_key`, reported as `key`.
pub(super) struct Delete {
    pub key: ConfigKey,
    pub storage_key: String,
}

/// Issues every write at once and waits for all of them.
///
/// No ordering holds between the writes, so two writes to one key leave an
/// undefined final value.
pub(super) async fn write_all(backend: &dyn KvBackend, writes: Vec<Write>) -> BulkReport {
    debug!(count = writes.len(), "issuing concurrent writes");

    let outcomes = join_all(writes.iter().map(|write| async move {
        backend
            .set(&write.storage_key, &write.value)
            .await
            .map_err(ConfigError::from)
    }))
    .await;

    let mut report = BulkReport::default();
    for (write, outcome) in writes.iter().zip(outcomes) {
        report.record(&write.key, outcome);
    }

    report
}

/// Issues every delete at once and waits for all of them.
///
/// A key that is already gone counts as deleted.
pub(super) async fn delete_all(backend: &dyn KvBackend, deletes: Vec<Delete>) -> BulkReport {
    debug!(count = deletes.len(), "issuing concurrent deletes");

    let outcomes = join_all(deletes.iter().map(|delete| async move {
        match backend.delete(&delete.storage_key).await {
            Ok(()) | Err(BackendError::NotFound { .. }) => Ok(()),
            Err(e) => Err(ConfigError::from(e)),
        }
    }))
    .await;

    let mut report = BulkReport::default();
    for (delete, outcome) in deletes.iter().zip(outcomes) {
        report.record(&delete.key, outcome);
    }

    report
}
