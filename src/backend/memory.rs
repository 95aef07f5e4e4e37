use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BackendError, Entry, KvBackend, is_under_prefix};

/// Backend operation kinds, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `get`
    Get,
    /// `set`
    Set,
    /// `delete`
    Delete,
    /// `list_by_prefix`
    List,
}

/// In-process key-value store.
///
/// Behaves like a directory-structured store and can be told to reject
/// specific operations on specific keys, which makes partial failures
/// reproducible.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<BTreeMap<String, String>>,
    faults: RwLock<HashSet<(Operation, String)>>,
}

impl MemoryBackend {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given storage keys and values.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self {
            data: RwLock::new(data),
            faults: RwLock::default(),
        }
    }

    /// Makes every future `operation` on `key` fail with a rejection.
    pub async fn fail_on(&self, operation: Operation, key: impl Into<String>) {
        self.faults.write().await.insert((operation, key.into()));
    }

    /// Removes all injected failures.
    pub async fn clear_faults(&self) {
        self.faults.write().await.clear();
    }

    /// Returns a copy of everything currently stored.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.data.read().await.clone()
    }

    async fn check_fault(&self, operation: Operation, key: &str) -> Result<(), BackendError> {
        if self
            .faults
            .read()
            .await
            .contains(&(operation, key.to_string()))
        {
            return Err(BackendError::Rejected {
                key: key.to_string(),
                details: format!("injected {operation:?} failure"),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<String, BackendError> {
        self.check_fault(Operation::Get, key).await?;

        self.data
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                key: key.to_string(),
            })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.check_fault(Operation::Set, key).await?;

        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.check_fault(Operation::Delete, key).await?;

        self.data
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound {
                key: key.to_string(),
            })
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Entry>, BackendError> {
        self.check_fault(Operation::List, prefix).await?;

        let data = self.data.read().await;
        let entries = data
            .iter()
            .filter(|(key, _)| is_under_prefix(key, prefix))
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
            .collect();

        Ok(entries)
    }
}
