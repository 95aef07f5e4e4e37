use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    backend::{EtcdBackend, KvBackend},
    settings::Settings,
};

use super::{
    BulkReport, ConfigError, ConfigKey, ConfigNode, ConfigTree, Namespace,
    bulk::{self, Delete, Write},
    key::{ROOT_PREFIX, decode_key, encode_key},
    merge::merge_namespaces,
    pairs::parse_pairs,
    path_ops::{build_tree, extract_path, flatten_tree, tree_from_entries},
    tree::ConfigEntry,
};

/// Reads and mutates the configuration of one namespace.
///
/// The service owns its backend connection exclusively and keeps no copy of
/// the configuration: every read rebuilds the tree from the backend.
pub struct ConfigService {
    namespace: Namespace,
    backend: Box<dyn KvBackend>,
}

impl ConfigService {
    /// Creates a service over any backend.
    pub fn with_backend(namespace: Namespace, backend: impl KvBackend + 'static) -> Self {
        Self {
            namespace,
            backend: Box::new(backend),
        }
    }

    /// Connects to the etcd cluster described by `settings`.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - if the application or environment is invalid
    /// * `ConfigError::Connection` - if the endpoints or TLS material are unusable
    pub fn connect(settings: &Settings) -> Result<Self, ConfigError> {
        let namespace = settings.namespace()?;
        let backend = EtcdBackend::new(&settings.hosts, settings.tls.as_ref(), settings.timeout)?;

        debug!(%namespace, hosts = ?settings.hosts, "connected config service");
        Ok(Self::with_backend(namespace, backend))
    }

    /// The namespace this service operates on.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Reads the namespace, or the part of it below `sub_key`.
    ///
    /// An empty namespace yields an empty tree. A `sub_key` naming a value
    /// yields that leaf.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - if `sub_key` is malformed
    /// * `ConfigError::NotFound` - if `sub_key` does not resolve
    /// * `ConfigError::StructuralConflict` - if the stored keys collide
    /// * backend errors from the listing
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn get_environment(&self, sub_key: Option<&str>) -> Result<ConfigNode, ConfigError> {
        let key = sub_key.map(ConfigKey::parse).transpose()?;
        self.get_node(key.as_ref()).await
    }

    /// [`get_environment`](Self::get_environment) for an already parsed key.
    ///
    /// # Errors
    /// As `get_environment`, minus key parsing.
    pub async fn get_node(&self, key: Option<&ConfigKey>) -> Result<ConfigNode, ConfigError> {
        let prefix = self.namespace.prefix();

        let Some(key) = key else {
            let entries = self.backend.list_by_prefix(&prefix).await?;
            return Ok(build_tree(&prefix, &entries)?.into());
        };

        let entries = self
            .backend
            .list_by_prefix(&encode_key(&prefix, key)?)
            .await?;
        let tree = build_tree(&prefix, &entries)?;

        extract_path(&tree, key).cloned()
    }

    /// Parses `key=value` tokens and writes every pair concurrently.
    ///
    /// Nothing is written if any token or key is malformed, or if the batch
    /// itself uses a key both as a value and as a parent.
    ///
    /// # Errors
    /// * `ConfigError::MalformedPair`, `ConfigError::InvalidKey` or
    ///   `ConfigError::StructuralConflict` - before any write is issued
    /// * `ConfigError::PartialFailure` - if some writes failed; applied writes stay
    #[instrument(skip(self, tokens), fields(namespace = %self.namespace, count = tokens.len()))]
    pub async fn set<S: AsRef<str>>(&self, tokens: &[S]) -> Result<BulkReport, ConfigError> {
        let entries = parse_pairs(tokens)?
            .into_iter()
            .map(|(key, value)| Ok(ConfigEntry::new(ConfigKey::parse(&key)?, value)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        tree_from_entries(&entries)?;

        self.write_entries(entries).await
    }

    /// Deletes every key concurrently. Missing keys count as deleted.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - before any delete is issued
    /// * `ConfigError::PartialFailure` - if some deletes failed
    #[instrument(skip(self, keys), fields(namespace = %self.namespace, count = keys.len()))]
    pub async fn del<S: AsRef<str>>(&self, keys: &[S]) -> Result<BulkReport, ConfigError> {
        let prefix = self.namespace.prefix();

        let deletes = keys
            .iter()
            .map(|key| {
                let key = ConfigKey::parse(key.as_ref())?;
                let storage_key = encode_key(&prefix, &key)?;
                Ok(Delete { key, storage_key })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        bulk::delete_all(self.backend.as_ref(), deletes)
            .await
            .into_result()
    }

    /// Flattens a JSON object and writes it below `sub_key`, or the
    /// namespace root.
    ///
    /// # Errors
    /// * `ConfigError::InvalidImport` or `ConfigError::InvalidKey` - before any write
    /// * `ConfigError::PartialFailure` - if some writes failed
    #[instrument(skip(self, json), fields(namespace = %self.namespace))]
    pub async fn set_object(
        &self,
        json: &Value,
        sub_key: Option<&str>,
    ) -> Result<BulkReport, ConfigError> {
        let tree = ConfigTree::from_json(json)?;
        let root = sub_key.map(ConfigKey::parse).transpose()?;

        let entries = flatten_tree(&tree)
            .into_iter()
            .map(|entry| match &root {
                Some(root) => ConfigEntry::new(root.join(&entry.key), entry.value),
                None => entry,
            })
            .collect();

        self.write_entries(entries).await
    }

    /// Deletes every key in the namespace concurrently.
    ///
    /// Best effort: on partial failure the deleted keys stay deleted and the
    /// report lists the ones that remain.
    ///
    /// # Errors
    /// * `ConfigError::PartialFailure` - if some deletes failed
    /// * backend errors from the listing
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn delete_environment(&self) -> Result<BulkReport, ConfigError> {
        let prefix = self.namespace.prefix();
        let entries = self.backend.list_by_prefix(&prefix).await?;

        let deletes = entries
            .into_iter()
            .map(|entry| {
                Ok(Delete {
                    key: decode_key(&prefix, &entry.key)?,
                    storage_key: entry.key,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let report = bulk::delete_all(self.backend.as_ref(), deletes)
            .await
            .into_result()?;

        info!(deleted = report.succeeded.len(), "namespace destroyed");
        Ok(report)
    }

    /// Overlays `other`'s namespace onto this one, `other` winning on conflict.
    ///
    /// Both namespaces are read concurrently over their own connections.
    /// Nothing is written.
    ///
    /// # Errors
    /// Listing failures from either backend, or structural conflicts in either tree.
    #[instrument(skip(self, other), fields(target = %self.namespace, source = %other.namespace))]
    pub async fn merge(&self, other: &ConfigService) -> Result<ConfigTree, ConfigError> {
        merge_namespaces(
            self.backend.as_ref(),
            &self.namespace.prefix(),
            other.backend.as_ref(),
            &other.namespace.prefix(),
        )
        .await
    }

    /// Reads the whole backend keyspace, across every namespace.
    ///
    /// # Errors
    /// Backend errors from the listing, or structural conflicts.
    #[instrument(skip(self))]
    pub async fn dump(&self) -> Result<ConfigTree, ConfigError> {
        let entries = self.backend.list_by_prefix("/").await?;
        build_tree(ROOT_PREFIX, &entries)
    }

    async fn write_entries(&self, entries: Vec<ConfigEntry>) -> Result<BulkReport, ConfigError> {
        let prefix = self.namespace.prefix();

        let writes = entries
            .into_iter()
            .map(|entry| {
                Ok(Write {
                    storage_key: encode_key(&prefix, &entry.key)?,
                    key: entry.key,
                    value: entry.value,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        bulk::write_all(self.backend.as_ref(), writes)
            .await
            .into_result()
    }
}
