//! Connection settings for a configuration service.
//!
//! A [`Settings`] value is fully resolved: defaults, the project manifest
//! name, the optional TOML defaults files and command-line overrides have
//! already been layered, and TLS files have been read into memory.

mod loading;
mod paths;


use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use toml::Value;
use tracing::{debug, warn};

pub use loading::{load_layers, manifest_application, merge_layers, merge_two_layers};
pub use paths::{LOCAL_FILE_NAME, MANIFEST_FILE_NAME, SettingsPaths};

use crate::{
    RenvError, Result,
    backend::TlsMaterial,
    config_store::{ConfigError, Namespace},
};

/// Environment used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "development";
/// Application used when neither settings nor the project manifest name one.
pub const DEFAULT_APPLICATION: &str = "app";
/// etcd endpoint used when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1:4001";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Everything needed to connect a [`ConfigService`](crate::config_store::ConfigService).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Application the configuration belongs to.
    pub application: String,
    /// Deployment environment, e.g. `production`.
    pub environment: String,
    /// etcd `host:port` endpoints in failover order.
    pub hosts: Vec<String>,
    /// TLS credentials; `None` means plaintext.
    pub tls: Option<TlsMaterial>,
    /// Per-request timeout enforced by the connection.
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: DEFAULT_APPLICATION.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            hosts: vec![DEFAULT_HOST.to_string()],
            tls: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Shape of a TOML defaults file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Application name
    pub application: Option<String>,
    /// Environment name
    pub environment: Option<String>,
    /// etcd endpoints
    pub hosts: Option<Vec<String>>,
    /// Certificate authority files
    pub ca_paths: Option<Vec<PathBuf>>,
    /// Client certificate file
    pub cert_path: Option<PathBuf>,
    /// Client key file
    pub key_path: Option<PathBuf>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Values given explicitly on the command line; they win over every file.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    /// `--application`
    pub application: Option<String>,
    /// `--environment`
    pub environment: Option<String>,
    /// `--hosts`; empty means not given
    pub hosts: Vec<String>,
    /// `--ca-path`; empty means not given
    pub ca_paths: Vec<PathBuf>,
    /// `--cert-path`
    pub cert_path: Option<PathBuf>,
    /// `--key-path`
    pub key_path: Option<PathBuf>,
}

impl Settings {
    /// Resolves settings from the user and project defaults files plus overrides.
    ///
    /// The working directory's `package.json` name, when present, replaces
    /// the built-in default application.
    ///
    /// # Errors
    /// Returns error if a defaults file or the manifest is unreadable or
    /// invalid, or TLS files cannot be read.
    pub fn load(overrides: &SettingsOverrides) -> Result<Self> {
        let manifest = SettingsPaths::package_manifest().ok();
        Self::from_sources(
            &SettingsPaths::layered_files(),
            manifest.as_deref(),
            overrides,
        )
    }

    /// Resolves settings from the given defaults files, later files winning.
    ///
    /// # Errors
    /// Returns error if a file is unreadable or invalid, or TLS files cannot be read.
    pub fn from_files<P: AsRef<Path>>(paths: &[P], overrides: &SettingsOverrides) -> Result<Self> {
        Self::from_sources(paths, None, overrides)
    }

    /// Resolves settings from defaults files and an optional project manifest.
    ///
    /// Precedence, lowest first: built-in defaults, the manifest `name`, the
    /// files in order, then `overrides`.
    ///
    /// # Errors
    /// Returns error if a file or the manifest is unreadable or invalid, or
    /// TLS files cannot be read.
    pub fn from_sources<P: AsRef<Path>>(
        paths: &[P],
        manifest: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self> {
        let merged = load_layers(paths)?;
        let default_application = match manifest {
            Some(path) => manifest_application(path)?,
            None => None,
        };
        Self::resolve(merged, default_application, overrides)
    }

    /// Resolves settings from an already merged TOML document.
    ///
    /// # Errors
    /// Returns error if the document has unknown or mistyped fields, a value
    /// is empty, or TLS files cannot be read.
    pub fn from_value(value: Value, overrides: &SettingsOverrides) -> Result<Self> {
        Self::resolve(value, None, overrides)
    }

    fn resolve(
        value: Value,
        default_application: Option<String>,
        overrides: &SettingsOverrides,
    ) -> Result<Self> {
        let file: SettingsFile =
            value
                .try_into()
                .map_err(|e: toml::de::Error| RenvError::SettingsValidation {
                    details: e.to_string(),
                })?;

        let defaults = Settings::default();

        let application = overrides
            .application
            .clone()
            .or(file.application)
            .or(default_application)
            .unwrap_or(defaults.application);
        let environment = overrides
            .environment
            .clone()
            .or(file.environment)
            .unwrap_or(defaults.environment);
        let hosts = if overrides.hosts.is_empty() {
            file.hosts.unwrap_or(defaults.hosts)
        } else {
            overrides.hosts.clone()
        };
        let timeout = match file.timeout_secs {
            Some(0) => {
                return Err(RenvError::SettingsValidation {
                    details: "timeout_secs must be greater than zero".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        let ca_paths = if overrides.ca_paths.is_empty() {
            file.ca_paths.unwrap_or_default()
        } else {
            overrides.ca_paths.clone()
        };
        let cert_path = overrides.cert_path.clone().or(file.cert_path);
        let key_path = overrides.key_path.clone().or(file.key_path);
        let tls = load_tls(&ca_paths, cert_path.as_deref(), key_path.as_deref())?;

        let settings = Self {
            application,
            environment,
            hosts,
            tls,
            timeout,
        };
        settings.validate()?;

        debug!(
            application = %settings.application,
            environment = %settings.environment,
            hosts = ?settings.hosts,
            tls = settings.tls.is_some(),
            "resolved settings"
        );
        Ok(settings)
    }

    /// The namespace these settings address.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - if the application or environment contains `/` or `.`
    pub fn namespace(&self) -> std::result::Result<Namespace, ConfigError> {
        Namespace::new(self.application.clone(), self.environment.clone())
    }

    /// The same connection settings aimed at another namespace.
    pub fn with_namespace(
        &self,
        application: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            environment: environment.into(),
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.application.is_empty() {
            return Err(RenvError::SettingsValidation {
                details: "application must not be empty".to_string(),
            });
        }

        if self.environment.is_empty() {
            return Err(RenvError::SettingsValidation {
                details: "environment must not be empty".to_string(),
            });
        }

        if self.hosts.is_empty() || self.hosts.iter().any(String::is_empty) {
            return Err(RenvError::SettingsValidation {
                details: "at least one non-empty etcd host is required".to_string(),
            });
        }

        Ok(())
    }
}

/// Reads TLS files into memory when both a certificate and a key are given.
fn load_tls(
    ca_paths: &[PathBuf],
    cert_path: Option<&Path>,
    key_path: Option<&Path>,
) -> Result<Option<TlsMaterial>> {
    let (cert_path, key_path) = match (cert_path, key_path) {
        (Some(cert), Some(key)) => (cert, key),
        (None, None) => return Ok(None),
        _ => {
            warn!("TLS needs both cert_path and key_path; connecting without TLS");
            return Ok(None);
        }
    };

    let read = |path: &Path| fs::read(path).map_err(|e| RenvError::tls(e, path));

    let ca_certificates = ca_paths
        .iter()
        .map(|path| read(path.as_path()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(TlsMaterial {
        ca_certificates,
        client_certificate: read(cert_path)?,
        client_key: read(key_path)?,
    }))
}
