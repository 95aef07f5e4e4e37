//! renv - hierarchical application configuration stored in etcd.
//!
//! Values live under `/{application}/{environment}/...` in a key-value store
//! and are read back as nested trees. The main pieces are:
//!
//! - A namespace engine that maps dotted keys onto storage paths
//! - Concurrent bulk writes and deletes with per-key failure reports
//! - An etcd v2 backend and an in-memory backend for tests
//! - A CLI for reading, writing, importing and merging environments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use renv::{config_store::ConfigService, settings::{Settings, SettingsOverrides}};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(&SettingsOverrides::default())?;
//! let service = ConfigService::connect(&settings)?;
//!
//! service.set(&["database.host=db1", "database.port=5432"]).await?;
//! let database = service.get_environment(Some("database")).await?;
//! println!("{}", database.to_json());
//! # Ok(())
//! # }
//! ```

/// Key-value backends: etcd and in-memory.
pub mod backend;

/// Command-line interface for configuration management.
pub mod cli;

/// Namespace engine over a key-value backend.
pub mod config_store;

/// Core error types and result aliases.
pub mod core;

/// Connection settings and their defaults files.
pub mod settings;

/// Logging setup for the binary.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{RenvError, Result};
