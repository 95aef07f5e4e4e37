use std::{fmt, str::FromStr};

use super::ConfigError;

/// Separator between segments of a storage key.
pub const SEPARATOR: char = '/';

/// Separator between segments of a dotted configuration key.
pub const KEY_DELIMITER: char = '.';

/// Prefix used when addressing the whole backend rather than one namespace.
pub const ROOT_PREFIX: &str = "";

/// An `(application, environment)` pair scoping one configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    application: String,
    environment: String,
}

impl Namespace {
    /// Creates a namespace.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - if either identifier is empty or contains `/` or `.`
    pub fn new(
        application: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let application = application.into();
        let environment = environment.into();

        validate_segment(&application, &application)?;
        validate_segment(&environment, &environment)?;

        Ok(Self {
            application,
            environment,
        })
    }

    /// The application identifier.
    pub fn application(&self) -> &str {
        &self.application
    }

    /// The environment identifier.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Root storage prefix, `/{application}/{environment}`.
    pub fn prefix(&self) -> String {
        format!(
            "{SEPARATOR}{}{SEPARATOR}{}",
            self.application, self.environment
        )
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// Hierarchical configuration key, e.g. `database.host`.
///
/// Always holds at least one segment and no segment is empty or contains
/// [`SEPARATOR`] or [`KEY_DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(Vec<String>);

impl ConfigKey {
    /// Parses a dotted key such as `database.host`.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - on empty segments or a `/` in any segment
    pub fn parse(dotted: &str) -> Result<Self, ConfigError> {
        let segments: Vec<String> = dotted.split(KEY_DELIMITER).map(str::to_string).collect();

        for segment in &segments {
            validate_segment(segment, dotted)?;
        }

        Ok(Self(segments))
    }

    /// Builds a key from already-split segments.
    ///
    /// # Errors
    /// * `ConfigError::InvalidKey` - if there are no segments, or any is invalid
    pub fn from_segments<I, S>(segments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let display = segments.join(".");

        if segments.is_empty() {
            return Err(ConfigError::InvalidKey {
                key: display,
                reason: "key has no segments".to_string(),
            });
        }

        for segment in &segments {
            validate_segment(segment, &display)?;
        }

        Ok(Self(segments))
    }

    /// Segments inside a tree are validated on insertion.
    pub(crate) fn from_trusted(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// The key's segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Appends `child` below this key.
    pub fn join(&self, child: &ConfigKey) -> ConfigKey {
        let mut segments = self.0.clone();
        segments.extend(child.0.iter().cloned());
        ConfigKey(segments)
    }

    /// True if `other` lies strictly below this key.
    pub fn is_ancestor_of(&self, other: &ConfigKey) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encodes `key` as a storage key below `prefix`.
///
/// `encode_key("/app/dev", database.host)` is `/app/dev/database/host`.
///
/// # Errors
/// * `ConfigError::InvalidKey` - if any segment is empty or contains `/` or `.`
pub fn encode_key(prefix: &str, key: &ConfigKey) -> Result<String, ConfigError> {
    let mut storage_key = prefix.trim_end_matches(SEPARATOR).to_string();

    for segment in key.segments() {
        validate_segment(segment, &key.to_string())?;
        storage_key.push(SEPARATOR);
        storage_key.push_str(segment);
    }

    Ok(storage_key)
}

/// Decodes a storage key found below `prefix` back into a [`ConfigKey`].
///
/// # Errors
/// * `ConfigError::OutOfNamespace` - if `storage_key` is not below `prefix`
/// * `ConfigError::InvalidKey` - if the remainder is empty or has empty segments
pub fn decode_key(prefix: &str, storage_key: &str) -> Result<ConfigKey, ConfigError> {
    let prefix = prefix.trim_end_matches(SEPARATOR);

    let remainder = storage_key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .ok_or_else(|| ConfigError::OutOfNamespace {
            key: storage_key.to_string(),
            prefix: prefix.to_string(),
        })?;

    ConfigKey::from_segments(remainder.split(SEPARATOR))
}

/// A segment is non-empty and holds neither [`SEPARATOR`] nor
/// [`KEY_DELIMITER`], so it maps to exactly one dotted and one storage segment.
/// This also rules out `.` and `..`.
pub(super) fn validate_segment(segment: &str, key: &str) -> Result<(), ConfigError> {
    if segment.is_empty() {
        return Err(ConfigError::InvalidKey {
            key: key.to_string(),
            reason: "empty segment".to_string(),
        });
    }

    if segment.contains(SEPARATOR) {
        return Err(ConfigError::InvalidKey {
            key: key.to_string(),
            reason: format!("segment '{segment}' contains '{SEPARATOR}'"),
        });
    }

    if segment.contains(KEY_DELIMITER) {
        return Err(ConfigError::InvalidKey {
            key: key.to_string(),
            reason: format!("segment '{segment}' contains '{KEY_DELIMITER}'"),
        });
    }

    Ok(())
}
