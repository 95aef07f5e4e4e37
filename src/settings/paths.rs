use std::{
    env,
    io::{Error, ErrorKind},
    path::PathBuf,
};

/// Name of the per-project defaults file looked up in the working directory.
pub const LOCAL_FILE_NAME: &str = ".renv.toml";

/// Project manifest whose `name` supplies the default application.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Utility struct for locating settings files
///
/// Follows the XDG Base Directory specification for the user-wide file and
/// uses the working directory for the per-project file.
pub struct SettingsPaths;

impl SettingsPaths {
    /// Returns the user configuration directory for renv
    ///
    /// Follows the XDG Base Directory specification:
    /// - First checks `XDG_CONFIG_HOME`
    /// - Falls back to `$HOME/.config`
    /// - Appends "renv" to the base config directory
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` environment variables are set
    pub fn config_dir() -> Result<PathBuf, Error> {
        let config_home = env::var("XDG_CONFIG_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.config")))
            .map_err(|_| {
                Error::new(
                    ErrorKind::NotFound,
                    "Neither XDG_CONFIG_HOME nor HOME environment variable found",
                )
            })?;

        Ok(PathBuf::from(config_home).join("renv"))
    }

    /// Returns the path to the user-wide defaults file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined
    pub fn global_file() -> Result<PathBuf, Error> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the per-project defaults file
    ///
    /// # Errors
    /// Returns an error if the working directory is inaccessible
    pub fn local_file() -> Result<PathBuf, Error> {
        Ok(env::current_dir()?.join(LOCAL_FILE_NAME))
    }

    /// Returns the path to the project manifest in the working directory
    ///
    /// # Errors
    /// Returns an error if the working directory is inaccessible
    pub fn package_manifest() -> Result<PathBuf, Error> {
        Ok(env::current_dir()?.join(MANIFEST_FILE_NAME))
    }

    /// Defaults files in increasing order of precedence; missing ones are skipped later
    pub fn layered_files() -> Vec<PathBuf> {
        [Self::global_file(), Self::local_file()]
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }
}
