//! Credentials config file loading.
//!
//! A TOML file holds the account credentials used only when no saved
//! cookie store exists:
//!
//! ```toml
//! [x]
//! username = "myhandle"
//! email = "me@example.com"
//! password = "hunter2"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur while loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML of the expected shape.
    #[error("config file {path} is malformed: {source}")]
    Malformed {
        /// The config file path.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Account credentials for the login flow.
///
/// The password is redacted in Debug output.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Account handle.
    pub username: String,
    /// Account email, used as the alternate identifier when asked.
    pub email: String,
    /// Account password (sensitive - never log).
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Top-level config file contents.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Credentials for the X account.
    pub x: Credentials,
}

impl Config {
    /// Loads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read or
    /// [`ConfigError::Malformed`] when it does not parse.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&data).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(username = %config.x.username, "loaded credentials config");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[x]\nusername = \"handle\"\nemail = \"me@example.com\"\npassword = \"pw\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.x.username, "handle");
        assert_eq!(config.x.email, "me@example.com");
        assert_eq!(config.x.password, "pw");
    }

    #[test]
    fn test_config_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_config_load_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[x]\nusername = \"handle\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not toml at all [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "handle".to_string(),
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
