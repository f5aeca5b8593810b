//! User configuration.
//!
//! Configuration is stored as JSON in `<config dir>/config.json` and holds the
//! store credential and the store address. `ETU_API_KEY` and `ETU_TARGET`
//! override the file.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};
use crate::paths::config_dir;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_TARGET: &str = "https://etu.natwelch.com/api/";

const API_KEY_ENV: &str = "ETU_API_KEY";
const TARGET_ENV: &str = "ETU_TARGET";

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub target: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("target", &self.target)
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(CONFIG_FILE))
    }

    /// Load configuration from file, or return defaults if it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            JournalError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            JournalError::Config(format!("invalid config at {}: {}", path.display(), e))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Only a directory created here is restricted; an existing one may be shared.
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            JournalError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only; the file holds a credential.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Create the config file if it is missing.
    ///
    /// The new file is seeded from the environment. Returns the created path,
    /// or `None` when a config file already existed.
    pub fn ensure_exists() -> Result<Option<PathBuf>> {
        let path = Self::config_path()?;
        if path.exists() {
            return Ok(None);
        }

        let seeded = Config {
            api_key: non_empty_env(API_KEY_ENV).unwrap_or_default(),
            target: non_empty_env(TARGET_ENV).unwrap_or_else(|| DEFAULT_TARGET.to_string()),
        };
        seeded.save_to(&path)?;
        tracing::debug!(path = %path.display(), "created config file");
        Ok(Some(path))
    }

    /// Get the API key, preferring the environment over the file.
    pub fn api_key(&self) -> Option<String> {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            return Some(key);
        }
        let key = self.api_key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    /// Get the store address, preferring the environment over the file.
    pub fn target(&self) -> String {
        if let Some(target) = non_empty_env(TARGET_ENV) {
            return target;
        }
        let target = self.target.trim();
        if target.is_empty() {
            DEFAULT_TARGET.to_string()
        } else {
            target.to_string()
        }
    }

    /// Check that the effective configuration can reach a store.
    pub fn validate(&self) -> Result<()> {
        if self.api_key().is_none() {
            return Err(JournalError::Auth(format!(
                "API key not set. Run: etu config set api_key <key> (or set {API_KEY_ENV})"
            )));
        }
        url::Url::parse(&self.target())
            .map_err(|e| JournalError::Config(format!("invalid target '{}': {}", self.target(), e)))?;
        Ok(())
    }

    /// Set a config value by key name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_key" => self.api_key = value.trim().to_string(),
            "target" => {
                url::Url::parse(value)
                    .map_err(|e| JournalError::Config(format!("invalid target '{value}': {e}")))?;
                self.target = value.trim().to_string();
            }
            other => {
                return Err(JournalError::Config(format!(
                    "unknown config key '{other}' (expected api_key or target)"
                )));
            }
        }
        Ok(())
    }

    /// The API key with everything but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        match self.api_key() {
            Some(key) if key.chars().count() > 4 => {
                let chars: Vec<char> = key.chars().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{tail}")
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_guards::EnvGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let _key = unsafe { EnvGuard::set(API_KEY_ENV, "from-env") };
        let _target = unsafe { EnvGuard::set(TARGET_ENV, "https://env.example/") };

        let config = Config {
            api_key: "from-file".to_string(),
            target: "https://file.example/".to_string(),
        };
        assert_eq!(config.api_key().as_deref(), Some("from-env"));
        assert_eq!(config.target(), "https://env.example/");
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        let _key = unsafe { EnvGuard::remove(API_KEY_ENV) };
        let _target = unsafe { EnvGuard::remove(TARGET_ENV) };

        let config = Config::default();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.target(), DEFAULT_TARGET);
        assert!(config.validate().unwrap_err().is_auth());
    }

    #[test]
    #[serial]
    fn test_ensure_exists_creates_once() {
        let tmp = TempDir::new().unwrap();
        let _dir = unsafe { EnvGuard::set("ETU_CONFIG_DIR", tmp.path().join("etu")) };
        let _key = unsafe { EnvGuard::set(API_KEY_ENV, "seeded") };
        let _target = unsafe { EnvGuard::remove(TARGET_ENV) };

        let created = Config::ensure_exists().unwrap();
        assert_eq!(created, Some(tmp.path().join("etu").join(CONFIG_FILE)));
        assert_eq!(Config::ensure_exists().unwrap(), None);

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.api_key, "seeded");
        assert_eq!(loaded.target, DEFAULT_TARGET);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conf").join(CONFIG_FILE);
        Config::default().save_to(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        let dir_mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_leaves_existing_directory_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let shared = tmp.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::set_permissions(&shared, fs::Permissions::from_mode(0o755)).unwrap();

        let path = shared.join(CONFIG_FILE);
        Config::default().save_to(&path).unwrap();

        let dir_mode = fs::metadata(&shared).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o755);
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_load_missing_fields_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"api_key": "k"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.target, "");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, JournalError::Config(_)));
    }

    #[test]
    fn test_set_validates_keys() {
        let mut config = Config::default();
        config.set("target", "https://journal.example/").unwrap();
        assert_eq!(config.target, "https://journal.example/");
        assert!(config.set("target", "not a url").is_err());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    #[serial]
    fn test_masked_api_key() {
        let _key = unsafe { EnvGuard::remove(API_KEY_ENV) };
        let config = Config {
            api_key: "etu_abcdef1234".to_string(),
            target: String::new(),
        };
        assert_eq!(config.masked_api_key(), "****1234");
        assert_eq!(Config::default().masked_api_key(), "(not set)");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config {
            api_key: "secret".to_string(),
            target: String::new(),
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
