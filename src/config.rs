use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "BLOBSHELF_CONFIG";
pub const DATA_DIR_ENV: &str = "BLOBSHELF_DATA_DIR";
pub const DOWNLOAD_DIR_ENV: &str = "BLOBSHELF_DOWNLOAD_DIR";

/// Delay before a temporary download reference is released (5 seconds)
pub const DEFAULT_RELEASE_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_name: String,
    pub download_dir: PathBuf,
    pub release_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("blobshelf-data"),
            database_name: "file-storage.db".to_string(),
            download_dir: PathBuf::from("downloads"),
            release_delay_ms: DEFAULT_RELEASE_DELAY_MS,
        }
    }
}

impl AppConfig {
    /// Load config from the file named by `BLOBSHELF_CONFIG` (if any), then
    /// apply directory overrides from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => AppConfig::default(),
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = std::env::var_os(DOWNLOAD_DIR_ENV) {
            config.download_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_name.trim().is_empty() {
            return Err(ConfigError::Invalid("database_name must not be empty".to_string()));
        }
        if self.database_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "database_name must be a file name, got {}",
                self.database_name
            )));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_name)
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_directories() {
        let config = AppConfig::default();
        assert_eq!(config.database_path(), PathBuf::from("blobshelf-data/file-storage.db"));
        assert_eq!(config.release_delay(), Duration::from_secs(5));
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "download_dir": "/tmp/out", "release_delay_ms": 250 }}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.release_delay_ms, 250);
        assert_eq!(config.database_name, "file-storage.db");
    }

    #[test]
    fn rejects_database_name_with_separator() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "database_name": "nested/files.db" }}"#).unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_config_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
