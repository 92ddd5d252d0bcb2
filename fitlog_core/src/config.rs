//! Configuration file support for fitlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitlog/config.toml`.

use crate::{Error, FileStorage, MalformedRowPolicy, Result, StorageFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Workout file layout and load behavior
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub format: StorageFormat,

    /// Defaults to a name derived from `format` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default)]
    pub on_malformed: MalformedRowPolicy,
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("fitlog")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            config_path => {
                tracing::info!("No config file found at {:?}, using defaults", config_path);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("fitlog").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()
            .ok_or_else(|| Error::Config("No config directory available".into()))?;
        self.save_to(&config_path)
    }

    /// File name of the workout store
    pub fn file_name(&self) -> &str {
        self.storage
            .file_name
            .as_deref()
            .unwrap_or_else(|| self.storage.format.default_file_name())
    }

    /// Full path of the workout store
    pub fn storage_path(&self) -> PathBuf {
        self.data.data_dir.join(self.file_name())
    }

    /// Storage backend described by this configuration
    pub fn open_storage(&self) -> FileStorage {
        FileStorage::new(self.storage_path(), self.storage.format)
            .with_policy(self.storage.on_malformed)
    }

    fn validate(&self) -> Result<()> {
        match self.storage.file_name.as_deref() {
            Some(name) if name.trim().is_empty() => {
                Err(Error::Config("storage.file_name must not be empty".into()))
            }
            Some(name) if Path::new(name).components().count() != 1 => Err(Error::Config(
                format!("storage.file_name must be a bare file name, got {:?}", name),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordStorage;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.format, StorageFormat::Tabular);
        assert_eq!(config.storage.on_malformed, MalformedRowPolicy::Abort);
        assert_eq!(config.file_name(), "workouts.csv");
        assert!(config.data.data_dir.ends_with("fitlog"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.storage.format = StorageFormat::Delimited;
        config.storage.on_malformed = MalformedRowPolicy::Skip;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.storage.format, StorageFormat::Delimited);
        assert_eq!(parsed.storage.on_malformed, MalformedRowPolicy::Skip);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[storage]
format = "delimited"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.format, StorageFormat::Delimited);
        assert_eq!(config.storage.on_malformed, MalformedRowPolicy::Abort); // default
        assert_eq!(config.file_name(), "workouts.txt");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        std::fs::write(
            &config_path,
            format!(
                "[data]\ndata_dir = {:?}\n\n[storage]\nfile_name = \"log.csv\"\non_malformed = \"skip\"\n",
                data_dir
            ),
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.storage_path(), data_dir.join("log.csv"));

        let storage = config.open_storage();
        assert_eq!(storage.location(), data_dir.join("log.csv"));
        assert_eq!(storage.policy(), MalformedRowPolicy::Skip);
    }

    #[test]
    fn test_save_to_and_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.storage.file_name = Some("mine.txt".into());
        config.save_to(&config_path).unwrap();

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded.file_name(), "mine.txt");
    }

    #[test]
    fn test_rejects_nested_file_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[storage]\nfile_name = \"../escape.csv\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_format_is_toml_error() {
        let err = toml::from_str::<Config>("[storage]\nformat = \"xml\"\n");
        assert!(err.is_err());
    }
}
