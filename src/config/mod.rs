use crate::models::ToolsConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "ewtools.yaml";

/// Prefix for environment overrides, e.g. `EWTOOLS__TRELLO__API_KEY`.
pub const ENV_PREFIX: &str = "EWTOOLS";

/// Configuration manager for loading and saving `ewtools.yaml`.
///
/// Values are layered: built-in defaults, then the YAML file (optional), then
/// `EWTOOLS__`-prefixed environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `ewtools.yaml`
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Manager for the platform config directory (`~/.config/ewtools` on Linux).
    pub fn default_location() -> Result<Self> {
        let base = dirs::config_dir().context("Cannot determine the user config directory")?;
        let base = Utf8PathBuf::from_path_buf(base)
            .map_err(|p| anyhow::anyhow!("Config directory is not UTF-8: {}", p.display()))?;
        Self::new(base.join("ewtools"))
    }

    /// Load the layered configuration.
    ///
    /// # Returns
    /// The loaded ToolsConfig; a missing file yields defaults
    pub fn load(&self) -> Result<ToolsConfig> {
        if !self.config_path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let layered = ::config::Config::builder()
            .add_source(
                ::config::File::from(self.config_path.as_std_path())
                    .format(::config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: ToolsConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::debug!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the configuration file.
    pub fn save(&self, config: &ToolsConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Seed the config file with defaults so users have something to edit.
    ///
    /// # Returns
    /// `true` if a file was written
    pub fn write_default_if_missing(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        self.save(&ToolsConfig::default())?;
        Ok(true)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert_eq!(manager.load().unwrap(), ToolsConfig::default());
    }

    #[test]
    fn test_write_default_once() {
        let (manager, _temp_dir) = create_test_config_manager();

        assert!(manager.write_default_if_missing().unwrap());
        assert!(!manager.write_default_if_missing().unwrap());
        assert!(manager.config_path().exists());
    }
}
