use crate::error::{Result, ToolError};
use crate::paths::home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Plain-file store for tokens that should stay out of the config file but
/// are not worth a keyring.
#[derive(Debug, Clone)]
pub struct SecretStore {
    base: Utf8PathBuf,
}

impl SecretStore {
    pub fn new(base: impl Into<Utf8PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// `~/.config/ewconfig/secrets/semi-secret`
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(
            home_dir()?.join(".config/ewconfig/secrets/semi-secret"),
        ))
    }

    pub fn base(&self) -> &Utf8Path {
        &self.base
    }

    /// Read `base[/namespace]/name`, trimmed of surrounding whitespace.
    pub fn get(&self, name: &str, namespace: Option<&str>) -> Result<String> {
        tracing::debug!("Attempting to load secret: {} (ns: {:?})", name, namespace);

        let mut file = self.base.clone();
        if let Some(namespace) = namespace {
            file.push(namespace);
        }
        file.push(name);

        if !file.exists() {
            return Err(ToolError::NotFound(format!(
                "Could not load secret from: {}",
                file
            )));
        }

        Ok(fs::read_to_string(&file)?.trim().to_string())
    }
}
