//! Houdini installation discovery.
//!
//! Installs live side by side under a base directory, one directory per
//! version (`/opt/hfs19.5.605`, `C:/Program Files/Side Effects Software/Houdini 19.5.605`).
//! When no version is requested the lexically greatest candidate wins.
//!
//! Lexical ordering is deliberate: `hfs9.0` sorts after `hfs10.0`. Version
//! strings with differing digit counts can therefore be misordered.
//!
//! # Examples
//!
//! ```ignore
//! use ewtools::models::Platform;
//! use ewtools::services::InstallationResolver;
//!
//! let resolver = InstallationResolver::new(Platform::Linux);
//! let latest = resolver.resolve(None, None, false)?;
//! ```

use crate::error::Result;
use crate::models::Platform;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;

/// Builds that are never picked as "latest".
const EXCLUDED_BUILD_MARKER: &str = "Server";

/// A directory that looks like a versioned Houdini install.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InstallationCandidate {
    pub path: Utf8PathBuf,
    pub version: String,
}

pub struct InstallationResolver {
    platform: Platform,

    /// Matches install directory names and captures the version token
    name_pattern: Regex,
}

impl InstallationResolver {
    pub fn new(platform: Platform) -> Self {
        let pattern = format!("^{}(.+)$", regex::escape(platform.install_prefix()));
        Self {
            platform,
            name_pattern: Regex::new(&pattern).expect("Invalid installation name regex"),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Locate a Houdini install.
    ///
    /// # Arguments
    /// * `version` - Exact version to target; `None` picks the latest install
    /// * `base_path` - Directory to search; `None` uses the platform default
    /// * `allow_missing` - Return the constructed path for `version` even if it does not exist
    ///
    /// # Returns
    /// The install path, or `None` when nothing suitable exists. Absence is
    /// not an error.
    pub fn resolve(
        &self,
        version: Option<&str>,
        base_path: Option<&Utf8Path>,
        allow_missing: bool,
    ) -> Result<Option<Utf8PathBuf>> {
        tracing::debug!("Finding Houdini installation for version: {:?}", version);

        let base_path = match base_path {
            Some(path) => path.to_path_buf(),
            None => self.platform.default_install_base(),
        };
        tracing::debug!("Searching for Houdini installations in: {}", base_path);

        let Some(version) = version.filter(|v| !v.is_empty()) else {
            tracing::debug!("No version specified, finding latest installation");
            return self.find_latest(&base_path);
        };

        let installation_path = base_path.join(self.platform.install_dir_name(version));
        if !installation_path.exists() && !allow_missing {
            tracing::debug!("Installation path does not exist: {}", installation_path);
            return Ok(None);
        }

        tracing::debug!("Found installation path: {}", installation_path);
        Ok(Some(installation_path))
    }

    /// All candidate installs under `base_path`, sorted lexically by name.
    ///
    /// Excluded builds are filtered out. A missing base directory yields an
    /// empty list.
    pub fn scan(&self, base_path: &Utf8Path) -> Result<Vec<InstallationCandidate>> {
        if !base_path.is_dir() {
            tracing::debug!("Installation base does not exist: {}", base_path);
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for entry in fs::read_dir(base_path)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Some(captures) = self.name_pattern.captures(&name) else {
                continue;
            };
            if name.contains(EXCLUDED_BUILD_MARKER) {
                tracing::debug!("Ignoring excluded build: {}", name);
                continue;
            }
            candidates.push(InstallationCandidate {
                path: base_path.join(&name),
                version: captures[1].to_string(),
            });
        }

        candidates.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        tracing::debug!(
            "Search found the following Houdini installations: {:?}",
            candidates.iter().map(|c| c.path.as_str()).collect::<Vec<_>>()
        );

        Ok(candidates)
    }

    /// The lexically greatest install under `base_path`, if any.
    pub fn find_latest(&self, base_path: &Utf8Path) -> Result<Option<Utf8PathBuf>> {
        tracing::debug!("Looking for the latest Houdini installation in: {}", base_path);

        let latest = self.scan(base_path)?.pop().map(|c| c.path);
        if let Some(path) = &latest {
            tracing::debug!("Latest Houdini installation: {}", path);
        }
        Ok(latest)
    }

    /// Version token of an install directory, e.g. `19.5.605` for `hfs19.5.605`.
    pub fn installation_version(&self, installation: &Utf8Path) -> Option<String> {
        let name = installation.file_name()?;
        self.name_pattern
            .captures(name)
            .map(|captures| captures[1].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn base_with(names: &[&str]) -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        for name in names {
            fs::create_dir(base.join(name)).unwrap();
        }
        (temp_dir, base)
    }

    #[test]
    fn test_latest_skips_server_builds() {
        let (_temp_dir, base) = base_with(&["hfs19.5.493", "hfs19.5.605", "hfsServer19.5"]);
        let resolver = InstallationResolver::new(Platform::Linux);

        let latest = resolver.find_latest(&base).unwrap();
        assert_eq!(latest, Some(base.join("hfs19.5.605")));
    }

    #[test]
    fn test_empty_base_returns_none() {
        let (_temp_dir, base) = base_with(&["unrelated"]);
        let resolver = InstallationResolver::new(Platform::Linux);

        assert_eq!(resolver.find_latest(&base).unwrap(), None);
    }

    #[test]
    fn test_windows_pattern() {
        let (_temp_dir, base) = base_with(&["Houdini 19.0.720", "Houdini 19.5.605", "Houdini Server 19.5"]);
        let resolver = InstallationResolver::new(Platform::Windows);

        let latest = resolver.resolve(None, Some(base.as_path()), false).unwrap();
        assert_eq!(latest, Some(base.join("Houdini 19.5.605")));
    }

    #[test]
    fn test_explicit_version_missing() {
        let (_temp_dir, base) = base_with(&[]);
        let resolver = InstallationResolver::new(Platform::Linux);

        assert_eq!(resolver.resolve(Some("20.0.547"), Some(base.as_path()), false).unwrap(), None);
        assert_eq!(
            resolver.resolve(Some("20.0.547"), Some(base.as_path()), true).unwrap(),
            Some(base.join("hfs20.0.547"))
        );
    }

    #[test]
    fn test_lexical_ordering_limitation() {
        let (_temp_dir, base) = base_with(&["hfs10.0", "hfs9.0"]);
        let resolver = InstallationResolver::new(Platform::Linux);

        assert_eq!(resolver.find_latest(&base).unwrap(), Some(base.join("hfs9.0")));
    }

    #[test]
    fn test_installation_version() {
        let resolver = InstallationResolver::new(Platform::Linux);
        assert_eq!(
            resolver.installation_version(Utf8Path::new("/opt/hfs19.5.605")),
            Some("19.5.605".to_string())
        );
        assert_eq!(resolver.installation_version(Utf8Path::new("/opt/blender")), None);
    }
}
