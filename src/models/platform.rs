use crate::error::{Result, ToolError};
use camino::Utf8PathBuf;

/// Host operating systems with a known Houdini install layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Detect the platform this binary was built for.
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(ToolError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Default directory that holds versioned Houdini installs.
    pub fn default_install_base(&self) -> Utf8PathBuf {
        match self {
            Platform::Linux => Utf8PathBuf::from("/opt"),
            Platform::Windows => Utf8PathBuf::from("C:/Program Files/Side Effects Software"),
        }
    }

    /// Prefix every install directory name starts with, e.g. `hfs19.5.605`.
    pub fn install_prefix(&self) -> &'static str {
        match self {
            Platform::Linux => "hfs",
            Platform::Windows => "Houdini ",
        }
    }

    pub fn install_dir_name(&self, version: &str) -> String {
        format!("{}{}", self.install_prefix(), version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_platforms() {
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("windows").unwrap(), Platform::Windows);
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let err = Platform::from_os("macos").unwrap_err();
        assert!(matches!(err, ToolError::UnsupportedPlatform(ref os) if os == "macos"));
    }

    #[test]
    fn test_install_dir_names() {
        assert_eq!(Platform::Linux.install_dir_name("19.5.605"), "hfs19.5.605");
        assert_eq!(Platform::Windows.install_dir_name("19.5.605"), "Houdini 19.5.605");
    }
}
