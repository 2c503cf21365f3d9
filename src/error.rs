use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by the library layer.
///
/// The binary wraps these in `anyhow` and turns any of them into a single
/// logged error line and exit code 1.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to read image metadata from {path}: {message}")]
    Metadata { path: Utf8PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ToolError {
    pub fn external(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
