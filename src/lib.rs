// ewtools - Launch and housekeeping tools for DCC, screenshot and game workflows
//
// This is the library crate containing the tool logic and data structures.
// The binary crate (main.rs) provides the CLI entry point.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod paths;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{Result, ToolError};
pub use models::{Edition, Platform, SyncProfile, ToolsConfig};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
