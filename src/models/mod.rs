//! Data models shared across the tools.
//!
//! - [`ToolsConfig`]: everything loaded from `ewtools.yaml` (Houdini paths and
//!   environment settings, per-host screenshot profiles, Trello boards)
//! - [`Edition`]: the closed set of Houdini product tiers
//! - [`Platform`]: host operating systems with a known install layout
//!
//! Tables that used to be module-level globals (host profiles, board ids,
//! edition binaries) live here as immutable values handed to the services at
//! startup.

pub mod config;
pub mod edition;
pub mod platform;

pub use config::{
    HoudiniConfig, MinecraftConfig, ScreenshotConfig, SyncProfile, ToolsConfig, TrelloBoard,
    TrelloConfig,
};
pub use edition::Edition;
pub use platform::Platform;
