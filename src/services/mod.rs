//! Services module - the business logic behind each `ewtools` subcommand.
//!
//! Services take their configuration as explicit parameters and never touch
//! CLI parsing or logging setup, so each one is testable on its own.
//!
//! # Components
//!
//! - [`InstallationResolver`]: finds versioned Houdini installs on disk
//! - [`environment`]: Houdini settings, overlay construction, environment diffing
//! - [`ProjectLayout`]: project directory and save-file naming
//! - [`HoudiniLauncher`]: builds a [`LaunchPlan`] and runs Houdini in the foreground
//! - [`screenshots`]: EXIF timestamp normalization and per-host album sync
//! - [`Rclone`]: wrapper over the `rclone` CLI
//! - [`WaypointSync`]: Minecraft waypoint sharing between instances
//! - [`SecretStore`] / [`TrelloClient`]: Trello card management
//!
//! External programs (Houdini, rclone, touch) are started with tokio and
//! awaited one at a time. Non-zero exits are reported, never retried.

pub mod environment;
pub mod installations;
pub mod launcher;
pub mod project;
pub mod rclone;
pub mod screenshots;
pub mod secrets;
pub mod trello;
pub mod waypoints;

pub use environment::{EnvMap, HoudiniEnvironment, diff_environments};
pub use installations::{InstallationCandidate, InstallationResolver};
pub use launcher::{HoudiniLauncher, LaunchOptions, LaunchPlan, noncommercialize_path};
pub use project::ProjectLayout;
pub use rclone::Rclone;
pub use screenshots::{
    ExifMetadataEditor, MetadataEditor, NormalizeReport, ScreenshotSync, normalize_directory,
};
pub use secrets::SecretStore;
pub use trello::{Card, NewCard, TrelloClient};
pub use waypoints::WaypointSync;
