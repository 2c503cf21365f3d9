use crate::error::{Result, ToolError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

/// Instance directory variable exported by the Minecraft launcher.
pub const INSTANCE_DIR_VAR: &str = "INST_MC_DIR";

const WAYPOINT_DIR_NAME: &str = "XaeroWaypoints";
const MULTIPLAYER_PREFIX: &str = "Multiplayer";

/// Shares Xaero's minimap waypoints between Minecraft instances.
///
/// Multiplayer waypoints are pushed to a global store when an instance exits
/// and pulled back into every instance before it launches.
#[derive(Debug, Clone)]
pub struct WaypointSync {
    instance_waypoints: Utf8PathBuf,
    global_dir: Utf8PathBuf,
}

impl WaypointSync {
    pub fn new(instance_dir: &Utf8Path, global_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            instance_waypoints: instance_dir.join(WAYPOINT_DIR_NAME),
            global_dir: global_dir.into(),
        }
    }

    /// Read the instance directory from `INST_MC_DIR`.
    pub fn from_env(global_dir: impl Into<Utf8PathBuf>) -> Result<Self> {
        let instance_dir = std::env::var(INSTANCE_DIR_VAR)
            .map_err(|_| ToolError::Configuration(format!("{} is not set", INSTANCE_DIR_VAR)))?;
        Ok(Self::new(Utf8Path::new(&instance_dir), global_dir))
    }

    pub fn instance_waypoints(&self) -> &Utf8Path {
        &self.instance_waypoints
    }

    /// Merge the global store over the instance's waypoints.
    pub fn prelaunch(&self) -> Result<()> {
        tracing::info!(
            "Copying {} to {}",
            self.global_dir,
            self.instance_waypoints
        );
        fs::create_dir_all(&self.instance_waypoints)?;

        if !self.global_dir.is_dir() {
            tracing::info!("No global waypoints yet at {}", self.global_dir);
            return Ok(());
        }
        copy_tree(&self.global_dir, &self.instance_waypoints)
    }

    /// Push every multiplayer waypoint directory to the global store.
    ///
    /// Returns the number of directories copied.
    pub fn postexit(&self) -> Result<usize> {
        if !self.instance_waypoints.exists() {
            tracing::info!("No waypoints to sync");
            return Ok(0);
        }

        let mut multiplayer = Vec::new();
        for entry in fs::read_dir(&self.instance_waypoints)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if entry.file_type()?.is_dir() && name.starts_with(MULTIPLAYER_PREFIX) {
                multiplayer.push(name);
            }
        }
        tracing::info!(
            "Found {} multiplayer waypoint directories",
            multiplayer.len()
        );

        for name in &multiplayer {
            let source = self.instance_waypoints.join(name);
            let destination = self.global_dir.join(name);
            tracing::info!("Copying {} to {}", source, destination);
            copy_tree(&source, &destination)?;
        }

        Ok(multiplayer.len())
    }
}

/// Recursively copy `source` into `destination`, merging with whatever is
/// already there and overwriting files of the same name.
pub fn copy_tree(source: &Utf8Path, destination: &Utf8Path) -> Result<()> {
    fs::create_dir_all(destination)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| ToolError::Io(e.into()))?;
        let Some(from) = Utf8Path::from_path(entry.path()) else {
            tracing::warn!("Skipping non-UTF-8 entry in {}", source);
            continue;
        };
        let Ok(relative) = from.strip_prefix(source) else {
            continue;
        };
        let to = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&to)?;
        } else {
            fs::copy(from, &to)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_utf8() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_copy_tree_merges() {
        let (_temp_dir, root) = temp_utf8();
        let source = root.join("src");
        let destination = root.join("dst");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("nested").join("a.txt"), "new").unwrap();
        fs::create_dir_all(destination.join("nested")).unwrap();
        fs::write(destination.join("nested").join("a.txt"), "old").unwrap();
        fs::write(destination.join("keep.txt"), "keep").unwrap();

        copy_tree(&source, &destination).unwrap();

        assert_eq!(fs::read_to_string(destination.join("nested/a.txt")).unwrap(), "new");
        assert_eq!(fs::read_to_string(destination.join("keep.txt")).unwrap(), "keep");
    }

    #[test]
    fn test_copy_tree_creates_deep_directories() {
        let (_temp_dir, root) = temp_utf8();
        let source = root.join("src");
        let destination = root.join("dst");
        fs::create_dir_all(source.join("a/b/c")).unwrap();
        fs::create_dir_all(source.join("empty")).unwrap();
        fs::write(source.join("a/b/c/deep.txt"), "deep").unwrap();
        fs::write(source.join("top.txt"), "top").unwrap();

        copy_tree(&source, &destination).unwrap();

        assert_eq!(fs::read_to_string(destination.join("a/b/c/deep.txt")).unwrap(), "deep");
        assert_eq!(fs::read_to_string(destination.join("top.txt")).unwrap(), "top");
        assert!(destination.join("empty").is_dir());
    }

    #[test]
    fn test_postexit_without_waypoints() {
        let (_temp_dir, root) = temp_utf8();
        let sync = WaypointSync::new(&root.join("instance"), root.join("global"));

        assert_eq!(sync.postexit().unwrap(), 0);
        assert!(!root.join("global").exists());
    }
}
