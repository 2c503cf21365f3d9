use crate::error::Result;
use crate::paths::prepend_if_relative;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Subdirectory created inside every project for render output.
pub const RENDER_DIR: &str = "render";

/// On-disk layout of a Houdini project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub path: Utf8PathBuf,
    pub save_file: Utf8PathBuf,
}

impl ProjectLayout {
    /// `project` is either a name under `projects_dir` or a direct path. The
    /// save file is named after the sub-project when given, otherwise after
    /// the project directory.
    pub fn new(projects_dir: &Utf8Path, project: &str, sub_project: Option<&str>) -> Self {
        let path = prepend_if_relative(projects_dir, Utf8Path::new(project));
        let stem = match sub_project {
            Some(sub) => sub.to_string(),
            None => path.file_name().unwrap_or(project).to_string(),
        };
        let save_file = path.join(format!("{}.hip", stem));
        Self { path, save_file }
    }

    pub fn save_file_name(&self) -> &str {
        self.save_file.file_name().unwrap_or_default()
    }

    pub fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(self.path.join(RENDER_DIR))?;
        Ok(())
    }
}
