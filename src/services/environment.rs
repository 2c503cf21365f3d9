//! Launch environment construction for Houdini.
//!
//! The launch environment is the inherited process environment with an
//! overlay applied on top. Overlay entries always win, and later overlay
//! entries win over earlier ones. [`diff_environments`] exists only to report
//! what changed; nothing downstream branches on it.

use crate::services::project::ProjectLayout;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered environment-variable map.
pub type EnvMap = IndexMap<String, String>;

/// Houdini behaviour switches that are expressed as environment variables.
///
/// Falsy settings (`false`, `0`, `None`) produce no variable at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoudiniEnvironment {
    /// Print errors while loading dialog scripts and scripted operators.
    pub script_debug: bool,

    /// Send Python panel start-up errors to the console as well as the panel.
    pub show_py_panel_errors_in_console: bool,

    /// PDG cook status verbosity:
    ///
    /// 1. status message when a node finishes cooking
    /// 2. 1 + node error messages
    /// 3. generation/cook status, errors and warnings
    /// 4. 3 + a message per node callback invocation
    pub pdg_node_debug_level: u8,

    pub splash_message: Option<String>,

    /// Use the CPU OpenCL device bundled with Houdini.
    pub cpu_compute: bool,

    pub dump_core: bool,
}

impl Default for HoudiniEnvironment {
    fn default() -> Self {
        Self {
            script_debug: true,
            show_py_panel_errors_in_console: true,
            pdg_node_debug_level: 3,
            splash_message: Some("Loading with custom scripts".to_string()),
            cpu_compute: false,
            dump_core: false,
        }
    }
}

impl HoudiniEnvironment {
    pub fn to_env_vars(&self) -> EnvMap {
        let mut vars = EnvMap::new();

        if self.script_debug {
            vars.insert("HOUDINI_SCRIPT_DEBUG".into(), "1".into());
        }
        if let Some(message) = self.splash_message.as_deref().filter(|m| !m.is_empty()) {
            vars.insert("HOUDINI_SPLASH_MESSAGE".into(), message.to_string());
        }
        if self.show_py_panel_errors_in_console {
            vars.insert("HOUDINI_CONSOLE_PYTHON_PANEL_ERROR".into(), "1".into());
        }
        if self.pdg_node_debug_level > 0 {
            vars.insert(
                "HOUDINI_PDG_NODE_DEBUG".into(),
                self.pdg_node_debug_level.to_string(),
            );
        }
        if self.cpu_compute {
            vars.insert("HOUDINI_OCL_DEVICETYPE".into(), "CPU".into());
            vars.insert("HOUDINI_USE_HFS_OCL".into(), "1".into());
        }
        if self.dump_core {
            vars.insert("HOUDINI_COREDUMP".into(), "1".into());
        }

        vars
    }
}

/// Variables set on top of the inherited environment.
///
/// `project` is `None` when project-path injection is disabled, in which case
/// neither `JOB` nor `HOUDINI_HIP_DEFAULT_NAME` is set.
pub fn build_overlay(settings: &HoudiniEnvironment, project: Option<&ProjectLayout>) -> EnvMap {
    let mut overlay = settings.to_env_vars();
    if let Some(project) = project {
        overlay.insert("JOB".into(), project.path.to_string());
        overlay.insert(
            "HOUDINI_HIP_DEFAULT_NAME".into(),
            project.save_file_name().to_string(),
        );
    }
    overlay
}

pub fn apply_overlay(baseline: &EnvMap, overlay: &EnvMap) -> EnvMap {
    let mut env = baseline.clone();
    for (key, value) in overlay {
        env.insert(key.clone(), value.clone());
    }
    env
}

/// Entries of `new` whose key is missing from `baseline` or whose value differs.
pub fn diff_environments(new: &EnvMap, baseline: &EnvMap) -> EnvMap {
    new.iter()
        .filter(|(key, value)| baseline.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Snapshot of the current process environment. Non-UTF-8 entries are dropped.
pub fn current_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    fn baseline() -> EnvMap {
        let mut env = EnvMap::new();
        env.insert("PATH".into(), "/usr/bin".into());
        env.insert("HOME".into(), "/home/user".into());
        env
    }

    #[test]
    fn test_default_settings_vars() {
        let vars = HoudiniEnvironment::default().to_env_vars();
        assert_eq!(vars["HOUDINI_SCRIPT_DEBUG"], "1");
        assert_eq!(vars["HOUDINI_SPLASH_MESSAGE"], "Loading with custom scripts");
        assert_eq!(vars["HOUDINI_CONSOLE_PYTHON_PANEL_ERROR"], "1");
        assert_eq!(vars["HOUDINI_PDG_NODE_DEBUG"], "3");
        assert!(!vars.contains_key("HOUDINI_OCL_DEVICETYPE"));
        assert!(!vars.contains_key("HOUDINI_COREDUMP"));
    }

    #[test]
    fn test_falsy_settings_omitted() {
        let settings = HoudiniEnvironment {
            script_debug: false,
            show_py_panel_errors_in_console: false,
            pdg_node_debug_level: 0,
            splash_message: None,
            cpu_compute: false,
            dump_core: false,
        };
        assert!(settings.to_env_vars().is_empty());
    }

    #[test]
    fn test_cpu_and_core_dump() {
        let settings = HoudiniEnvironment {
            cpu_compute: true,
            dump_core: true,
            ..Default::default()
        };
        let vars = settings.to_env_vars();
        assert_eq!(vars["HOUDINI_OCL_DEVICETYPE"], "CPU");
        assert_eq!(vars["HOUDINI_USE_HFS_OCL"], "1");
        assert_eq!(vars["HOUDINI_COREDUMP"], "1");
    }

    #[test]
    fn test_overlay_without_project_matches_debug_vars() {
        let settings = HoudiniEnvironment::default();
        let overlay = build_overlay(&settings, None);

        assert_eq!(overlay, settings.to_env_vars());
        assert!(!overlay.contains_key("JOB"));
        assert!(!overlay.contains_key("HOUDINI_HIP_DEFAULT_NAME"));
    }

    #[test]
    fn test_overlay_with_project() {
        let project = ProjectLayout::new(Utf8Path::new("/projects"), "demo", Some("shot010"));
        let overlay = build_overlay(&HoudiniEnvironment::default(), Some(&project));

        assert_eq!(overlay["JOB"], "/projects/demo");
        assert_eq!(overlay["HOUDINI_HIP_DEFAULT_NAME"], "shot010.hip");
    }

    #[test]
    fn test_overlay_wins_over_inherited() {
        let mut base = baseline();
        base.insert("HOUDINI_SCRIPT_DEBUG".into(), "0".into());
        let overlay = HoudiniEnvironment::default().to_env_vars();

        let env = apply_overlay(&base, &overlay);
        assert_eq!(env["HOUDINI_SCRIPT_DEBUG"], "1");
        assert_eq!(env["PATH"], "/usr/bin");
    }

    #[test]
    fn test_diff_identical_is_empty() {
        assert!(diff_environments(&baseline(), &baseline()).is_empty());
    }

    #[test]
    fn test_diff_reports_added_key() {
        let mut new = baseline();
        new.insert("X".into(), "1".into());

        let diff = diff_environments(&new, &baseline());
        assert_eq!(diff.len(), 1);
        assert_eq!(diff["X"], "1");
    }

    #[test]
    fn test_diff_reports_changed_value() {
        let mut new = baseline();
        new.insert("PATH".into(), "/opt/bin".into());

        let diff = diff_environments(&new, &baseline());
        assert_eq!(diff.len(), 1);
        assert_eq!(diff["PATH"], "/opt/bin");
    }
}
