use crate::error::{Result, ToolError};
use crate::models::Edition;
use crate::services::environment::{
    apply_overlay, build_overlay, diff_environments, EnvMap, HoudiniEnvironment,
};
use crate::services::project::ProjectLayout;
use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;

/// Non-commercial tiers save with a suffixed extension (`.hipnc`, `.hiplc`).
const NONCOMMERCIAL_SUFFIXES: [&str; 2] = ["nc", "lc"];

/// Everything needed to start Houdini, computed before anything is spawned.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub program: Utf8PathBuf,
    pub args: Vec<String>,

    /// Complete child environment (inherited + overlay)
    pub env: EnvMap,

    /// Only the variables this tool sets
    pub overlay: EnvMap,

    pub working_dir: Utf8PathBuf,
}

impl LaunchPlan {
    /// Human-readable command line for logging.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub edition: Edition,
    pub no_project_env: bool,
    pub cpu: bool,
    pub dump_core: bool,
}

/// Prefer an existing non-commercial variant of `path`.
///
/// `scene.hip` becomes `scene.hipnc` (or `scene.hiplc`) when that file exists
/// on disk; otherwise `path` is returned unchanged.
pub fn noncommercialize_path(path: &Utf8Path) -> Utf8PathBuf {
    let Some(extension) = path.extension() else {
        return path.to_path_buf();
    };

    NONCOMMERCIAL_SUFFIXES
        .iter()
        .map(|suffix| path.with_extension(format!("{}{}", extension, suffix)))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Starts Houdini for a project.
///
/// Stateless: planning is pure apart from probing for an existing save
/// file, and [`HoudiniLauncher::launch`] runs exactly the plan it is given.
pub struct HoudiniLauncher {
    settings: HoudiniEnvironment,
}

impl HoudiniLauncher {
    pub fn new(settings: HoudiniEnvironment) -> Self {
        Self { settings }
    }

    /// Build the launch plan.
    ///
    /// # Arguments
    /// * `installation` - Houdini install root (`$HFS`)
    /// * `project` - Project the session opens in
    /// * `options` - Edition and environment toggles
    /// * `baseline` - Environment to inherit, normally [`crate::services::environment::current_env`]
    pub fn plan(
        &self,
        installation: &Utf8Path,
        project: &ProjectLayout,
        options: &LaunchOptions,
        baseline: &EnvMap,
    ) -> LaunchPlan {
        let settings = HoudiniEnvironment {
            cpu_compute: self.settings.cpu_compute || options.cpu,
            dump_core: self.settings.dump_core || options.dump_core,
            ..self.settings.clone()
        };
        let project_env = (!options.no_project_env).then_some(project);
        let overlay = build_overlay(&settings, project_env);
        let env = apply_overlay(baseline, &overlay);

        let program = installation
            .join("bin")
            .join(options.edition.binary_name());

        let mut args = vec!["-foreground".to_string()];
        args.extend(options.edition.launch_args());

        // Reopen the previous session's save automatically
        let save_file = noncommercialize_path(&project.save_file);
        if save_file.exists() {
            args.push(save_file.to_string());
        }

        LaunchPlan {
            program,
            args,
            env,
            overlay,
            working_dir: project.path.clone(),
        }
    }

    /// Log the variables the plan changes relative to `baseline`.
    pub fn log_environment_changes(&self, plan: &LaunchPlan, baseline: &EnvMap) {
        let changes = diff_environments(&plan.env, baseline);
        if changes.is_empty() {
            return;
        }

        tracing::info!("Environment changes:");
        for (key, value) in &changes {
            tracing::info!("  ${}: {}", key, value);
        }
    }

    /// Run Houdini in the foreground and wait for it to exit.
    ///
    /// # Returns
    /// The child's exit code, unchanged. A child killed by a signal reports 1.
    pub async fn launch(&self, plan: &LaunchPlan) -> Result<i32> {
        tracing::info!("Running: {}", plan.command_line());

        let status = Command::new(plan.program.as_std_path())
            .args(&plan.args)
            .env_clear()
            .envs(&plan.env)
            .current_dir(plan.working_dir.as_std_path())
            .status()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ToolError::NotFound(format!("Houdini binary {}", plan.program))
                }
                _ => ToolError::Io(e),
            })?;

        let exit_code = status.code().unwrap_or(1);
        tracing::info!("Houdini exited with code {}", exit_code);

        Ok(exit_code)
    }
}
