use crate::error::{Result, ToolError};
use camino::Utf8Path;
use std::process::Output;
use tokio::process::Command;

/// Thin wrapper over the `rclone` CLI.
///
/// Every call blocks until rclone exits. Any non-zero exit is an
/// [`ToolError::ExternalTool`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct Rclone {
    program: String,
    remote: String,
}

impl Rclone {
    pub fn new(remote: impl Into<String>) -> Self {
        Self::with_program("rclone", remote)
    }

    pub fn with_program(program: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            remote: remote.into(),
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// `remote:album/<album>`
    pub fn album_destination(&self, album: &str) -> String {
        format!("{}:album/{}", self.remote, album)
    }

    /// Fails if rclone is not installed or the remote is not configured.
    pub async fn check_remote(&self) -> Result<()> {
        let root = format!("{}:", self.remote);
        self.run_captured(&["lsf", root.as_str()])
            .await
            .map_err(|e| match e {
                ToolError::ExternalTool { .. } => ToolError::NotFound(format!(
                    "rclone remote {} ({})",
                    self.remote, e
                )),
                other => other,
            })?;
        Ok(())
    }

    pub async fn mkdir(&self, album: &str) -> Result<()> {
        let destination = self.album_destination(album);
        self.run_captured(&["mkdir", destination.as_str()]).await?;
        Ok(())
    }

    /// Copy `directory` into the album, streaming rclone's progress output.
    pub async fn copy(&self, directory: &Utf8Path, album: &str) -> Result<()> {
        let destination = self.album_destination(album);
        tracing::info!("Copying {} to {}", directory, destination);

        let status = self
            .command()
            .args(["copy", directory.as_str(), destination.as_str(), "--progress"])
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(ToolError::external(
                "rclone",
                format!("copy exited with {}", status),
            ));
        }
        Ok(())
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    async fn run_captured(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = self
            .command()
            .args(args)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stdout).into_owned();
            message.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ToolError::external("rclone", message.trim().to_string()));
        }
        Ok(output)
    }

    fn spawn_error(&self, e: std::io::Error) -> ToolError {
        match e.kind() {
            std::io::ErrorKind::NotFound => {
                ToolError::NotFound(format!("{} is not installed", self.program))
            }
            _ => ToolError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_destination() {
        let rclone = Rclone::new("google-photos");
        assert_eq!(
            rclone.album_destination("Desktop Screenshots"),
            "google-photos:album/Desktop Screenshots"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_found() {
        let rclone = Rclone::with_program("/nonexistent/rclone", "google-photos");
        let err = rclone.check_remote().await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_fatal() {
        let rclone = Rclone::with_program("false", "google-photos");
        let err = rclone.mkdir("Desktop Screenshots").await.unwrap_err();
        assert!(matches!(err, ToolError::ExternalTool { .. }));

        let err = rclone.copy(Utf8Path::new("/tmp"), "Desktop Screenshots").await.unwrap_err();
        assert!(matches!(err, ToolError::ExternalTool { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unconfigured_remote_is_not_found() {
        let rclone = Rclone::with_program("false", "google-photos");
        let err = rclone.check_remote().await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_calls() {
        let rclone = Rclone::with_program("true", "google-photos");
        rclone.check_remote().await.unwrap();
        rclone.mkdir("Laptop Screenshots").await.unwrap();
        rclone.copy(Utf8Path::new("/tmp"), "Laptop Screenshots").await.unwrap();
    }
}
