//! Screenshot timestamp normalization and album sync.
//!
//! Photo services order uploads by the embedded capture time. Screenshots
//! usually have none, so before syncing each image without metadata gets the
//! earlier of its creation and modification times written as
//! `DateTimeOriginal`. Images that carry any metadata at all are left alone,
//! even if the capture-time field itself is missing.

use crate::error::{Result, ToolError};
use crate::models::{ScreenshotConfig, SyncProfile};
use crate::paths::expand_home;
use crate::services::rclone::Rclone;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::BufReader;
use std::time::SystemTime;
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

/// Extensions (lower-case) that are treated as screenshots.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// EXIF `DateTimeOriginal` layout.
pub const EXIF_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// `touch -t` layout.
const TOUCH_TIME_FORMAT: &str = "%Y%m%d%H%M.%S";

/// Reads and writes embedded image metadata.
#[cfg_attr(test, automock)]
pub trait MetadataEditor {
    /// Whether the image carries any embedded metadata block.
    fn has_metadata(&self, path: &Utf8Path) -> Result<bool>;

    fn write_capture_time(&self, path: &Utf8Path, time: DateTime<Local>) -> Result<()>;
}

/// EXIF editor backed by `kamadak-exif` (read) and `little_exif` (write).
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifMetadataEditor;

impl MetadataEditor for ExifMetadataEditor {
    /// `kamadak-exif` covers JPEG APP1 and PNG `eXIf` blocks. PNGs written by
    /// `little_exif` carry their EXIF in a compressed text chunk instead, so
    /// those are read back through `little_exif`.
    fn has_metadata(&self, path: &Utf8Path) -> Result<bool> {
        let mut reader = BufReader::new(File::open(path)?);
        match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) if exif.fields().next().is_some() => return Ok(true),
            Ok(_) | Err(exif::Error::NotFound(_)) => {}
            Err(e) => {
                return Err(ToolError::Metadata {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }

        Ok(text_chunk_exif(path))
    }

    fn write_capture_time(&self, path: &Utf8Path, time: DateTime<Local>) -> Result<()> {
        use little_exif::exif_tag::ExifTag;
        use little_exif::metadata::Metadata;

        let mut metadata = Metadata::new();
        metadata.set_tag(ExifTag::DateTimeOriginal(
            time.format(EXIF_TIME_FORMAT).to_string(),
        ));
        metadata.write_to_file(path.as_std_path())?;
        Ok(())
    }
}

/// Whether `little_exif` finds any tag in the file's text-chunk EXIF.
fn text_chunk_exif(path: &Utf8Path) -> bool {
    match little_exif::metadata::Metadata::new_from_path(path.as_std_path()) {
        Ok(metadata) => (&metadata).into_iter().next().is_some(),
        Err(e) => {
            tracing::debug!("No text-chunk EXIF in {}: {}", path, e);
            false
        }
    }
}

/// Outcome of a [`normalize_directory`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub updated: Vec<Utf8PathBuf>,
    pub untouched: usize,
    pub skipped: usize,
}

/// Earlier of the two filesystem times. Filesystems without a birth time
/// fall back to the modification time.
pub fn earliest_time(created: Option<SystemTime>, modified: SystemTime) -> SystemTime {
    match created {
        Some(created) => created.min(modified),
        None => modified,
    }
}

pub fn earliest_file_time(path: &Utf8Path) -> Result<SystemTime> {
    let metadata = fs::metadata(path)?;
    Ok(earliest_time(metadata.created().ok(), metadata.modified()?))
}

pub fn is_image(path: &Utf8Path) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Give every metadata-less image in `directory` a capture time.
///
/// The scan is not recursive. Non-files and non-images are logged and
/// skipped; a metadata read failure aborts the pass.
pub fn normalize_directory(
    directory: &Utf8Path,
    editor: &dyn MetadataEditor,
) -> Result<NormalizeReport> {
    let mut report = NormalizeReport::default();

    let mut entries = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => entries.push(path),
            Err(path) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", path.display());
                report.skipped += 1;
            }
        }
    }
    entries.sort();

    for screenshot in entries {
        if !screenshot.is_file() {
            tracing::warn!("Skipping non-file: {}", screenshot);
            report.skipped += 1;
            continue;
        }
        if !is_image(&screenshot) {
            tracing::warn!("Skipping non-image: {}", screenshot);
            report.skipped += 1;
            continue;
        }

        let has_metadata = editor.has_metadata(&screenshot).map_err(|e| {
            tracing::warn!("Failed to read {}: {}", screenshot, e);
            e
        })?;
        if has_metadata {
            tracing::debug!("Skipping {}: metadata already present", screenshot);
            report.untouched += 1;
            continue;
        }

        let earliest = DateTime::<Local>::from(earliest_file_time(&screenshot)?);
        tracing::info!("Setting EXIF timestamp to {} for {}", earliest, screenshot);
        editor.write_capture_time(&screenshot, earliest)?;
        report.updated.push(screenshot);
    }

    tracing::info!(
        "Normalized {}: {} updated, {} untouched, {} skipped",
        directory,
        report.updated.len(),
        report.untouched,
        report.skipped
    );
    Ok(report)
}

/// Set a file's timestamps with `touch -t`.
pub async fn stamp_file_time(path: &Utf8Path, time: DateTime<Local>) -> Result<()> {
    let stamp = time.format(TOUCH_TIME_FORMAT).to_string();
    let output = Command::new("touch")
        .args(["-t", stamp.as_str(), path.as_str()])
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound("touch is not installed".to_string()),
            _ => ToolError::Io(e),
        })?;

    if !output.status.success() {
        return Err(ToolError::external(
            "touch",
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(())
}

/// Collect every file matching `source_glob` into a fresh, flat `staging_dir`.
///
/// Each copy is re-stamped with its source's earliest time so the copy does
/// not look newer than the original. Returns the number of staged files.
pub async fn stage_screenshots(source_glob: &str, staging_dir: &Utf8Path) -> Result<usize> {
    let matches = glob::glob(source_glob)
        .map_err(|e| ToolError::Configuration(format!("invalid glob {}: {}", source_glob, e)))?;

    let mut sources = Vec::new();
    for entry in matches {
        let path = entry.map_err(|e| ToolError::Io(e.into()))?;
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => sources.push(path),
            Err(path) => tracing::warn!("Skipping non-UTF-8 path: {}", path.display()),
        }
    }
    tracing::info!("Found {} screenshots to stage", sources.len());

    if staging_dir.exists() {
        fs::remove_dir_all(staging_dir)?;
    }
    fs::create_dir_all(staging_dir)?;

    for source in &sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let staged = staging_dir.join(name);
        fs::copy(source, &staged)?;

        let earliest = DateTime::<Local>::from(earliest_file_time(source)?);
        stamp_file_time(&staged, earliest).await?;
    }

    Ok(sources.len())
}

/// Short, lower-case form of a hostname (`Box.local` -> `box`).
pub fn short_hostname(hostname: &str) -> String {
    hostname
        .to_lowercase()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Normalizes and mirrors one host's screenshots to its photo album.
pub struct ScreenshotSync<'a> {
    config: &'a ScreenshotConfig,
    rclone: Rclone,
    editor: Box<dyn MetadataEditor + 'a>,
}

impl<'a> ScreenshotSync<'a> {
    pub fn new(config: &'a ScreenshotConfig) -> Self {
        Self {
            rclone: Rclone::new(config.rclone_remote.clone()),
            editor: Box::new(ExifMetadataEditor),
            config,
        }
    }

    pub fn with_parts(
        config: &'a ScreenshotConfig,
        rclone: Rclone,
        editor: Box<dyn MetadataEditor + 'a>,
    ) -> Self {
        Self {
            config,
            rclone,
            editor,
        }
    }

    pub fn profile(&self, hostname: &str) -> Result<&'a SyncProfile> {
        let host = short_hostname(hostname);
        self.config
            .profile_for_host(&host)
            .ok_or_else(|| ToolError::UnsupportedPlatform(format!("host {}", host)))
    }

    /// Directory whose contents get uploaded, staging it first if needed.
    pub async fn source_directory(&self, profile: &SyncProfile) -> Result<Utf8PathBuf> {
        let directory = match profile {
            SyncProfile::Directory { directory, .. } => expand_home(directory)?,
            SyncProfile::Steamdeck {
                source_glob,
                staging_dir,
                ..
            } => {
                stage_screenshots(source_glob, staging_dir).await?;
                staging_dir.clone()
            }
        };
        tracing::info!("Using directory: {}", directory);
        Ok(directory)
    }

    pub async fn run(&self, hostname: &str) -> Result<NormalizeReport> {
        let profile = self.profile(hostname)?;
        self.rclone.check_remote().await?;

        tracing::info!("Syncing screenshots from {}", profile.name());
        let directory = self.source_directory(profile).await?;
        let report = normalize_directory(&directory, self.editor.as_ref())?;

        let album = profile.album_name();
        self.rclone.mkdir(&album).await?;
        self.rclone.copy(&directory, &album).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn temp_utf8() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_earliest_time_prefers_older() {
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let t2 = SystemTime::UNIX_EPOCH + Duration::from_secs(500);
        assert_eq!(earliest_time(Some(t1), t2), t1);
        assert_eq!(earliest_time(Some(t2), t1), t1);
        assert_eq!(earliest_time(None, t2), t2);
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Utf8Path::new("a.jpg")));
        assert!(is_image(Utf8Path::new("a.JPEG")));
        assert!(is_image(Utf8Path::new("a.png")));
        assert!(!is_image(Utf8Path::new("a.gif")));
        assert!(!is_image(Utf8Path::new("README")));
    }

    #[test]
    fn test_short_hostname() {
        assert_eq!(short_hostname("EWPratten-Laptop.local"), "ewpratten-laptop");
        assert_eq!(short_hostname("deck"), "deck");
    }

    #[test]
    fn test_writes_earliest_time_when_metadata_missing() {
        let (_temp_dir, dir) = temp_utf8();
        let shot = dir.join("shot.png");
        fs::write(&shot, b"png").unwrap();
        let expected = DateTime::<Local>::from(earliest_file_time(&shot).unwrap());

        let mut editor = MockMetadataEditor::new();
        editor.expect_has_metadata().times(1).returning(|_| Ok(false));
        editor
            .expect_write_capture_time()
            .withf(move |_, time| *time == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = normalize_directory(&dir, &editor).unwrap();
        assert_eq!(report.updated, vec![shot]);
    }

    #[test]
    fn test_existing_metadata_untouched() {
        let (_temp_dir, dir) = temp_utf8();
        fs::write(dir.join("shot.jpg"), b"jpg").unwrap();

        let mut editor = MockMetadataEditor::new();
        editor.expect_has_metadata().returning(|_| Ok(true));
        editor.expect_write_capture_time().never();

        let report = normalize_directory(&dir, &editor).unwrap();
        assert!(report.updated.is_empty());
        assert_eq!(report.untouched, 1);
    }

    #[test]
    fn test_skips_do_not_abort() {
        let (_temp_dir, dir) = temp_utf8();
        fs::create_dir(dir.join("nested.png")).unwrap();
        fs::write(dir.join("notes.txt"), b"text").unwrap();
        fs::write(dir.join("shot.jpeg"), b"jpg").unwrap();

        let mut editor = MockMetadataEditor::new();
        editor.expect_has_metadata().times(1).returning(|_| Ok(false));
        editor.expect_write_capture_time().times(1).returning(|_, _| Ok(()));

        let report = normalize_directory(&dir, &editor).unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.updated, vec![dir.join("shot.jpeg")]);
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let (_temp_dir, dir) = temp_utf8();
        fs::write(dir.join("a.png"), b"png").unwrap();
        fs::write(dir.join("b.png"), b"png").unwrap();

        let mut editor = MockMetadataEditor::new();
        editor.expect_has_metadata().times(1).returning(|path| {
            Err(ToolError::Metadata {
                path: path.to_path_buf(),
                message: "corrupt".to_string(),
            })
        });
        editor.expect_write_capture_time().never();

        let err = normalize_directory(&dir, &editor).unwrap_err();
        assert!(matches!(err, ToolError::Metadata { .. }));
    }

    #[test]
    fn test_unknown_host_rejected() {
        let config = ScreenshotConfig::default();
        let sync = ScreenshotSync::new(&config);

        let err = sync.profile("someone-else.local").unwrap_err();
        assert!(matches!(err, ToolError::UnsupportedPlatform(_)));
        assert_eq!(sync.profile("EWPRATTEN-DESKTOP.lan").unwrap().name(), "Desktop");
    }
}
