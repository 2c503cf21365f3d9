use crate::services::environment::HoudiniEnvironment;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level configuration from `ewtools.yaml`.
///
/// Every section falls back to built-in defaults so an empty or missing file
/// is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ToolsConfig {
    pub houdini: HoudiniConfig,
    pub screenshots: ScreenshotConfig,
    pub minecraft: MinecraftConfig,
    pub trello: TrelloConfig,
    pub secrets_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoudiniConfig {
    /// Where bare project names are created. `~` is expanded.
    pub projects_dir: String,

    /// Overrides the platform default install root (`/opt`, `C:/Program Files/Side Effects Software`).
    pub install_base: Option<Utf8PathBuf>,

    pub environment: HoudiniEnvironment,
}

impl Default for HoudiniConfig {
    fn default() -> Self {
        Self {
            projects_dir: "~/Videos/DCC/Houdini/Projects".to_string(),
            install_base: None,
            environment: HoudiniEnvironment::default(),
        }
    }
}

/// How a host gathers the screenshots it syncs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SyncProfile {
    /// Screenshots already live in one flat directory.
    Directory { name: String, directory: String },

    /// Screenshots are scattered across Steam's per-user data tree and must be
    /// staged into a flat directory first.
    Steamdeck {
        name: String,
        #[serde(default = "default_steamdeck_glob")]
        source_glob: String,
        #[serde(default = "default_staging_dir")]
        staging_dir: Utf8PathBuf,
    },
}

impl SyncProfile {
    pub fn name(&self) -> &str {
        match self {
            SyncProfile::Directory { name, .. } | SyncProfile::Steamdeck { name, .. } => name,
        }
    }

    pub fn album_name(&self) -> String {
        format!("{} Screenshots", self.name())
    }
}

fn default_steamdeck_glob() -> String {
    "/home/deck/.local/share/Steam/userdata/**/screenshots/*.jpg".to_string()
}

fn default_staging_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("/tmp/screenshot-bundle")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub rclone_remote: String,

    /// Keyed by short, lower-case hostname.
    pub hosts: IndexMap<String, SyncProfile>,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        let mut hosts = IndexMap::new();
        hosts.insert(
            "ewpratten-desktop".to_string(),
            SyncProfile::Directory {
                name: "Desktop".to_string(),
                directory: "~/Pictures/Screenshots/".to_string(),
            },
        );
        hosts.insert(
            "ewpratten-laptop".to_string(),
            SyncProfile::Directory {
                name: "Laptop".to_string(),
                directory: "~/Pictures/Screenshots/".to_string(),
            },
        );
        hosts.insert(
            "ewpratten-steamdeck".to_string(),
            SyncProfile::Steamdeck {
                name: "Steam Deck".to_string(),
                source_glob: default_steamdeck_glob(),
                staging_dir: default_staging_dir(),
            },
        );

        Self {
            rclone_remote: "google-photos".to_string(),
            hosts,
        }
    }
}

impl ScreenshotConfig {
    pub fn profile_for_host(&self, hostname: &str) -> Option<&SyncProfile> {
        self.hosts.get(hostname)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinecraftConfig {
    /// Shared waypoint store that outlives individual instances. `~` is expanded.
    pub global_waypoint_dir: String,
}

impl Default for MinecraftConfig {
    fn default() -> Self {
        Self {
            global_waypoint_dir: "~/.config/minecraft/XaeroWaypoints".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrelloBoard {
    pub id: String,
    #[serde(default)]
    pub lists: IndexMap<String, String>,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
}

impl TrelloBoard {
    pub fn list_id(&self, name: &str) -> Option<&str> {
        lookup_ignore_case(&self.lists, name)
    }

    pub fn tag_id(&self, name: &str) -> Option<&str> {
        lookup_ignore_case(&self.tags, name)
    }
}

fn lookup_ignore_case<'a>(map: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, id)| id.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrelloConfig {
    pub api_key: String,

    /// Name of the semi-secret holding the API token.
    pub token_secret: String,

    pub boards: IndexMap<String, TrelloBoard>,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        let mut lists = IndexMap::new();
        lists.insert("To Do".to_string(), "6348a3ce5208f505b61d29bf".to_string());

        let mut tags = IndexMap::new();
        tags.insert("GURU".to_string(), "64e03ac77d27032282436d28".to_string());
        tags.insert(
            "Github: Issue".to_string(),
            "64eb5d72fb694cd8f0ba7a8d".to_string(),
        );
        tags.insert(
            "Github: Pull Request".to_string(),
            "652d4b775f5c59a8e6308216".to_string(),
        );

        let mut boards = IndexMap::new();
        boards.insert(
            "personal-tasks".to_string(),
            TrelloBoard {
                id: "tw3Cn3L6".to_string(),
                lists,
                tags,
            },
        );

        Self {
            api_key: String::new(),
            token_secret: "trello_api_token".to_string(),
            boards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hosts() {
        let config = ScreenshotConfig::default();
        assert_eq!(config.rclone_remote, "google-photos");
        assert_eq!(config.hosts.len(), 3);
        assert!(matches!(
            config.profile_for_host("ewpratten-steamdeck"),
            Some(SyncProfile::Steamdeck { .. })
        ));
        assert!(config.profile_for_host("unknown").is_none());
    }

    #[test]
    fn test_album_name() {
        let profile = SyncProfile::Directory {
            name: "Laptop".to_string(),
            directory: "~/Pictures".to_string(),
        };
        assert_eq!(profile.album_name(), "Laptop Screenshots");
    }

    #[test]
    fn test_sync_profile_tagged_yaml() {
        let yaml = "mode: steamdeck\nname: Deck\n";
        let profile: SyncProfile = serde_yaml_ng::from_str(yaml).unwrap();
        match profile {
            SyncProfile::Steamdeck {
                name, staging_dir, ..
            } => {
                assert_eq!(name, "Deck");
                assert_eq!(staging_dir, Utf8PathBuf::from("/tmp/screenshot-bundle"));
            }
            other => panic!("unexpected profile: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let yaml = "mode: ftp\nname: Deck\n";
        assert!(serde_yaml_ng::from_str::<SyncProfile>(yaml).is_err());
    }

    #[test]
    fn test_board_lookup_ignores_case() {
        let config = TrelloConfig::default();
        let board = &config.boards["personal-tasks"];
        assert_eq!(board.list_id("to do"), Some("6348a3ce5208f505b61d29bf"));
        assert_eq!(board.tag_id("github: issue"), Some("64eb5d72fb694cd8f0ba7a8d"));
        assert_eq!(board.list_id("Done"), None);
    }
}
