use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Houdini product tier.
///
/// Each edition maps to a launcher binary under `$HFS/bin` and a set of
/// command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Core,
    Fx,
    Indie,
    #[default]
    Apprentice,
}

impl Edition {
    pub const ALL: [Edition; 4] = [
        Edition::Core,
        Edition::Fx,
        Edition::Indie,
        Edition::Apprentice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::Core => "core",
            Edition::Fx => "fx",
            Edition::Indie => "indie",
            Edition::Apprentice => "apprentice",
        }
    }

    /// Binary filename: `houdinicore` and `houdinifx` are dedicated, everything
    /// else runs the plain `houdini` launcher.
    pub fn binary_name(&self) -> String {
        match self {
            Edition::Core | Edition::Fx => format!("houdini{}", self.as_str()),
            Edition::Indie | Edition::Apprentice => "houdini".to_string(),
        }
    }

    pub fn launch_args(&self) -> Vec<String> {
        match self {
            Edition::Indie | Edition::Apprentice => vec![format!("-{}", self.as_str())],
            Edition::Core | Edition::Fx => Vec::new(),
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
