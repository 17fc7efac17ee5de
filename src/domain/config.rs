use std::path::Path;

use serde::{Deserialize, Serialize};

/// The homepage credited in the header of generated module files.
pub const DEFAULT_HOMEPAGE: &str = "https://github.com/bwplotka/bingo";

/// Configuration for reading and writing module files.
///
/// This struct holds settings that control how module files are generated
/// and how the managed require entry is picked out of an existing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The URL written into the header of newly created module files.
    ///
    /// The header reads `module _ // Auto generated by <homepage>. DO NOT EDIT`.
    pub homepage: String,

    /// How the managed require entry is selected when a file is opened.
    pub selection: Selection,
}

/// Built-in rules for picking the managed require out of a module file.
///
/// Require entries marked `// indirect` are never managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selection {
    /// Exactly one require entry may be unmarked; that entry is managed.
    ///
    /// More than one unmarked entry makes the file ambiguous and is rejected.
    #[default]
    Strict,

    /// The first unmarked require entry is managed; any later unmarked
    /// entries are passed through untouched.
    First,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            homepage: default_homepage(),
            selection: Selection::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The header line written at the top of newly created module files.
    #[must_use]
    pub fn header(&self) -> String {
        format!("module _ // Auto generated by {}. DO NOT EDIT", self.homepage)
    }
}

fn default_homepage() -> String {
    DEFAULT_HOMEPAGE.to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_homepage")]
        homepage: String,

        #[serde(default)]
        selection: Selection,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                homepage,
                selection,
            } => Self {
                homepage,
                selection,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            homepage: config.homepage,
            selection: config.selection,
        }
    }
}
