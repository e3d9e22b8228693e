//! Configuration loading and resolution
//!
//! Two layers live here:
//! - the per-block `TrackerConfig`, deserialized from the YAML body of a
//!   `tasktracker` fenced block and resolved into concrete `TrackerSettings`;
//! - the optional vault-level `.tasktracker.toml` read by the CLI host.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::progress::{DEFAULT_COLORS, MAX_BANDS};

/// Name of the optional host configuration file at the vault root.
pub const HOST_CONFIG_FILE: &str = ".tasktracker.toml";

/// Named width buckets for the rendered indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeKey {
    #[default]
    Small,
    Medium,
    Large,
}

impl SizeKey {
    /// Parse a bucket name, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SMALL" => Some(SizeKey::Small),
            "MEDIUM" => Some(SizeKey::Medium),
            "LARGE" => Some(SizeKey::Large),
            _ => None,
        }
    }

    /// CSS width of the container for this bucket.
    pub fn width(self) -> &'static str {
        match self {
            SizeKey::Small => "250px",
            SizeKey::Medium => "350px",
            SizeKey::Large => "400px",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeKey::Small => "SMALL",
            SizeKey::Medium => "MEDIUM",
            SizeKey::Large => "LARGE",
        }
    }
}

impl std::fmt::Display for SizeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings as written in a block; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default, alias = "size")]
    pub size_key: Option<String>,

    #[serde(default)]
    pub colors: Option<Vec<String>>,
}

/// Tracker block configuration as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Vault-relative folder holding the tracked note
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub path: String,

    /// Note base name, without the `.md` extension
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub file_name: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub settings: Option<RawSettings>,
}

/// Concrete settings after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSettings {
    pub size_key: SizeKey,
    /// Band colors, lowest completion first
    pub colors: Vec<String>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            size_key: SizeKey::default(),
            colors: default_colors(),
        }
    }
}

/// Read a YAML scalar as text. An empty value (`fileName:`) reads as an
/// empty string so validation reports the missing field; numbers and
/// booleans keep their written form, so `fileName: 2024` names `2024.md`.
fn deserialize_scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a scalar, found {other:?}"
        ))),
    }
}

fn default_colors() -> Vec<String> {
    DEFAULT_COLORS.iter().map(|color| color.to_string()).collect()
}

impl TrackerConfig {
    /// Deserialize a block body. An empty body yields an empty config, which
    /// `validate` then rejects.
    pub fn from_block(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|err| Error::InvalidBlock(err.to_string()))?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|err| Error::InvalidBlock(err.to_string()))
    }

    /// Reject configs missing `path` or `fileName`, in that order.
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::MissingField("path"));
        }
        if self.file_name.trim().is_empty() {
            return Err(Error::MissingField("fileName"));
        }
        Ok(())
    }

    /// Label to show with the indicator, if one was given.
    pub fn display_label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// Resolve a block config into concrete settings. Never fails.
pub fn resolve(raw: &TrackerConfig) -> TrackerSettings {
    let settings = raw.settings.as_ref();

    let size_key = match settings
        .and_then(|s| s.size_key.as_deref())
        .filter(|key| !key.trim().is_empty())
    {
        Some(key) => SizeKey::parse(key).unwrap_or_else(|| {
            warn!(size_key = key, "unknown size key, using {}", SizeKey::default());
            SizeKey::default()
        }),
        None => SizeKey::default(),
    };

    let colors = match settings.and_then(|s| s.colors.as_ref()) {
        Some(colors) => {
            if colors.len() > MAX_BANDS {
                debug!(count = colors.len(), "ignoring colors past the fourth band");
            }
            colors.iter().take(MAX_BANDS).cloned().collect()
        }
        None => default_colors(),
    };

    TrackerSettings { size_key, colors }
}

/// Host configuration read from `.tasktracker.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub block: BlockConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

/// Fenced block recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Info string that marks a tracker block
    #[serde(default = "default_block_tag")]
    pub tag: String,
}

fn default_block_tag() -> String {
    "tasktracker".to_string()
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            tag: default_block_tag(),
        }
    }
}

/// Text rendering of indicators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Width of the text bar in cells
    #[serde(default = "default_bar_cells")]
    pub bar_cells: usize,
}

fn default_bar_cells() -> usize {
    20
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bar_cells: default_bar_cells(),
        }
    }
}

/// Change feed behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Watch subfolders of the vault as well
    #[serde(default = "default_true")]
    pub recursive: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            recursive: default_true(),
        }
    }
}

impl HostConfig {
    /// Load configuration from a `.tasktracker.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HostConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the vault root, or return defaults
    pub fn load_from_vault(vault_root: &Path) -> Self {
        let config_path = vault_root.join(HOST_CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "ignoring invalid host config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let tag = self.block.tag.trim();
        if tag.is_empty() {
            return Err(Error::InvalidConfig("block.tag cannot be empty".to_string()));
        }
        if tag.contains(char::is_whitespace) || tag.contains('`') {
            return Err(Error::InvalidConfig(format!(
                "block.tag '{tag}' must be a single word"
            )));
        }
        if self.render.bar_cells == 0 || self.render.bar_cells > 200 {
            return Err(Error::InvalidConfig(
                "render.bar_cells must be between 1 and 200".to_string(),
            ));
        }
        Ok(())
    }
}
