//! Application configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::parse_hex_color;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `NNN.gif` sprite assets.
    pub assets_dir: PathBuf,
    /// JSON dataset of catalog entities.
    pub catalog_path: PathBuf,
    /// Valid selection identifiers.
    pub ids: IdRange,
    /// Shared selection storage.
    pub storage: StorageConfig,
    /// Sprite display box.
    pub display: DisplayConfig,
    /// Widget timeline parameters.
    pub widget: WidgetConfig,
    /// Overrides for type colors, `"#RRGGBB"` keyed by type name.
    pub type_colors: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets/sprites"),
            catalog_path: PathBuf::from("assets/catalog.json"),
            ids: IdRange::default(),
            storage: StorageConfig::default(),
            display: DisplayConfig::default(),
            widget: WidgetConfig::default(),
            type_colors: BTreeMap::new(),
        }
    }
}

/// Inclusive range of selectable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub min: u32,
    pub max: u32,
}

impl Default for IdRange {
    fn default() -> Self {
        Self { min: 1, max: 251 }
    }
}

impl IdRange {
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        (self.min..=self.max).contains(&id)
    }
}

/// Where and under which namespace the selection is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory shared by the app and the widget.
    pub dir: PathBuf,
    /// Shared namespace; the store file is `<dir>/<namespace>.json`.
    pub namespace: String,
    /// Identifier reported before anything has been stored.
    pub default_id: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("shared"),
            namespace: "group.com.vindennt.pocketpal".to_string(),
            default_id: 25,
        }
    }
}

/// Sprite display box and scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub box_width: f32,
    pub box_height: f32,
    /// Pixels per display point.
    pub scale: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            box_width: 300.0,
            box_height: 300.0,
            scale: 1.0,
        }
    }
}

/// Most entries a widget timeline may hold.
pub const MAX_TIMELINE_ENTRIES: usize = 1000;

/// Widest spacing between timeline entries (30 days).
pub const MAX_TIMELINE_INTERVAL_SECS: u64 = 30 * 24 * 3600;

/// Widget timeline generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Widget kind used when requesting reloads.
    pub kind: String,
    /// Entries per generated timeline.
    pub entries: usize,
    /// Spacing between entries in seconds.
    pub interval_secs: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            kind: "pocketpalwidget".to_string(),
            entries: 5,
            interval_secs: 3600,
        }
    }
}

impl WidgetConfig {
    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ids.min == 0 || self.ids.min > self.ids.max {
            return Err(ConfigError::InvalidIdRange {
                min: self.ids.min,
                max: self.ids.max,
            });
        }
        if !self.ids.contains(self.storage.default_id) {
            return Err(ConfigError::DefaultIdOutOfRange(self.storage.default_id));
        }
        if self.storage.namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if !(self.display.scale > 0.0) {
            return Err(ConfigError::InvalidScale);
        }
        if !(self.display.box_width > 0.0 && self.display.box_height > 0.0) {
            return Err(ConfigError::InvalidDisplayBox);
        }
        if !(1..=MAX_TIMELINE_ENTRIES).contains(&self.widget.entries)
            || !(1..=MAX_TIMELINE_INTERVAL_SECS).contains(&self.widget.interval_secs)
        {
            return Err(ConfigError::InvalidTimeline);
        }
        for (name, color) in &self.type_colors {
            if parse_hex_color(color).is_none() {
                return Err(ConfigError::InvalidColor {
                    name: name.clone(),
                    value: color.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Id range {min}..={max} is invalid")]
    InvalidIdRange { min: u32, max: u32 },
    #[error("Default id {0} is outside the id range")]
    DefaultIdOutOfRange(u32),
    #[error("Storage namespace must not be empty")]
    EmptyNamespace,
    #[error("Display scale must be positive")]
    InvalidScale,
    #[error("Display box must have positive width and height")]
    InvalidDisplayBox,
    #[error(
        "Widget timeline needs 1..={} entries and an interval of 1..={} seconds",
        MAX_TIMELINE_ENTRIES,
        MAX_TIMELINE_INTERVAL_SECS
    )]
    InvalidTimeline,
    #[error("Type color for {name} is not #RRGGBB: {value}")]
    InvalidColor { name: String, value: String },
}
