//! Provider configuration.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! changes:
//!
//! ```yaml
//! default_theme: system
//! storage_key: theme-preference
//! enable_transition: true
//! sync_with_tailwind: true
//! themes:
//!   dark:
//!     --bg: "#0b0b0b"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::name::ThemeName;
use crate::store::DEFAULT_STORAGE_KEY;
use crate::table::{read_source, Format, ThemeTable};

/// Per-provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Requested theme when nothing valid is stored.
    pub default_theme: ThemeName,
    /// Key of the persisted preference.
    pub storage_key: String,
    /// Animate background and text color changes (unless reduced motion is on).
    pub enable_transition: bool,
    /// Toggle the `dark` class on the root for utility-CSS frameworks.
    pub sync_with_tailwind: bool,
    /// Theme chosen ahead of time (e.g. by a server render). Replaces the
    /// stored preference at initialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_theme: Option<ThemeName>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_theme: ThemeName::System,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            enable_transition: true,
            sync_with_tailwind: true,
            forced_theme: None,
        }
    }
}

impl ThemeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_theme(mut self, theme: impl Into<ThemeName>) -> Self {
        self.default_theme = theme.into();
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_transition(mut self, enabled: bool) -> Self {
        self.enable_transition = enabled;
        self
    }

    pub fn with_tailwind_sync(mut self, enabled: bool) -> Self {
        self.sync_with_tailwind = enabled;
        self
    }

    pub fn with_forced_theme(mut self, theme: impl Into<ThemeName>) -> Self {
        self.forced_theme = Some(theme.into());
        self
    }
}

/// A configuration document: provider settings plus an optional theme table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(flatten)]
    pub config: ThemeConfig,
    #[serde(default)]
    pub themes: ThemeTable,
}

impl ProviderSettings {
    pub fn from_yaml(yaml: &str) -> Result<Self, ThemeError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let content = read_source(path)?;
        match Format::of(path)? {
            Format::Yaml => Self::from_yaml(&content),
            Format::Json => Self::from_json(&content),
        }
    }
}
