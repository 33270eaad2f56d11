//! Theme names and the binary color mode.
//!
//! A [`ThemeName`] is what the user asks for; a [`ColorMode`] is what ends up
//! on the document. The two are kept as separate types so a resolved mode can
//! never be `system` or a custom name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The binary visual mode applied to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light mode (light background, dark text).
    #[default]
    Light,
    /// Dark mode (dark background, light text).
    Dark,
}

impl ColorMode {
    /// Returns `"light"` or `"dark"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }

    /// Returns the opposite mode.
    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }

    /// Maps a `prefers-color-scheme: dark` match result to a mode.
    pub fn from_dark_match(matches: bool) -> Self {
        if matches {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`ColorMode`] from anything but `light`/`dark`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected `light` or `dark`, got `{0}`")]
pub struct ParseColorModeError(String);

impl FromStr for ColorMode {
    type Err = ParseColorModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ColorMode::Light),
            "dark" => Ok(ColorMode::Dark),
            other => Err(ParseColorModeError(other.to_string())),
        }
    }
}

impl From<ColorMode> for ThemeName {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => ThemeName::Light,
            ColorMode::Dark => ThemeName::Dark,
        }
    }
}

/// A requested theme: one of the reserved names or a custom table key.
///
/// Parsing never fails. The literal strings `light`, `dark` and `system` map
/// to the reserved variants; everything else becomes [`ThemeName::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThemeName {
    Light,
    Dark,
    /// Follow the operating system preference.
    #[default]
    System,
    /// A name expected to match a key of the theme table.
    Custom(String),
}

impl ThemeName {
    /// The name as it is persisted and looked up in the theme table.
    pub fn as_str(&self) -> &str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
            ThemeName::System => "system",
            ThemeName::Custom(name) => name,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, ThemeName::System)
    }

    /// True for `light`, `dark` and `system`.
    pub fn is_reserved(&self) -> bool {
        !matches!(self, ThemeName::Custom(_))
    }
}

impl From<&str> for ThemeName {
    fn from(s: &str) -> Self {
        match s {
            "light" => ThemeName::Light,
            "dark" => ThemeName::Dark,
            "system" => ThemeName::System,
            other => ThemeName::Custom(other.to_string()),
        }
    }
}

impl From<String> for ThemeName {
    fn from(s: String) -> Self {
        match s.as_str() {
            "light" | "dark" | "system" => ThemeName::from(s.as_str()),
            _ => ThemeName::Custom(s),
        }
    }
}

impl From<ThemeName> for String {
    fn from(name: ThemeName) -> Self {
        match name {
            ThemeName::Custom(name) => name,
            reserved => reserved.as_str().to_string(),
        }
    }
}

impl FromStr for ThemeName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ThemeName::from(s))
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for ThemeName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ThemeName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
