//! Theme tables: CSS custom properties per theme name.
//!
//! A table maps a theme name to a flat set of custom properties:
//!
//! ```yaml
//! light:
//!   --bg: "#ffffff"
//!   --fg: "#111111"
//! dark:
//!   --bg: "#0b0b0b"
//!   --fg: "#eeeeee"
//! sepia:
//!   --bg: "#f4ecd8"
//!   --fg: "#5b4636"
//! ```
//!
//! Values are passed to the document verbatim; nothing here validates CSS.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::name::ThemeName;

/// Custom property name → CSS value for one theme.
pub type ThemeVariables = BTreeMap<String, String>;

/// Theme name → [`ThemeVariables`]. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeTable {
    themes: BTreeMap<String, ThemeVariables>,
}

impl ThemeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a theme, returning the table for chaining.
    ///
    /// ```rust
    /// use shade::ThemeTable;
    ///
    /// let table = ThemeTable::new()
    ///     .with_theme("light", [("--bg", "#fff")])
    ///     .with_theme("dark", [("--bg", "#000")]);
    /// assert!(table.contains("dark"));
    /// ```
    pub fn with_theme<I, K, V>(mut self, name: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.insert(name, variables);
        self
    }

    /// Adds or replaces a theme.
    pub fn insert<I, K, V>(&mut self, name: impl Into<String>, variables: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let variables = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.themes.insert(name.into(), variables);
    }

    pub fn get(&self, name: &str) -> Option<&ThemeVariables> {
        self.themes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Theme names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThemeVariables)> {
        self.themes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Whether a stored name is worth restoring: a reserved name or a table key.
    pub fn accepts(&self, name: &ThemeName) -> bool {
        name.is_reserved() || self.contains(name.as_str())
    }

    /// Parses a table from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ThemeError> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a table from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let content = read_source(path)?;
        match Format::of(path)? {
            Format::Yaml => Self::from_yaml(&content),
            Format::Json => Self::from_json(&content),
        }
    }
}

impl<N, V> FromIterator<(N, V)> for ThemeTable
where
    N: Into<String>,
    V: Into<ThemeVariables>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            themes: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// Source formats accepted by the file loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Yaml,
    Json,
}

impl Format {
    pub(crate) fn of(path: &Path) -> Result<Self, ThemeError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(ThemeError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, ThemeError> {
    std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
light:
  --bg: "#ffffff"
  --fg: "#111111"
dark:
  --bg: "#0b0b0b"
sepia:
  --bg: "#f4ecd8"
"##;

    #[test]
    fn parses_yaml_table() {
        let table = ThemeTable::from_yaml(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get("light").unwrap().get("--fg").map(String::as_str),
            Some("#111111")
        );
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["dark", "light", "sepia"]);
    }

    #[test]
    fn empty_yaml_is_empty_table() {
        assert!(ThemeTable::from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn parses_json_table() {
        let table = ThemeTable::from_json(r#"{"ocean": {"--bg": "navy"}}"#).unwrap();
        assert!(table.contains("ocean"));
    }

    #[test]
    fn rejects_nested_values() {
        let err = ThemeTable::from_yaml("dark:\n  --bg:\n    nested: 1\n").unwrap_err();
        assert!(matches!(err, ThemeError::Yaml(_)));
    }

    #[test]
    fn accepts_reserved_and_known_names_only() {
        let table = ThemeTable::new().with_theme("sepia", [("--bg", "#f4ecd8")]);
        assert!(table.accepts(&ThemeName::System));
        assert!(table.accepts(&ThemeName::Dark));
        assert!(table.accepts(&ThemeName::from("sepia")));
        assert!(!table.accepts(&ThemeName::from("ocean")));
    }

    #[test]
    fn loads_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("themes.yml");
        std::fs::write(&yaml, SAMPLE).unwrap();
        assert_eq!(ThemeTable::from_file(&yaml).unwrap().len(), 3);

        let toml = dir.path().join("themes.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(
            ThemeTable::from_file(&toml),
            Err(ThemeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ThemeTable::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
