//! Native (non-browser) preference sources.
//!
//! [`OsColorScheme`] asks the operating system for its light/dark setting
//! through `dark-light`. The detector behind it can be overridden for tests
//! with [`set_color_scheme_detector`]:
//!
//! ```rust
//! use shade::{detect_color_scheme, set_color_scheme_detector, ColorMode};
//!
//! set_color_scheme_detector(|| ColorMode::Dark);
//! assert_eq!(detect_color_scheme(), ColorMode::Dark);
//! # set_color_scheme_detector(|| ColorMode::Light);
//! ```
//!
//! [`FileStorage`] persists preferences as a small JSON object on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dark_light::Mode as OsThemeMode;
use once_cell::sync::Lazy;

use crate::env::{KeyValueStore, ListenerId, MediaListener, MediaQuery};
use crate::error::StorageError;
use crate::name::ColorMode;

type ColorSchemeDetector = fn() -> ColorMode;

static DETECTOR: Lazy<Mutex<ColorSchemeDetector>> = Lazy::new(|| Mutex::new(os_detector));

/// Overrides the function used to read the OS color scheme.
pub fn set_color_scheme_detector(detector: ColorSchemeDetector) {
    let mut guard = DETECTOR.lock().unwrap_or_else(|e| e.into_inner());
    *guard = detector;
}

/// Reads the OS color scheme through the current detector.
///
/// Returns [`ColorMode::Light`] when the OS reports no preference or the
/// query fails.
pub fn detect_color_scheme() -> ColorMode {
    let detector = *DETECTOR.lock().unwrap_or_else(|e| e.into_inner());
    detector()
}

fn os_detector() -> ColorMode {
    match dark_light::detect() {
        Ok(OsThemeMode::Dark) => ColorMode::Dark,
        Ok(OsThemeMode::Light) | Ok(OsThemeMode::Unspecified) => ColorMode::Light,
        Err(err) => {
            tracing::debug!(error = %err, "OS color scheme query failed, assuming light");
            ColorMode::Light
        }
    }
}

/// The OS dark-mode setting as a [`MediaQuery`].
///
/// The value is read on every [`matches`](MediaQuery::matches) call. There is
/// no change notification on native hosts, so listeners are accepted and never
/// fire; call [`ThemeProvider::system_color_scheme_changed`] yourself if the
/// host has its own signal.
///
/// [`ThemeProvider::system_color_scheme_changed`]: crate::ThemeProvider::system_color_scheme_changed
#[derive(Debug, Default, Clone, Copy)]
pub struct OsColorScheme;

impl MediaQuery for OsColorScheme {
    fn matches(&self) -> bool {
        detect_color_scheme() == ColorMode::Dark
    }

    fn supports_change_events(&self) -> bool {
        false
    }

    fn add_change_listener(&self, _listener: MediaListener) -> ListenerId {
        ListenerId(0)
    }

    fn remove_change_listener(&self, _id: ListenerId) {}

    fn add_legacy_listener(&self, _listener: MediaListener) -> ListenerId {
        ListenerId(0)
    }

    fn remove_legacy_listener(&self, _id: ListenerId) {}
}

/// Key-value storage persisted as a JSON object in a single file.
///
/// The file is read on every `get` and rewritten on every `set`. A missing
/// file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&values)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn detector_override_is_used() {
        set_color_scheme_detector(|| ColorMode::Dark);
        assert_eq!(detect_color_scheme(), ColorMode::Dark);
        assert!(OsColorScheme.matches());

        set_color_scheme_detector(|| ColorMode::Light);
        assert_eq!(detect_color_scheme(), ColorMode::Light);
        assert!(!OsColorScheme.matches());
    }

    #[test]
    fn os_color_scheme_uses_legacy_path() {
        assert!(!OsColorScheme.supports_change_events());
    }

    #[test]
    fn file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("prefs.json"));
        assert_eq!(storage.get("theme-preference").unwrap(), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        FileStorage::new(&path).set("theme-preference", "dark").unwrap();
        FileStorage::new(&path).set("other", "x").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get("theme-preference").unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn file_storage_reports_corrupt_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStorage::new(&path).get("k").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
