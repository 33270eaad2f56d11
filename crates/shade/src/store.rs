//! Non-throwing access to the persisted theme preference.

use std::rc::Rc;

use tracing::warn;

use crate::env::KeyValueStore;

/// Default key under which the preference is stored.
pub const DEFAULT_STORAGE_KEY: &str = "theme-preference";

/// Wraps a [`KeyValueStore`] so that storage failures never reach the caller.
///
/// A failed read is reported as "nothing stored" and a failed write is
/// dropped. Both emit a `warn!` event.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Rc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read the stored value, or `None` if absent or storage failed.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "theme preference storage is not available");
                None
            }
        }
    }

    /// Store `value`, logging and ignoring any failure.
    pub fn set(&self, key: &str, value: &str) {
        if let Err(err) = self.backend.set(key, value) {
            warn!(key, error = %err, "theme preference storage is not available");
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}
