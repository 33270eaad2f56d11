//! Error types for theme loading, persistence and script generation.
//!
//! None of these are fatal to a running provider. [`StorageError`] never
//! leaves the preference store (it is logged and swallowed), [`ThemeError`]
//! comes only from the explicit loading APIs, and [`ScriptError`] only from a
//! broken bootstrap template.

use std::io;

/// Failures of the persistent key-value primitive.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled, missing, or refused the operation (quota, privacy mode).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The backing data could not be decoded.
    #[error("storage data is corrupt: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Errors raised while loading theme tables or provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// YAML content did not match the expected shape.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON content did not match the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not one of `yaml`, `yml` or `json`.
    #[error("unsupported theme file format: {0}")]
    UnsupportedFormat(String),
}

/// Error returned when the bootstrap script template fails to render.
#[derive(Debug, thiserror::Error)]
#[error("bootstrap script rendering failed: {0}")]
pub struct ScriptError(#[from] minijinja::Error);
