//! Mapping a requested theme to the mode applied on the document.

use crate::name::{ColorMode, ThemeName};

/// Resolves a requested theme against the current system preference.
///
/// - `system` follows `system_preference`
/// - `dark` is dark
/// - `light` and every custom name are light
///
/// Custom themes carry no base-mode metadata, so they are classified as
/// light unless the name is literally `dark`.
pub fn resolve(requested: &ThemeName, system_preference: ColorMode) -> ColorMode {
    match requested {
        ThemeName::System => system_preference,
        ThemeName::Dark => ColorMode::Dark,
        ThemeName::Light | ThemeName::Custom(_) => ColorMode::Light,
    }
}
