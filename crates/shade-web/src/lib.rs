#![forbid(unsafe_code)]

//! Browser bindings for `shade`.
//!
//! Implements the environment traits on top of the real browser APIs:
//!
//! - [`LocalStorage`]: `window.localStorage`
//! - [`BrowserMediaQuery`]: `window.matchMedia(..)`, including the legacy
//!   `addListener` API for older engines
//! - [`DocumentElement`]: `document.documentElement`
//!
//! [`browser_provider`] wires all three into a mounted
//! [`ThemeProvider`](shade::ThemeProvider). On non-wasm targets the crate
//! compiles to a fallback that builds the provider with the non-browser
//! defaults, so workspace-wide builds stay green.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{
    browser_system_preferences, BrowserMediaQuery, DocumentElement, LocalStorage, WebThemeProvider,
};

use shade::{ThemeConfig, ThemeProvider, ThemeTable};

/// Builds and mounts a provider for the current page.
///
/// Any browser capability that is missing (no `window`, storage disabled,
/// no `matchMedia`) is replaced by its non-browser default; the provider
/// still works, it just cannot persist or observe that part.
#[cfg(target_arch = "wasm32")]
pub fn browser_provider(config: ThemeConfig, themes: ThemeTable) -> ThemeProvider {
    let provider = wasm::builder(config, themes).build();
    provider.mount();
    provider
}

/// Builds and mounts a provider with the non-browser defaults.
#[cfg(not(target_arch = "wasm32"))]
pub fn browser_provider(config: ThemeConfig, themes: ThemeTable) -> ThemeProvider {
    tracing::debug!("not running in a browser; using in-memory theme environment");
    let provider = ThemeProvider::builder()
        .config(config)
        .themes(themes)
        .build();
    provider.mount();
    provider
}
