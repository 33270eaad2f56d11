//! # Shade - light, dark and system themes for documents
//!
//! `shade` decides which color mode a page should show and writes it onto the
//! document root: CSS custom properties, a `dark` class for utility-CSS
//! frameworks, native `color-scheme`, and an optional color transition. It
//! persists the user's choice, follows the operating system while the choice
//! is `system`, and produces an inline script that applies the stored theme
//! before the application starts.
//!
//! ## Core Concepts
//!
//! - [`ThemeName`]: what the user asks for (`light`, `dark`, `system`, or a custom name)
//! - [`ColorMode`]: what the document shows (`light` or `dark`)
//! - [`resolve`]: maps a [`ThemeName`] and the system mode to a [`ColorMode`]
//! - [`apply`]: writes a [`ColorMode`] and its [`ThemeVariables`] onto a [`DocumentRoot`]
//! - [`ThemeProvider`]: owns the live state and keeps storage, listeners and document in sync
//! - [`generate_script`]: the pre-hydration bootstrap script
//!
//! ## Environment
//!
//! The provider never reaches for globals. Storage, media queries and the
//! document are injected through the [`KeyValueStore`], [`MediaQuery`] and
//! [`DocumentRoot`] traits. Browser implementations live in `shade-web`;
//! this crate ships in-memory, native and mock implementations.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use shade::{
//!     ColorMode, MemoryStorage, MockDocument, MockMediaQuery, SystemPreferences,
//!     ThemeConfig, ThemeName, ThemeProvider, ThemeTable,
//! };
//!
//! let themes = ThemeTable::new()
//!     .with_theme("light", [("--bg", "#ffffff")])
//!     .with_theme("dark", [("--bg", "#0b0b0b")]);
//!
//! let os_dark = Rc::new(MockMediaQuery::new(true));
//! let reduce_motion = Rc::new(MockMediaQuery::new(false));
//! let document = Rc::new(MockDocument::new());
//!
//! let provider = ThemeProvider::builder()
//!     .config(ThemeConfig::default())
//!     .themes(themes)
//!     .storage(Rc::new(MemoryStorage::new()))
//!     .system(SystemPreferences::new(os_dark.clone(), reduce_motion))
//!     .document(document.clone())
//!     .build();
//! provider.mount();
//!
//! assert_eq!(provider.theme(), ThemeName::System);
//! assert_eq!(provider.resolved_theme(), ColorMode::Dark);
//! assert_eq!(document.property("--bg").as_deref(), Some("#0b0b0b"));
//!
//! // The OS switches to light; the provider follows.
//! os_dark.set_matches(false);
//! assert_eq!(provider.resolved_theme(), ColorMode::Light);
//! assert!(!document.has_class("dark"));
//! ```

mod apply;
mod config;
pub mod env;
mod error;
mod name;
mod native;
mod observer;
mod provider;
mod resolve;
mod script;
mod store;
mod table;

pub use apply::{apply, ApplyOptions, DARK_CLASS, THEME_TRANSITION};
pub use config::{ProviderSettings, ThemeConfig};
pub use error::{ScriptError, StorageError, ThemeError};
pub use name::{ColorMode, ParseColorModeError, ThemeName};
pub use native::{detect_color_scheme, set_color_scheme_detector, FileStorage, OsColorScheme};
pub use observer::{Subscription, SystemPreferences, COLOR_SCHEME_QUERY, REDUCED_MOTION_QUERY};
pub use provider::{ThemeProvider, ThemeProviderBuilder, ThemeSnapshot, ThemeState};
pub use resolve::resolve;
pub use script::{
    generate_script, register_filters, script_tag, AttributeStrategy, ClassTokens, ScriptOptions,
};
pub use store::{PreferenceStore, DEFAULT_STORAGE_KEY};
pub use table::{ThemeTable, ThemeVariables};

// Environment primitives and their in-memory implementations.
pub use env::{
    DocumentRoot, DocumentState, KeyValueStore, ListenerId, ListenerKind, MediaListener,
    MediaQuery, MemoryStorage, MockDocument, MockMediaQuery, NullDocument, StaticMediaQuery,
    UnavailableStorage,
};
