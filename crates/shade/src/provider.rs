//! The theme provider: live state, subscriptions and document updates.
//!
//! The provider is split in two layers:
//!
//! - [`ThemeState`] holds `requested`, `resolved`, `reduce_motion` and
//!   `mounted`, and implements every transition as a plain method with no
//!   side effects.
//! - [`ThemeProvider`] owns a `ThemeState` together with the environment
//!   (storage, system preferences, document). After each transition it writes
//!   the preference through, adjusts subscriptions and re-applies the theme.
//!
//! ```text
//! init ──► mount ──► set_theme / toggle_theme ──► unmount
//!            ▲            system_color_scheme_changed
//!            │            system_reduced_motion_changed
//!            └── first apply, listeners registered
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use shade::{ColorMode, MemoryStorage, MockDocument, ThemeName, ThemeProvider};
//!
//! let storage = Rc::new(MemoryStorage::new());
//! let document = Rc::new(MockDocument::new());
//!
//! let provider = ThemeProvider::builder()
//!     .storage(storage.clone())
//!     .document(document.clone())
//!     .build();
//! provider.mount();
//!
//! provider.set_theme("dark");
//! assert_eq!(provider.resolved_theme(), ColorMode::Dark);
//! assert!(document.has_class("dark"));
//! assert_eq!(storage.value("theme-preference").as_deref(), Some("dark"));
//!
//! provider.toggle_theme();
//! assert_eq!(provider.theme(), ThemeName::Light);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::apply::{apply, ApplyOptions};
use crate::config::ThemeConfig;
use crate::env::{DocumentRoot, KeyValueStore, MemoryStorage, NullDocument};
use crate::name::{ColorMode, ThemeName};
use crate::observer::{Subscription, SystemPreferences};
use crate::resolve::resolve;
use crate::store::PreferenceStore;
use crate::table::{ThemeTable, ThemeVariables};

/// Provider state and its pure transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    /// The theme last chosen, including `system`.
    pub requested: ThemeName,
    /// The mode applied to the document.
    pub resolved: ColorMode,
    pub reduce_motion: bool,
    pub mounted: bool,
}

impl ThemeState {
    /// Initial state.
    ///
    /// The requested theme is, in order: the forced theme, the stored
    /// preference if it is a reserved name or a table key, the configured
    /// default.
    pub fn init(
        config: &ThemeConfig,
        themes: &ThemeTable,
        stored: Option<&str>,
        system: ColorMode,
        reduce_motion: bool,
    ) -> Self {
        let requested = match &config.forced_theme {
            Some(forced) => forced.clone(),
            None => stored
                .map(ThemeName::from)
                .filter(|name| themes.accepts(name))
                .unwrap_or_else(|| config.default_theme.clone()),
        };
        let resolved = resolve(&requested, system);
        Self {
            requested,
            resolved,
            reduce_motion,
            mounted: false,
        }
    }

    /// Returns `true` if the state was not already mounted.
    pub fn mount(&mut self) -> bool {
        !std::mem::replace(&mut self.mounted, true)
    }

    /// Returns `true` if the state was mounted.
    pub fn unmount(&mut self) -> bool {
        std::mem::replace(&mut self.mounted, false)
    }

    /// Records an explicit choice.
    pub fn set_theme(&mut self, theme: ThemeName, system: ColorMode) {
        self.resolved = resolve(&theme, system);
        self.requested = theme;
    }

    /// The theme a toggle switches to: the opposite of the resolved mode.
    pub fn toggle_target(&self) -> ThemeName {
        self.resolved.toggled().into()
    }

    /// Follows a system change when the requested theme is `system`.
    /// Returns `true` if the resolved mode changed.
    pub fn system_color_scheme_changed(&mut self, mode: ColorMode) -> bool {
        if !self.requested.is_system() || self.resolved == mode {
            return false;
        }
        self.resolved = mode;
        true
    }

    /// Returns `true` if the flag changed.
    pub fn system_reduced_motion_changed(&mut self, reduce: bool) -> bool {
        std::mem::replace(&mut self.reduce_motion, reduce) != reduce
    }

    /// Catches up with the current system values, e.g. after a period with
    /// no listeners. Returns `true` if anything changed.
    pub fn refresh(&mut self, system: ColorMode, reduce: bool) -> bool {
        let scheme = self.system_color_scheme_changed(system);
        let motion = self.system_reduced_motion_changed(reduce);
        scheme || motion
    }

    /// Whether a color-scheme listener is needed.
    pub fn watches_system(&self) -> bool {
        self.mounted && self.requested.is_system()
    }

    /// Theme table key whose variables apply: the resolved mode for `system`,
    /// otherwise the requested name.
    pub fn variables_key(&self) -> &str {
        if self.requested.is_system() {
            self.resolved.as_str()
        } else {
            self.requested.as_str()
        }
    }
}

/// What consumers read from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub theme: ThemeName,
    pub resolved_theme: ColorMode,
    pub themes: Rc<ThemeTable>,
}

struct Inner {
    this: Weak<RefCell<Inner>>,
    config: ThemeConfig,
    themes: Rc<ThemeTable>,
    store: PreferenceStore,
    system: SystemPreferences,
    document: Rc<dyn DocumentRoot>,
    state: ThemeState,
    color_scheme_sub: Option<Subscription>,
    reduced_motion_sub: Option<Subscription>,
}

impl Inner {
    fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            enable_transition: self.config.enable_transition,
            sync_with_tailwind: self.config.sync_with_tailwind,
            reduce_motion: self.state.reduce_motion,
        }
    }

    fn apply_if_mounted(&self) {
        if !self.state.mounted {
            return;
        }
        let empty = ThemeVariables::new();
        let variables = self
            .themes
            .get(self.state.variables_key())
            .unwrap_or(&empty);
        apply(
            self.document.as_ref(),
            self.state.resolved,
            variables,
            self.apply_options(),
        );
    }

    /// Registers or releases the color-scheme listener to match the state.
    fn sync_color_scheme_subscription(&mut self) {
        let wanted = self.state.watches_system();
        match (wanted, self.color_scheme_sub.is_some()) {
            (true, false) => {
                let this = self.this.clone();
                self.color_scheme_sub = Some(self.system.on_color_scheme_change(move |mode| {
                    with_inner(&this, |inner| inner.system_color_scheme_changed(mode));
                }));
                debug!("listening for system color scheme changes");
            }
            (false, true) => {
                self.color_scheme_sub = None;
                debug!("stopped listening for system color scheme changes");
            }
            _ => {}
        }
    }

    /// Re-reads the system values and re-applies if they moved. Covers
    /// changes made while unmounted and events dropped during an update.
    fn refresh(&mut self) -> bool {
        let system = self.system.current_color_scheme();
        let reduce = self.system.current_reduced_motion();
        let changed = self.state.refresh(system, reduce);
        if changed {
            debug!(mode = %self.state.resolved, reduce, "system preferences refreshed");
        }
        changed
    }

    fn mount(&mut self) {
        if !self.state.mount() {
            return;
        }
        self.refresh();
        let this = self.this.clone();
        self.reduced_motion_sub = Some(self.system.on_reduced_motion_change(move |reduce| {
            with_inner(&this, |inner| inner.system_reduced_motion_changed(reduce));
        }));
        self.sync_color_scheme_subscription();
        debug!(theme = %self.state.requested, mode = %self.state.resolved, "theme provider mounted");
        self.apply_if_mounted();
        if self.refresh() {
            self.apply_if_mounted();
        }
    }

    fn unmount(&mut self) {
        if !self.state.unmount() {
            return;
        }
        self.color_scheme_sub = None;
        self.reduced_motion_sub = None;
        debug!("theme provider unmounted");
    }

    fn set_theme(&mut self, theme: ThemeName) {
        self.store.set(&self.config.storage_key, theme.as_str());
        let system = self.system.current_color_scheme();
        self.state.set_theme(theme, system);
        debug!(theme = %self.state.requested, mode = %self.state.resolved, "theme set");
        self.sync_color_scheme_subscription();
        self.apply_if_mounted();
        if self.refresh() {
            self.apply_if_mounted();
        }
    }

    fn system_color_scheme_changed(&mut self, mode: ColorMode) {
        if self.state.system_color_scheme_changed(mode) {
            debug!(%mode, "system color scheme changed");
            self.apply_if_mounted();
        }
    }

    fn system_reduced_motion_changed(&mut self, reduce: bool) {
        if self.state.system_reduced_motion_changed(reduce) {
            debug!(reduce, "system reduced motion changed");
            self.apply_if_mounted();
        }
    }
}

fn with_inner(this: &Weak<RefCell<Inner>>, f: impl FnOnce(&mut Inner)) {
    let Some(inner) = this.upgrade() else {
        return;
    };
    match inner.try_borrow_mut() {
        Ok(mut inner) => f(&mut inner),
        Err(_) => warn!("system preference change arrived during a provider update; deferred"),
    };
}

/// Shared handle to a theme provider.
///
/// Clones refer to the same state. Listeners are released on
/// [`unmount`](Self::unmount) or when the last handle is dropped.
#[derive(Clone)]
pub struct ThemeProvider {
    inner: Rc<RefCell<Inner>>,
}

impl ThemeProvider {
    pub fn builder() -> ThemeProviderBuilder {
        ThemeProviderBuilder::new()
    }

    /// Mark the provider mounted: register listeners and apply the theme.
    /// Calling it again while mounted does nothing.
    pub fn mount(&self) {
        self.inner.borrow_mut().mount();
    }

    /// Release every listener. The state is kept; `mount` re-activates it.
    pub fn unmount(&self) {
        self.inner.borrow_mut().unmount();
    }

    /// Choose a theme. The choice is persisted even if storage later fails
    /// to read it back.
    pub fn set_theme(&self, theme: impl Into<ThemeName>) {
        self.inner.borrow_mut().set_theme(theme.into());
    }

    /// Switch to the opposite of the resolved mode as an explicit choice.
    ///
    /// With `system` requested this leaves system mode: the result is an
    /// explicit `light` or `dark`.
    pub fn toggle_theme(&self) {
        let mut inner = self.inner.borrow_mut();
        let target = inner.state.toggle_target();
        inner.set_theme(target);
    }

    /// Feed a color-scheme change from a source the provider does not
    /// observe itself.
    pub fn system_color_scheme_changed(&self, mode: ColorMode) {
        self.inner.borrow_mut().system_color_scheme_changed(mode);
    }

    /// Feed a reduced-motion change from a source the provider does not
    /// observe itself.
    pub fn system_reduced_motion_changed(&self, reduce: bool) {
        self.inner.borrow_mut().system_reduced_motion_changed(reduce);
    }

    /// The requested theme.
    pub fn theme(&self) -> ThemeName {
        self.inner.borrow().state.requested.clone()
    }

    pub fn resolved_theme(&self) -> ColorMode {
        self.inner.borrow().state.resolved
    }

    pub fn reduce_motion(&self) -> bool {
        self.inner.borrow().state.reduce_motion
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().state.mounted
    }

    pub fn themes(&self) -> Rc<ThemeTable> {
        Rc::clone(&self.inner.borrow().themes)
    }

    pub fn config(&self) -> ThemeConfig {
        self.inner.borrow().config.clone()
    }

    /// Copy of the full state.
    pub fn state(&self) -> ThemeState {
        self.inner.borrow().state.clone()
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        let inner = self.inner.borrow();
        ThemeSnapshot {
            theme: inner.state.requested.clone(),
            resolved_theme: inner.state.resolved,
            themes: Rc::clone(&inner.themes),
        }
    }
}

impl std::fmt::Debug for ThemeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ThemeProvider")
            .field("config", &inner.config)
            .field("state", &inner.state)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ThemeProvider`].
///
/// Unset parts default to a non-browser environment: in-memory storage, no
/// media queries (light, motion allowed) and a document that ignores writes.
pub struct ThemeProviderBuilder {
    config: ThemeConfig,
    themes: ThemeTable,
    storage: Rc<dyn KeyValueStore>,
    system: SystemPreferences,
    document: Rc<dyn DocumentRoot>,
}

impl ThemeProviderBuilder {
    pub fn new() -> Self {
        Self {
            config: ThemeConfig::default(),
            themes: ThemeTable::new(),
            storage: Rc::new(MemoryStorage::new()),
            system: SystemPreferences::unavailable(),
            document: Rc::new(NullDocument),
        }
    }

    pub fn config(mut self, config: ThemeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn themes(mut self, themes: ThemeTable) -> Self {
        self.themes = themes;
        self
    }

    pub fn storage(mut self, storage: Rc<dyn KeyValueStore>) -> Self {
        self.storage = storage;
        self
    }

    pub fn system(mut self, system: SystemPreferences) -> Self {
        self.system = system;
        self
    }

    pub fn document(mut self, document: Rc<dyn DocumentRoot>) -> Self {
        self.document = document;
        self
    }

    /// Reads the stored preference and system state, and builds an
    /// unmounted provider.
    pub fn build(self) -> ThemeProvider {
        let store = PreferenceStore::new(self.storage);
        let stored = match self.config.forced_theme {
            Some(_) => None,
            None => store.get(&self.config.storage_key),
        };
        let state = ThemeState::init(
            &self.config,
            &self.themes,
            stored.as_deref(),
            self.system.current_color_scheme(),
            self.system.current_reduced_motion(),
        );
        debug!(theme = %state.requested, mode = %state.resolved, "theme provider initialized");

        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Inner {
                this: this.clone(),
                config: self.config,
                themes: Rc::new(self.themes),
                store,
                system: self.system,
                document: self.document,
                state,
                color_scheme_sub: None,
                reduced_motion_sub: None,
            })
        });
        ThemeProvider { inner }
    }
}

impl Default for ThemeProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
