//! Integration tests for the theme provider.
//!
//! Every test runs against mock storage, media queries and document, so the
//! results don't depend on the host's OS settings.

use std::rc::Rc;

use shade::{
    ColorMode, DocumentRoot, KeyValueStore, ListenerKind, MemoryStorage, MockDocument,
    MockMediaQuery, SystemPreferences, ThemeConfig, ThemeName, ThemeProvider, ThemeTable,
    UnavailableStorage, DARK_CLASS, THEME_TRANSITION,
};

struct Env {
    storage: Rc<MemoryStorage>,
    os_dark: Rc<MockMediaQuery>,
    reduce_motion: Rc<MockMediaQuery>,
    document: Rc<MockDocument>,
}

impl Env {
    fn new(os_dark: bool) -> Self {
        Self {
            storage: Rc::new(MemoryStorage::new()),
            os_dark: Rc::new(MockMediaQuery::new(os_dark)),
            reduce_motion: Rc::new(MockMediaQuery::new(false)),
            document: Rc::new(MockDocument::new()),
        }
    }

    fn with_stored(self, value: &str) -> Self {
        self.storage.set("theme-preference", value).unwrap();
        self
    }

    fn provider(&self, config: ThemeConfig) -> ThemeProvider {
        self.provider_with(config, themes())
    }

    fn provider_with(&self, config: ThemeConfig, themes: ThemeTable) -> ThemeProvider {
        ThemeProvider::builder()
            .config(config)
            .themes(themes)
            .storage(self.storage.clone())
            .system(SystemPreferences::new(
                self.os_dark.clone(),
                self.reduce_motion.clone(),
            ))
            .document(self.document.clone())
            .build()
    }
}

fn themes() -> ThemeTable {
    ThemeTable::new()
        .with_theme("light", [("--bg", "#ffffff"), ("--fg", "#111111")])
        .with_theme("dark", [("--bg", "#0b0b0b"), ("--fg", "#eeeeee")])
        .with_theme("sepia", [("--bg", "#f4ecd8")])
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn system_default_follows_dark_os() {
    let env = Env::new(true);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();

    assert_eq!(provider.theme(), ThemeName::System);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
    assert!(env.document.has_class(DARK_CLASS));
    assert_eq!(env.document.style("color-scheme").as_deref(), Some("dark"));
    assert_eq!(env.document.property("--bg").as_deref(), Some("#0b0b0b"));
}

#[test]
fn stored_preference_wins_over_default() {
    let env = Env::new(false).with_stored("dark");
    let provider = env.provider(ThemeConfig::default());

    assert_eq!(provider.theme(), ThemeName::Dark);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);

    // The OS preference has no say once an explicit theme is stored.
    env.os_dark.set_matches(true);
    env.os_dark.set_matches(false);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
}

#[test]
fn unknown_stored_name_falls_back_to_default() {
    let env = Env::new(false).with_stored("ocean");
    let provider = env.provider(ThemeConfig::new().with_default_theme("dark"));
    assert_eq!(provider.theme(), ThemeName::Dark);
}

#[test]
fn stored_custom_name_in_table_is_restored() {
    let env = Env::new(true).with_stored("sepia");
    let provider = env.provider(ThemeConfig::default());
    provider.mount();

    assert_eq!(provider.theme(), ThemeName::from("sepia"));
    assert_eq!(provider.resolved_theme(), ColorMode::Light);
    assert_eq!(env.document.property("--bg").as_deref(), Some("#f4ecd8"));
    assert!(!env.document.has_class(DARK_CLASS));
}

#[test]
fn forced_theme_ignores_storage() {
    let env = Env::new(false).with_stored("light");
    let provider = env.provider(ThemeConfig::new().with_forced_theme("dark"));
    assert_eq!(provider.theme(), ThemeName::Dark);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
}

#[test]
fn nothing_touches_document_before_mount() {
    let env = Env::new(true);
    let provider = env.provider(ThemeConfig::default());
    provider.set_theme("light");

    assert_eq!(env.document.state(), Default::default());
    assert_eq!(env.os_dark.listener_count(), 0);
    assert_eq!(env.reduce_motion.listener_count(), 0);
}

#[test]
fn init_does_not_write_storage() {
    let env = Env::new(true);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    assert_eq!(env.storage.value("theme-preference"), None);
}

// ============================================================================
// Explicit changes
// ============================================================================

#[test]
fn set_theme_persists_and_survives_reload() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::new().with_storage_key("app-theme"));
    provider.mount();
    provider.set_theme("sepia");
    drop(provider);

    assert_eq!(env.storage.value("app-theme").as_deref(), Some("sepia"));

    let reloaded = env.provider(ThemeConfig::new().with_storage_key("app-theme"));
    assert_eq!(reloaded.theme(), ThemeName::from("sepia"));
}

#[test]
fn toggle_from_system_becomes_explicit() {
    let env = Env::new(true);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);

    provider.toggle_theme();
    assert_eq!(provider.theme(), ThemeName::Light);
    assert_eq!(provider.resolved_theme(), ColorMode::Light);
    assert_eq!(env.storage.value("theme-preference").as_deref(), Some("light"));

    provider.toggle_theme();
    assert_eq!(provider.theme(), ThemeName::Dark);
    assert!(env.document.has_class(DARK_CLASS));
}

#[test]
fn toggle_from_custom_theme_goes_dark() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::new().with_default_theme("sepia"));
    provider.toggle_theme();
    assert_eq!(provider.theme(), ThemeName::Dark);
}

#[test]
fn failing_storage_never_reaches_caller() {
    let env = Env::new(false);
    let provider = ThemeProvider::builder()
        .themes(themes())
        .storage(Rc::new(UnavailableStorage::new("SecurityError")))
        .system(SystemPreferences::new(
            env.os_dark.clone(),
            env.reduce_motion.clone(),
        ))
        .document(env.document.clone())
        .build();
    provider.mount();

    provider.set_theme("dark");
    assert_eq!(provider.theme(), ThemeName::Dark);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
    assert!(env.document.has_class(DARK_CLASS));

    provider.toggle_theme();
    assert_eq!(provider.theme(), ThemeName::Light);
}

#[test]
fn custom_theme_without_variables_still_applies_mode() {
    let env = Env::new(false);
    let provider = env.provider_with(ThemeConfig::default(), ThemeTable::new());
    provider.mount();
    provider.set_theme("ocean");

    assert_eq!(provider.resolved_theme(), ColorMode::Light);
    assert!(env.document.state().properties.is_empty());
    assert_eq!(env.document.style("color-scheme").as_deref(), Some("light"));
}

// ============================================================================
// Document options
// ============================================================================

#[test]
fn tailwind_sync_off_never_touches_classes() {
    let env = Env::new(true);
    let provider = env.provider(ThemeConfig::new().with_tailwind_sync(false));
    provider.mount();
    provider.set_theme("light");
    provider.set_theme("dark");
    env.os_dark.set_matches(false);

    assert_eq!(env.document.class_writes(), 0);
    assert_eq!(env.document.style("color-scheme").as_deref(), Some("dark"));
}

#[test]
fn reduced_motion_disables_transition() {
    let env = Env::new(false);
    env.reduce_motion.set_matches(true);
    let provider = env.provider(ThemeConfig::new().with_transition(true));
    provider.mount();

    assert!(provider.reduce_motion());
    assert_eq!(env.document.style("transition").as_deref(), Some("none"));
}

#[test]
fn reduced_motion_change_reapplies_transition() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    assert_eq!(
        env.document.style("transition").as_deref(),
        Some(THEME_TRANSITION)
    );

    env.reduce_motion.set_matches(true);
    assert_eq!(env.document.style("transition").as_deref(), Some("none"));

    // Tracked regardless of the requested theme.
    provider.set_theme("dark");
    env.reduce_motion.set_matches(false);
    assert!(!provider.reduce_motion());
    assert_eq!(
        env.document.style("transition").as_deref(),
        Some(THEME_TRANSITION)
    );
}

// ============================================================================
// Subscriptions
// ============================================================================

#[test]
fn color_scheme_listener_only_while_system() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    assert_eq!(env.os_dark.listener_count(), 1);
    assert_eq!(env.reduce_motion.listener_count(), 1);

    provider.set_theme("dark");
    assert_eq!(env.os_dark.listener_count(), 0);

    provider.set_theme("light");
    assert_eq!(env.os_dark.listener_count(), 0);

    provider.set_theme("system");
    assert_eq!(env.os_dark.listener_count(), 1);

    provider.set_theme("system");
    assert_eq!(env.os_dark.listener_count(), 1);
    assert_eq!(env.reduce_motion.listener_count(), 1);
}

#[test]
fn system_changes_update_resolved_theme() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();

    env.os_dark.set_matches(true);
    assert_eq!(provider.theme(), ThemeName::System);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
    assert!(env.document.has_class(DARK_CLASS));
    assert_eq!(env.document.property("--bg").as_deref(), Some("#0b0b0b"));
    assert_eq!(env.storage.value("theme-preference"), None);
}

#[test]
fn unmount_releases_every_listener() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    provider.mount();
    assert_eq!(env.os_dark.listener_count(), 1);

    provider.unmount();
    assert!(!provider.is_mounted());
    assert_eq!(env.os_dark.listener_count(), 0);
    assert_eq!(env.reduce_motion.listener_count(), 0);

    // No longer applied after unmount.
    let before = env.document.state();
    provider.set_theme("dark");
    assert_eq!(env.document.state(), before);
}

#[test]
fn dropping_provider_releases_listeners() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    let handle = provider.clone();
    drop(provider);
    assert_eq!(env.os_dark.listener_count(), 1);

    drop(handle);
    assert_eq!(env.os_dark.listener_count(), 0);
    assert_eq!(env.reduce_motion.listener_count(), 0);
}

#[test]
fn legacy_media_queries_are_released_through_legacy_api() {
    let env = Env {
        os_dark: Rc::new(MockMediaQuery::legacy(false)),
        reduce_motion: Rc::new(MockMediaQuery::legacy(false)),
        ..Env::new(false)
    };
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    assert_eq!(env.os_dark.listener_count_of(ListenerKind::Legacy), 1);
    assert_eq!(env.os_dark.listener_count_of(ListenerKind::ChangeEvent), 0);

    env.os_dark.set_matches(true);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);

    provider.unmount();
    assert_eq!(env.os_dark.listener_count(), 0);
    assert_eq!(env.reduce_motion.listener_count(), 0);
}

#[test]
fn mount_reads_system_changed_after_build() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    env.os_dark.set_matches(true);
    env.reduce_motion.set_matches(true);

    provider.mount();
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
    assert!(provider.reduce_motion());
    assert!(env.document.has_class(DARK_CLASS));
    assert_eq!(env.document.style("color-scheme").as_deref(), Some("dark"));
    assert_eq!(env.document.style("transition").as_deref(), Some("none"));
}

#[test]
fn remount_catches_up_with_changes_while_unmounted() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    provider.unmount();

    env.os_dark.set_matches(true);
    env.reduce_motion.set_matches(true);
    assert_eq!(provider.resolved_theme(), ColorMode::Light);

    provider.mount();
    assert_eq!(provider.theme(), ThemeName::System);
    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
    assert!(provider.reduce_motion());
    assert_eq!(env.document.style("color-scheme").as_deref(), Some("dark"));
    assert_eq!(env.document.property("--bg").as_deref(), Some("#0b0b0b"));
    assert_eq!(env.document.style("transition").as_deref(), Some("none"));
}

#[test]
fn remount_keeps_explicit_theme() {
    let env = Env::new(false);
    let provider = env.provider(ThemeConfig::default());
    provider.mount();
    provider.set_theme("light");
    provider.unmount();

    env.os_dark.set_matches(true);
    provider.mount();
    assert_eq!(provider.resolved_theme(), ColorMode::Light);
    assert!(!env.document.has_class(DARK_CLASS));
}

#[test]
fn change_during_update_is_not_lost() {
    // Flips the OS preference the first time color-scheme is written after
    // being armed, while the provider is still mid-update.
    struct FlippingDocument {
        inner: MockDocument,
        os_dark: Rc<MockMediaQuery>,
        armed: std::cell::Cell<bool>,
    }

    impl DocumentRoot for FlippingDocument {
        fn set_property(&self, name: &str, value: &str) {
            self.inner.set_property(name, value);
        }
        fn add_class(&self, token: &str) {
            self.inner.add_class(token);
        }
        fn remove_class(&self, token: &str) {
            self.inner.remove_class(token);
        }
        fn set_style(&self, name: &str, value: &str) {
            self.inner.set_style(name, value);
            if name == "color-scheme" && self.armed.replace(false) {
                self.os_dark.set_matches(true);
            }
        }
    }

    let env = Env::new(false);
    let document = Rc::new(FlippingDocument {
        inner: MockDocument::new(),
        os_dark: env.os_dark.clone(),
        armed: std::cell::Cell::new(false),
    });
    let provider = ThemeProvider::builder()
        .themes(themes())
        .system(SystemPreferences::new(
            env.os_dark.clone(),
            env.reduce_motion.clone(),
        ))
        .document(document.clone())
        .build();
    provider.mount();
    assert_eq!(provider.resolved_theme(), ColorMode::Light);

    document.armed.set(true);
    provider.set_theme("system");

    assert_eq!(provider.resolved_theme(), ColorMode::Dark);
    assert!(document.inner.has_class(DARK_CLASS));
    assert_eq!(document.inner.style("color-scheme").as_deref(), Some("dark"));
}

#[test]
fn snapshot_exposes_consumer_view() {
    let env = Env::new(true);
    let provider = env.provider(ThemeConfig::default());
    let snapshot = provider.snapshot();

    assert_eq!(snapshot.theme, ThemeName::System);
    assert_eq!(snapshot.resolved_theme, ColorMode::Dark);
    assert!(snapshot.themes.contains("sepia"));
}

#[test]
fn external_document_root_receives_writes() {
    // A DocumentRoot implemented outside the crate.
    #[derive(Default)]
    struct Log(std::cell::RefCell<Vec<String>>);

    impl DocumentRoot for Log {
        fn set_property(&self, name: &str, value: &str) {
            self.0.borrow_mut().push(format!("prop {name}={value}"));
        }
        fn add_class(&self, token: &str) {
            self.0.borrow_mut().push(format!("+{token}"));
        }
        fn remove_class(&self, token: &str) {
            self.0.borrow_mut().push(format!("-{token}"));
        }
        fn set_style(&self, name: &str, value: &str) {
            self.0.borrow_mut().push(format!("style {name}={value}"));
        }
    }

    let log = Rc::new(Log::default());
    let provider = ThemeProvider::builder()
        .config(ThemeConfig::new().with_default_theme("dark").with_transition(false))
        .document(log.clone())
        .build();
    provider.mount();

    assert_eq!(
        *log.0.borrow(),
        vec![
            "style color-scheme=dark".to_string(),
            "+dark".to_string(),
            "style transition=none".to_string(),
        ]
    );
}
