//! `web-sys` implementations of the environment traits.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Reflect;
use shade::{
    DocumentRoot, KeyValueStore, ListenerId, MediaListener, MediaQuery, StaticMediaQuery,
    StorageError, SystemPreferences, ThemeConfig, ThemeName, ThemeProvider, ThemeProviderBuilder,
    ThemeTable, COLOR_SCHEME_QUERY, REDUCED_MOTION_QUERY,
};
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MediaQueryList, Storage};

fn js_error(err: JsValue) -> StorageError {
    StorageError::unavailable(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

// === localStorage ===

/// `window.localStorage`, looked up on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::unavailable("no window"))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::unavailable("localStorage is disabled"))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }
}

// === matchMedia ===

type JsListener = Closure<dyn Fn(JsValue)>;

/// A `MediaQueryList` from `window.matchMedia`.
///
/// Registered callbacks are kept alive here until removed; dropping the
/// query drops every closure still registered.
pub struct BrowserMediaQuery {
    list: MediaQueryList,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<u64, JsListener>>,
}

impl BrowserMediaQuery {
    /// Returns `None` without a window or when `matchMedia` is missing.
    pub fn new(query: &str) -> Option<Self> {
        let list = web_sys::window()?.match_media(query).ok().flatten()?;
        Some(Self {
            list,
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        })
    }

    fn wrap(listener: MediaListener) -> JsListener {
        // Modern engines pass a MediaQueryListEvent, legacy ones the list
        // itself; both expose `matches`.
        Closure::wrap(Box::new(move |event: JsValue| {
            let matches = Reflect::get(&event, &JsValue::from_str("matches"))
                .ok()
                .and_then(|value| value.as_bool())
                .unwrap_or(false);
            listener(matches);
        }) as Box<dyn Fn(JsValue)>)
    }

    fn store(&self, closure: JsListener) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, closure);
        ListenerId(id)
    }

    fn take(&self, id: ListenerId) -> Option<JsListener> {
        self.listeners.borrow_mut().remove(&id.0)
    }
}

impl std::fmt::Debug for BrowserMediaQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserMediaQuery")
            .field("media", &self.list.media())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl MediaQuery for BrowserMediaQuery {
    fn matches(&self) -> bool {
        self.list.matches()
    }

    fn supports_change_events(&self) -> bool {
        Reflect::has(&self.list, &JsValue::from_str("addEventListener")).unwrap_or(false)
    }

    fn add_change_listener(&self, listener: MediaListener) -> ListenerId {
        let closure = Self::wrap(listener);
        if let Err(err) = self
            .list
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            debug!(error = ?err, "addEventListener failed on media query");
        }
        self.store(closure)
    }

    fn remove_change_listener(&self, id: ListenerId) {
        let Some(closure) = self.take(id) else {
            return;
        };
        if let Err(err) = self
            .list
            .remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            debug!(error = ?err, "removeEventListener failed on media query");
        }
    }

    #[allow(deprecated)]
    fn add_legacy_listener(&self, listener: MediaListener) -> ListenerId {
        let closure = Self::wrap(listener);
        if let Err(err) = self
            .list
            .add_listener_with_opt_callback(Some(closure.as_ref().unchecked_ref()))
        {
            debug!(error = ?err, "addListener failed on media query");
        }
        self.store(closure)
    }

    #[allow(deprecated)]
    fn remove_legacy_listener(&self, id: ListenerId) {
        let Some(closure) = self.take(id) else {
            return;
        };
        if let Err(err) = self
            .list
            .remove_listener_with_opt_callback(Some(closure.as_ref().unchecked_ref()))
        {
            debug!(error = ?err, "removeListener failed on media query");
        }
    }
}

/// System preferences read from `matchMedia`, with a fixed `false` for any
/// query the browser cannot evaluate.
pub fn browser_system_preferences() -> SystemPreferences {
    fn query(text: &str) -> Rc<dyn MediaQuery> {
        match BrowserMediaQuery::new(text) {
            Some(query) => Rc::new(query),
            None => {
                debug!(query = text, "matchMedia unavailable");
                Rc::new(StaticMediaQuery::new(false))
            }
        }
    }
    SystemPreferences::new(query(COLOR_SCHEME_QUERY), query(REDUCED_MOTION_QUERY))
}

// === documentElement ===

/// The page's `<html>` element.
#[derive(Debug, Clone)]
pub struct DocumentElement {
    element: HtmlElement,
}

impl DocumentElement {
    /// Returns `None` outside a document or when the root is not an HTML element.
    pub fn new() -> Option<Self> {
        let element = web_sys::window()?
            .document()?
            .document_element()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some(Self { element })
    }
}

impl DocumentRoot for DocumentElement {
    fn set_property(&self, name: &str, value: &str) {
        if let Err(err) = self.element.style().set_property(name, value) {
            debug!(name, error = ?err, "failed to set custom property");
        }
    }

    fn add_class(&self, token: &str) {
        if let Err(err) = self.element.class_list().add_1(token) {
            debug!(token, error = ?err, "failed to add class");
        }
    }

    fn remove_class(&self, token: &str) {
        if let Err(err) = self.element.class_list().remove_1(token) {
            debug!(token, error = ?err, "failed to remove class");
        }
    }

    fn set_style(&self, name: &str, value: &str) {
        if let Err(err) = self.element.style().set_property(name, value) {
            debug!(name, error = ?err, "failed to set style");
        }
    }
}

/// A provider builder populated with every browser capability available.
pub(crate) fn builder(config: ThemeConfig, themes: ThemeTable) -> ThemeProviderBuilder {
    let mut builder = ThemeProvider::builder()
        .config(config)
        .themes(themes)
        .storage(Rc::new(LocalStorage::new()))
        .system(browser_system_preferences());
    match DocumentElement::new() {
        Some(root) => builder = builder.document(Rc::new(root)),
        None => debug!("no document element; theme changes will not be rendered"),
    }
    builder
}

// === JavaScript surface ===

/// Theme provider exported to JavaScript.
///
/// ```js
/// const themes = new WebThemeProvider({ defaultTheme: "system" });
/// themes.toggleTheme();
/// console.log(themes.theme, themes.resolvedTheme);
/// ```
#[wasm_bindgen]
pub struct WebThemeProvider {
    inner: ThemeProvider,
}

#[wasm_bindgen]
impl WebThemeProvider {
    /// `options` may carry `defaultTheme`, `storageKey`, `enableTransition`,
    /// `syncWithTailwind`, `forcedTheme` and `themes` (name to variables map).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<js_sys::Object>) -> WebThemeProvider {
        let (config, themes) = options
            .map(|options| read_options(&options))
            .unwrap_or_default();
        WebThemeProvider {
            inner: crate::browser_provider(config, themes),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn theme(&self) -> String {
        self.inner.theme().to_string()
    }

    #[wasm_bindgen(getter, js_name = resolvedTheme)]
    pub fn resolved_theme(&self) -> String {
        self.inner.resolved_theme().to_string()
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme: &str) {
        self.inner.set_theme(theme);
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) {
        self.inner.toggle_theme();
    }

    /// Releases the media listeners. The provider keeps its state.
    pub fn unmount(&self) {
        self.inner.unmount();
    }
}

fn read_options(options: &js_sys::Object) -> (ThemeConfig, ThemeTable) {
    let get = |name: &str| Reflect::get(options, &JsValue::from_str(name)).ok();
    let string = |name: &str| get(name).and_then(|value| value.as_string());
    let flag = |name: &str| get(name).and_then(|value| value.as_bool());

    let mut config = ThemeConfig::default();
    if let Some(theme) = string("defaultTheme") {
        config.default_theme = ThemeName::from(theme);
    }
    if let Some(key) = string("storageKey") {
        config.storage_key = key;
    }
    if let Some(enabled) = flag("enableTransition") {
        config.enable_transition = enabled;
    }
    if let Some(enabled) = flag("syncWithTailwind") {
        config.sync_with_tailwind = enabled;
    }
    config.forced_theme = string("forcedTheme").map(ThemeName::from);

    let mut themes = ThemeTable::new();
    if let Some(table) = get("themes").and_then(|value| value.dyn_into::<js_sys::Object>().ok()) {
        for entry in js_sys::Object::entries(&table).iter() {
            let pair = js_sys::Array::from(&entry);
            let Some(name) = pair.get(0).as_string() else {
                continue;
            };
            let Ok(vars) = pair.get(1).dyn_into::<js_sys::Object>() else {
                continue;
            };
            let variables: Vec<(String, String)> = js_sys::Object::entries(&vars)
                .iter()
                .filter_map(|var| {
                    let var = js_sys::Array::from(&var);
                    Some((var.get(0).as_string()?, var.get(1).as_string()?))
                })
                .collect();
            themes.insert(name, variables);
        }
    }
    (config, themes)
}
