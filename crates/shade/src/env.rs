//! Environment abstractions for testability.
//!
//! The provider never touches a browser API directly. It talks to three
//! primitives, each a trait here:
//!
//! - [`KeyValueStore`]: get/set a string by key (`localStorage`)
//! - [`MediaQuery`]: a boolean media condition with change notifications
//!   (`matchMedia`)
//! - [`DocumentRoot`]: style and class mutation on the root element
//!   (`document.documentElement`)
//!
//! Browser implementations live in `shade-web`. This module carries the
//! in-memory and mock implementations used for server rendering, native
//! applications and tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::error::StorageError;

/// A persistent string key-value primitive.
///
/// Both operations are fallible. Callers normally go through
/// [`PreferenceStore`](crate::PreferenceStore), which turns failures into
/// warnings.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Callback invoked with the new `matches` value of a media condition.
pub type MediaListener = Box<dyn Fn(bool)>;

/// Handle identifying one registered media listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A boolean media condition such as `(prefers-color-scheme: dark)`.
///
/// Two registration APIs exist: the modern change-event one and the legacy
/// `addListener` one. [`supports_change_events`](Self::supports_change_events)
/// tells the observer which to use; a listener must be removed through the
/// same API it was added with.
pub trait MediaQuery {
    /// Current value of the condition.
    fn matches(&self) -> bool;

    /// Whether the modern change-event registration is available.
    fn supports_change_events(&self) -> bool;

    fn add_change_listener(&self, listener: MediaListener) -> ListenerId;

    fn remove_change_listener(&self, id: ListenerId);

    fn add_legacy_listener(&self, listener: MediaListener) -> ListenerId;

    fn remove_legacy_listener(&self, id: ListenerId);
}

/// Mutation capability for the document root element.
///
/// Operations are infallible from the caller's side; implementations that can
/// fail swallow the failure.
pub trait DocumentRoot {
    /// Set a CSS custom property (`--name`) on the root.
    fn set_property(&self, name: &str, value: &str);

    /// Add a class token to the root.
    fn add_class(&self, token: &str);

    /// Remove a class token from the root.
    fn remove_class(&self, token: &str);

    /// Set an inline style property (`color-scheme`, `transition`).
    fn set_style(&self, name: &str, value: &str);
}

// === Storage implementations ===

/// In-process storage backed by a map.
///
/// Useful for server rendering and tests. Values live as long as the
/// instance; share it through an `Rc` to simulate a reload.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with one value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.values.borrow_mut().insert(key.into(), value.into());
        storage
    }

    /// Direct read without going through the trait, for assertions.
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage that fails every operation.
///
/// Stands in for disabled storage, an exceeded quota or a non-browser
/// context.
#[derive(Debug, Clone)]
pub struct UnavailableStorage {
    reason: String,
}

impl UnavailableStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnavailableStorage {
    fn default() -> Self {
        Self::new("no storage in this environment")
    }
}

impl KeyValueStore for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::unavailable(self.reason.clone()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::unavailable(self.reason.clone()))
    }
}

// === Media query implementations ===

/// A media condition with a fixed value that never changes.
///
/// Used where no live preference source exists, e.g. reduced motion on a
/// native host. Listeners are accepted and never called.
#[derive(Debug, Default)]
pub struct StaticMediaQuery {
    matches: bool,
    next_id: Cell<u64>,
}

impl StaticMediaQuery {
    pub fn new(matches: bool) -> Self {
        Self {
            matches,
            next_id: Cell::new(0),
        }
    }

    fn next(&self) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ListenerId(id)
    }
}

impl MediaQuery for StaticMediaQuery {
    fn matches(&self) -> bool {
        self.matches
    }

    fn supports_change_events(&self) -> bool {
        true
    }

    fn add_change_listener(&self, _listener: MediaListener) -> ListenerId {
        self.next()
    }

    fn remove_change_listener(&self, _id: ListenerId) {}

    fn add_legacy_listener(&self, _listener: MediaListener) -> ListenerId {
        self.next()
    }

    fn remove_legacy_listener(&self, _id: ListenerId) {}
}

/// Which registration API a listener went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    /// `addEventListener("change", ..)`
    ChangeEvent,
    /// `addListener(..)`
    Legacy,
}

/// Mock media condition for testing.
///
/// [`set_matches`](Self::set_matches) updates the value and notifies every
/// registered listener, like a browser firing `change`.
pub struct MockMediaQuery {
    matches: Cell<bool>,
    modern: bool,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, ListenerKind, Rc<dyn Fn(bool)>)>>,
}

impl MockMediaQuery {
    /// Create a mock supporting change events.
    pub fn new(matches: bool) -> Self {
        Self {
            matches: Cell::new(matches),
            modern: true,
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Create a mock that only offers the legacy listener API.
    pub fn legacy(matches: bool) -> Self {
        Self {
            modern: false,
            ..Self::new(matches)
        }
    }

    /// Change the value and notify listeners if it actually changed.
    pub fn set_matches(&self, matches: bool) {
        if self.matches.replace(matches) == matches {
            return;
        }
        // Listeners may add or remove listeners while running.
        let listeners: Vec<Rc<dyn Fn(bool)>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(matches);
        }
    }

    /// Number of registered listeners, across both APIs.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of listeners registered through the given API.
    pub fn listener_count_of(&self, kind: ListenerKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    fn add(&self, kind: ListenerKind, listener: MediaListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .push((id, kind, Rc::from(listener)));
        id
    }

    fn remove(&self, kind: ListenerKind, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(i, k, _)| !(*i == id && *k == kind));
    }
}

impl std::fmt::Debug for MockMediaQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMediaQuery")
            .field("matches", &self.matches.get())
            .field("modern", &self.modern)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl MediaQuery for MockMediaQuery {
    fn matches(&self) -> bool {
        self.matches.get()
    }

    fn supports_change_events(&self) -> bool {
        self.modern
    }

    fn add_change_listener(&self, listener: MediaListener) -> ListenerId {
        assert!(self.modern, "change events are not supported by this mock");
        self.add(ListenerKind::ChangeEvent, listener)
    }

    fn remove_change_listener(&self, id: ListenerId) {
        self.remove(ListenerKind::ChangeEvent, id);
    }

    fn add_legacy_listener(&self, listener: MediaListener) -> ListenerId {
        self.add(ListenerKind::Legacy, listener)
    }

    fn remove_legacy_listener(&self, id: ListenerId) {
        self.remove(ListenerKind::Legacy, id);
    }
}

// === Document implementations ===

/// Document root used where no document exists; every mutation is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDocument;

impl DocumentRoot for NullDocument {
    fn set_property(&self, _name: &str, _value: &str) {}
    fn add_class(&self, _token: &str) {}
    fn remove_class(&self, _token: &str) {}
    fn set_style(&self, _name: &str, _value: &str) {}
}

/// Observable state of a [`MockDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    /// Custom properties set on the root.
    pub properties: BTreeMap<String, String>,
    /// Class tokens on the root.
    pub classes: BTreeSet<String>,
    /// Inline style properties other than custom properties.
    pub styles: BTreeMap<String, String>,
}

/// Mock document root recording every mutation.
#[derive(Debug, Default)]
pub struct MockDocument {
    state: RefCell<DocumentState>,
    class_writes: Cell<usize>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current root state.
    pub fn state(&self) -> DocumentState {
        self.state.borrow().clone()
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.state.borrow().properties.get(name).cloned()
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.state.borrow().styles.get(name).cloned()
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.state.borrow().classes.contains(token)
    }

    /// How many add/remove class calls were made, including no-op ones.
    pub fn class_writes(&self) -> usize {
        self.class_writes.get()
    }
}

impl DocumentRoot for MockDocument {
    fn set_property(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .properties
            .insert(name.to_string(), value.to_string());
    }

    fn add_class(&self, token: &str) {
        self.class_writes.set(self.class_writes.get() + 1);
        self.state.borrow_mut().classes.insert(token.to_string());
    }

    fn remove_class(&self, token: &str) {
        self.class_writes.set(self.class_writes.get() + 1);
        self.state.borrow_mut().classes.remove(token);
    }

    fn set_style(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .styles
            .insert(name.to_string(), value.to_string());
    }
}
