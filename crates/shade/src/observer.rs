//! System preference observation: color scheme and reduced motion.
//!
//! [`SystemPreferences`] pairs two media conditions:
//!
//! ```text
//! color scheme    (prefers-color-scheme: dark)
//! reduced motion  (prefers-reduced-motion: reduce)
//! ```
//!
//! Each can be read directly or subscribed to. A subscription is a
//! [`Subscription`] guard: the listener stays registered until the guard is
//! dropped or [`Subscription::unsubscribe`] is called, and is released through
//! the same registration API that added it.

use std::rc::Rc;

use tracing::trace;

use crate::env::{ListenerId, ListenerKind, MediaQuery, StaticMediaQuery};
use crate::name::ColorMode;

/// Media query text for the dark color scheme condition.
pub const COLOR_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

/// Media query text for the reduced motion condition.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// A registered media listener, released exactly once.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    query: Rc<dyn MediaQuery>,
    id: ListenerId,
    kind: ListenerKind,
    active: bool,
}

impl Subscription {
    /// Which registration API this subscription used.
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Unregister now instead of on drop.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        match self.kind {
            ListenerKind::ChangeEvent => self.query.remove_change_listener(self.id),
            ListenerKind::Legacy => self.query.remove_legacy_listener(self.id),
        }
        trace!(id = self.id.0, kind = ?self.kind, "media listener released");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("active", &self.active)
            .finish()
    }
}

/// Reads and watches the OS-level color scheme and reduced-motion settings.
#[derive(Clone)]
pub struct SystemPreferences {
    color_scheme: Rc<dyn MediaQuery>,
    reduced_motion: Rc<dyn MediaQuery>,
}

impl SystemPreferences {
    pub fn new(color_scheme: Rc<dyn MediaQuery>, reduced_motion: Rc<dyn MediaQuery>) -> Self {
        Self {
            color_scheme,
            reduced_motion,
        }
    }

    /// Preferences for an environment without media queries: light, motion allowed.
    pub fn unavailable() -> Self {
        Self::new(
            Rc::new(StaticMediaQuery::new(false)),
            Rc::new(StaticMediaQuery::new(false)),
        )
    }

    pub fn current_color_scheme(&self) -> ColorMode {
        ColorMode::from_dark_match(self.color_scheme.matches())
    }

    pub fn current_reduced_motion(&self) -> bool {
        self.reduced_motion.matches()
    }

    /// Call `callback` with the new mode whenever the color scheme changes.
    pub fn on_color_scheme_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ColorMode) + 'static,
    {
        subscribe(&self.color_scheme, move |matches| {
            callback(ColorMode::from_dark_match(matches))
        })
    }

    /// Call `callback` whenever the reduced-motion setting changes.
    pub fn on_reduced_motion_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        subscribe(&self.reduced_motion, callback)
    }
}

impl Default for SystemPreferences {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl std::fmt::Debug for SystemPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemPreferences")
            .field("color_scheme", &self.current_color_scheme())
            .field("reduced_motion", &self.current_reduced_motion())
            .finish()
    }
}

fn subscribe<F>(query: &Rc<dyn MediaQuery>, callback: F) -> Subscription
where
    F: Fn(bool) + 'static,
{
    let (id, kind) = if query.supports_change_events() {
        (
            query.add_change_listener(Box::new(callback)),
            ListenerKind::ChangeEvent,
        )
    } else {
        (
            query.add_legacy_listener(Box::new(callback)),
            ListenerKind::Legacy,
        )
    };
    trace!(id = id.0, ?kind, "media listener registered");
    Subscription {
        query: Rc::clone(query),
        id,
        kind,
        active: true,
    }
}
