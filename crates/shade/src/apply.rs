//! Writing a resolved theme onto the document root.

use tracing::trace;

use crate::env::DocumentRoot;
use crate::name::ColorMode;
use crate::table::ThemeVariables;

/// Class toggled on the root for utility-CSS dark variants.
pub const DARK_CLASS: &str = "dark";

/// Transition set on the root when animated theme changes are allowed.
pub const THEME_TRANSITION: &str = "background-color 0.3s ease, color 0.3s ease";

/// Flags controlling the non-variable side effects of [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOptions {
    pub enable_transition: bool,
    pub sync_with_tailwind: bool,
    pub reduce_motion: bool,
}

impl ApplyOptions {
    fn transition(&self) -> &'static str {
        if self.enable_transition && !self.reduce_motion {
            THEME_TRANSITION
        } else {
            "none"
        }
    }
}

/// Applies `resolved` and `variables` to the document root.
///
/// Custom properties from a previously applied theme that are missing from
/// `variables` are left in place. Applying the same inputs twice leaves the
/// document unchanged.
pub fn apply(
    doc: &dyn DocumentRoot,
    resolved: ColorMode,
    variables: &ThemeVariables,
    opts: ApplyOptions,
) {
    for (name, value) in variables {
        doc.set_property(name, value);
    }

    doc.set_style("color-scheme", resolved.as_str());

    if opts.sync_with_tailwind {
        match resolved {
            ColorMode::Dark => doc.add_class(DARK_CLASS),
            ColorMode::Light => doc.remove_class(DARK_CLASS),
        }
    }

    doc.set_style("transition", opts.transition());

    trace!(
        mode = %resolved,
        variables = variables.len(),
        transition = opts.transition(),
        "theme applied"
    );
}
