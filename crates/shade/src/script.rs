//! Inline bootstrap script that applies the theme before the UI loads.
//!
//! The provider can only touch the document once the application is running.
//! Until then the page renders with whatever the stylesheet defaults to, which
//! is the wrong theme for anyone who picked the other mode. The script
//! generated here is meant to be inlined in `<head>` and repeats the minimal
//! part of the provider's work: read the stored preference, fall back to the
//! default (resolving `system` through `matchMedia`), then set the dark class
//! or attribute and `color-scheme` on `<html>`.
//!
//! Everything runs inside `try { } catch (e) {}`; a failing script leaves the
//! page with the stylesheet default, never a script error.
//!
//! ```rust
//! use shade::{generate_script, ScriptOptions};
//!
//! let script = generate_script(&ScriptOptions::default()).unwrap();
//! assert!(script.contains("\"theme-preference\""));
//! ```

use std::fmt;
use std::str::FromStr;

use minijinja::{Environment, Error, ErrorKind, Value};
use once_cell::sync::Lazy;

use crate::config::ThemeConfig;
use crate::error::ScriptError;
use crate::name::ThemeName;
use crate::store::DEFAULT_STORAGE_KEY;

const TEMPLATE: &str = r#"(function () {
  try {
    var root = document.documentElement;
    var theme = null;
    try {
      theme = window.localStorage.getItem({{ storage_key | js_string }});
    } catch (e) {}
    if (!theme) {
      theme = {{ default_theme | js_string }};
    }
    if (theme === "system") {
      theme = window.matchMedia("(prefers-color-scheme: dark)").matches ? "dark" : "light";
    }
    var dark = theme === "dark";
{% if class_strategy %}
    if (dark) {
      root.classList.add({{ dark | js_string }});
    } else {
      root.classList.remove({{ dark | js_string }});
    }
{% else %}
    root.setAttribute({{ attribute | js_string }}, dark ? {{ dark | js_string }} : {{ light | js_string }});
{% endif %}
    root.style.colorScheme = dark ? "dark" : "light";
  } catch (e) {}
})();"#;

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    register_filters(&mut env);
    env
});

/// How the bootstrap script marks the theme on `<html>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeStrategy {
    /// Add the dark token as a class in dark mode, remove it otherwise.
    #[default]
    Class,
    /// Set the named attribute (e.g. `data-theme`) to the light or dark token.
    Attribute(String),
}

impl FromStr for AttributeStrategy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "class" => AttributeStrategy::Class,
            other => AttributeStrategy::Attribute(other.to_string()),
        })
    }
}

impl fmt::Display for AttributeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeStrategy::Class => f.write_str("class"),
            AttributeStrategy::Attribute(name) => f.write_str(name),
        }
    }
}

/// Tokens written for each mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTokens {
    pub light: String,
    pub dark: String,
}

impl Default for ClassTokens {
    fn default() -> Self {
        Self {
            light: "light".to_string(),
            dark: "dark".to_string(),
        }
    }
}

/// Parameters of the bootstrap script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    pub storage_key: String,
    pub attribute: AttributeStrategy,
    pub default_theme: ThemeName,
    pub values: ClassTokens,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            attribute: AttributeStrategy::Class,
            default_theme: ThemeName::System,
            values: ClassTokens::default(),
        }
    }
}

impl ScriptOptions {
    /// Options matching a provider configuration: same storage key and default.
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            default_theme: config.default_theme.clone(),
            ..Self::default()
        }
    }
}

/// Renders the bootstrap script source.
///
/// # Errors
///
/// Only fails if the embedded template cannot render, which indicates a bug
/// rather than bad input; every option value is escaped.
pub fn generate_script(opts: &ScriptOptions) -> Result<String, ScriptError> {
    let template = ENV.template_from_str(TEMPLATE)?;
    let source = template.render(minijinja::context! {
        storage_key => opts.storage_key.as_str(),
        default_theme => opts.default_theme.as_str(),
        class_strategy => opts.attribute == AttributeStrategy::Class,
        attribute => opts.attribute.to_string(),
        light => opts.values.light.as_str(),
        dark => opts.values.dark.as_str(),
    })?;
    Ok(source)
}

/// Renders the script wrapped in a `<script>` element.
pub fn script_tag(opts: &ScriptOptions) -> Result<String, ScriptError> {
    Ok(format!("<script>{}</script>", generate_script(opts)?))
}

/// Registers the filters used by the bootstrap template.
///
/// `js_string` renders a value as a double-quoted JavaScript string literal
/// that is also safe inside an HTML `<script>` element.
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("js_string", |value: String| -> Result<Value, Error> {
        Ok(Value::from_safe_string(js_string_literal(&value)?))
    });
}

fn js_string_literal(value: &str) -> Result<String, Error> {
    let quoted = serde_json::to_string(value).map_err(|e| {
        Error::new(ErrorKind::BadSerialization, "cannot encode string").with_source(e)
    })?;
    Ok(quoted
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}
