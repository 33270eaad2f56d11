//! `shade` command line helper.
//!
//! ```text
//! shade script --default dark --tag > head.html
//! shade resolve system --system dark
//! shade themes themes.yaml
//! ```
//!
//! Set `SHADE_LOG=debug` to see what the library does.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use shade::{
    detect_color_scheme, generate_script, resolve, script_tag, AttributeStrategy, ColorMode,
    ProviderSettings, ScriptOptions, ThemeName, ThemeTable,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Light, dark and system themes for web documents
#[derive(Debug, Parser)]
#[command(name = "shade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the inline bootstrap script that applies the stored theme early
    Script(ScriptArgs),
    /// Print the color mode a theme name resolves to
    Resolve {
        /// Requested theme: light, dark, system or a custom name
        theme: ThemeName,
        /// System preference to resolve against (defaults to the OS setting)
        #[arg(long)]
        system: Option<ColorMode>,
    },
    /// List the themes in a YAML or JSON theme table
    Themes {
        file: PathBuf,
        /// Print the table as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct ScriptArgs {
    /// Provider settings file; its storage key and default theme are used
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// localStorage key holding the preference
    #[arg(long)]
    storage_key: Option<String>,
    /// `class`, or the name of an attribute such as `data-theme`
    #[arg(long)]
    attribute: Option<AttributeStrategy>,
    /// Theme used when nothing is stored
    #[arg(long = "default", value_name = "THEME")]
    default_theme: Option<ThemeName>,
    /// Token written in light mode
    #[arg(long)]
    light: Option<String>,
    /// Token written in dark mode
    #[arg(long)]
    dark: Option<String>,
    /// Wrap the output in a <script> element
    #[arg(long)]
    tag: bool,
}

impl ScriptArgs {
    fn options(&self) -> Result<ScriptOptions> {
        let mut opts = match &self.config {
            Some(path) => {
                let settings = ProviderSettings::from_file(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                ScriptOptions::from_config(&settings.config)
            }
            None => ScriptOptions::default(),
        };
        if let Some(key) = &self.storage_key {
            opts.storage_key = key.clone();
        }
        if let Some(attribute) = &self.attribute {
            opts.attribute = attribute.clone();
        }
        if let Some(theme) = &self.default_theme {
            opts.default_theme = theme.clone();
        }
        if let Some(light) = &self.light {
            opts.values.light = light.clone();
        }
        if let Some(dark) = &self.dark {
            opts.values.dark = dark.clone();
        }
        Ok(opts)
    }
}

#[derive(Serialize)]
struct ThemeSummary<'a> {
    name: &'a str,
    variables: usize,
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Script(args) => {
            let opts = args.options()?;
            debug!(?opts, "generating bootstrap script");
            let source = if args.tag {
                script_tag(&opts)?
            } else {
                generate_script(&opts)?
            };
            writeln!(out, "{source}")?;
        }
        Command::Resolve { theme, system } => {
            let system = system.unwrap_or_else(detect_color_scheme);
            writeln!(out, "{}", resolve(&theme, system))?;
        }
        Command::Themes { file, json } => {
            let table = ThemeTable::from_file(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            if json {
                let summary: Vec<ThemeSummary> = table
                    .iter()
                    .map(|(name, variables)| ThemeSummary {
                        name,
                        variables: variables.len(),
                    })
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &summary)?;
                writeln!(out)?;
            } else {
                for (name, variables) in table.iter() {
                    writeln!(out, "{name}\t{} variables", variables.len())?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("SHADE_LOG"))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}
