//! Optik CLI: inspect configuration, resolve units and render axis labels.
//!
//! This is the main entry point for the `optik` tool.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib_conf::{parse_unit_expr, Domain};
use lib_types::Notation;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "optik")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Settings file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LabelAxis {
    X,
    Y,
    Z,
    Generic,
}

impl LabelAxis {
    fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Generic => "generic",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show,

    /// Render an axis label for a domain
    Label {
        /// Domain: pupil, interferogram, convolvable, mtf, ptf or psd
        #[arg(short, long)]
        domain: Domain,

        /// Axis to label
        #[arg(short, long, default_value = "x")]
        axis: LabelAxis,

        /// In-plane unit expression (defaults to the domain's unit)
        #[arg(long)]
        xy_unit: Option<String>,

        /// Out-of-plane unit expression (defaults to the domain's unit)
        #[arg(long)]
        z_unit: Option<String>,

        /// Unit notation: generic, unicode, latex or latex_inline
        #[arg(short, long)]
        notation: Option<Notation>,

        /// Leave unit text out of x/y/z labels
        #[arg(long)]
        hide_units: bool,
    },

    /// Resolve a unit name or expression
    Resolve {
        /// Unit name or expression, e.g. `waves` or `nm / s`
        token: String,

        /// Reference wavelength: a source name or microns
        #[arg(short, long)]
        wavelength: Option<String>,

        /// Print only this notation
        #[arg(short, long)]
        notation: Option<Notation>,
    },

    /// Validate a settings file
    Check {
        /// Path to the settings file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if let Commands::Check { file } = &cli.command {
        return check_settings(file, cli.format);
    }

    lib_conf::install(config::effective_config(cli.settings.as_deref())?);

    match cli.command {
        Commands::Show => show_config(cli.format)?,
        Commands::Label { domain, axis, xy_unit, z_unit, notation, hide_units } => {
            render_label(
                domain,
                axis,
                xy_unit.as_deref(),
                z_unit.as_deref(),
                notation,
                hide_units,
                cli.format,
            )?;
        }
        Commands::Resolve { token, wavelength, notation } => {
            resolve_token(&token, wavelength.as_deref(), notation, cli.format)?;
        }
        Commands::Check { .. } => {}
    }

    Ok(())
}

fn show_config(format: OutputFormat) -> Result<()> {
    let config = lib_conf::shared();
    output::write_config(&mut std::io::stdout().lock(), &config, format)
}

fn render_label(
    domain: Domain,
    axis: LabelAxis,
    xy_unit: Option<&str>,
    z_unit: Option<&str>,
    notation: Option<Notation>,
    hide_units: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut config = lib_conf::shared_mut();
    if let Some(notation) = notation {
        config.unit_format = notation;
    }
    if hide_units {
        config.show_units = false;
    }

    let defaults = config.units(domain);
    let xy = match xy_unit {
        Some(expr) => parse_unit_expr(expr, &config.wavelength)
            .with_context(|| format!("Bad --xy-unit: {}", expr))?,
        None => defaults.xy,
    };
    let z = match z_unit {
        Some(expr) => parse_unit_expr(expr, &config.wavelength)
            .with_context(|| format!("Bad --z-unit: {}", expr))?,
        None => defaults.z,
    };

    let labels = config.labels(domain);
    let label = match axis {
        LabelAxis::X => labels.x(&config, &xy, &z)?,
        LabelAxis::Y => labels.y(&config, &xy, &z)?,
        LabelAxis::Z => labels.z(&config, &xy, &z)?,
        LabelAxis::Generic => labels.generic(&config, &xy, &z)?,
    };

    output::write_label(&mut std::io::stdout().lock(), domain, axis.as_str(), &label, format)
}

fn resolve_token(
    token: &str,
    wavelength: Option<&str>,
    notation: Option<Notation>,
    format: OutputFormat,
) -> Result<()> {
    let wavelength = match wavelength {
        Some(arg) => config::parse_wavelength(arg)?,
        None => lib_conf::shared().wavelength.clone(),
    };

    tracing::info!("Resolving unit {:?}", token);
    let unit = parse_unit_expr(token, &wavelength)
        .with_context(|| format!("Could not resolve unit: {}", token))?;

    output::write_unit(&mut std::io::stdout().lock(), token, &unit, notation, format)
}

fn check_settings(file: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Checking settings file: {:?}", file);

    let (settings, _) = config::load_config(file)?;
    output::write_check(&mut std::io::stdout().lock(), file, &settings, format)
}
