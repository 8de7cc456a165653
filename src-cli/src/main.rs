//! eqws - command line front end for the equation workspace
//!
//! Loads a workspace snapshot (`{"containers": [...], "tokens": [...]}`),
//! runs the equation engine on it and prints the outcome.

mod commands;

use anyhow::{bail, Context, Result};
use canvas_model::{PaletteCategory, UnitCategory, UnitTable};
use clap::{Parser, Subcommand, ValueEnum};
use equation_engine::{Engine, EngineSettings, SettingsManager};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eqws", version, about = "Solve and rewrite equation workspace snapshots")]
#[command(propagate_version = true)]
struct Cli {
    /// Engine settings file (JSON); defaults are used when absent
    #[arg(long, env = "EQWS_SETTINGS", value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the equations in a snapshot
    Solve {
        snapshot: PathBuf,
    },
    /// Apply an operation container to the nearest equation
    Apply {
        snapshot: PathBuf,
        /// Id of the operation container
        #[arg(long)]
        op: String,
        /// Write the rewritten workspace back to the snapshot
        #[arg(long)]
        write: bool,
    },
    /// Simplify one container
    Simplify {
        snapshot: PathBuf,
        /// Id of the container to simplify
        #[arg(long)]
        container: String,
        /// Repeat until no rule applies
        #[arg(long)]
        all: bool,
        /// Write the simplified workspace back to the snapshot
        #[arg(long)]
        write: bool,
    },
    /// List palette symbols and templates
    Palette {
        #[arg(value_enum)]
        category: Option<PaletteArg>,
    },
    /// Write the default settings to the settings file
    InitSettings,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaletteArg {
    Math,
    Length,
    Mass,
    Volume,
    Temperature,
    Time,
    Conversions,
    Equations,
}

impl From<PaletteArg> for PaletteCategory {
    fn from(arg: PaletteArg) -> Self {
        match arg {
            PaletteArg::Math => PaletteCategory::Math,
            PaletteArg::Length => PaletteCategory::Units(UnitCategory::Length),
            PaletteArg::Mass => PaletteCategory::Units(UnitCategory::Mass),
            PaletteArg::Volume => PaletteCategory::Units(UnitCategory::Volume),
            PaletteArg::Temperature => PaletteCategory::Units(UnitCategory::Temperature),
            PaletteArg::Time => PaletteCategory::Units(UnitCategory::Time),
            PaletteArg::Conversions => PaletteCategory::Conversions,
            PaletteArg::Equations => PaletteCategory::Equations,
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<EngineSettings> {
    match path {
        Some(path) => {
            let mut manager = SettingsManager::new(path);
            Ok(manager.load()?.clone())
        }
        None => Ok(EngineSettings::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rewrite(json: bool, dto: &commands::RewriteDto) -> Result<()> {
    if json {
        return print_json(dto);
    }
    for message in &dto.messages {
        println!("{}", message);
    }
    println!("{}", dto.expression);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.settings.as_ref())?;
    let engine = Engine::new(UnitTable::builtin(), &settings);

    match cli.command {
        Commands::Solve { snapshot } => {
            let workspace = commands::load_workspace(&snapshot)?;
            let outcome = commands::solve(&engine, &workspace);
            if cli.json {
                print_json(&outcome)?;
            } else {
                if !outcome.equation_text.is_empty() {
                    println!("Equation: {}", outcome.equation_text);
                }
                match (&outcome.result_text, &outcome.error_text) {
                    (Some(result), _) => println!("Result: {}", result),
                    (None, Some(error)) => println!("Error: {}", error),
                    (None, None) => {}
                }
            }
        }
        Commands::Apply { snapshot, op, write } => {
            let mut workspace = commands::load_workspace(&snapshot)?;
            let operation = commands::parse_container_id(&op)?;
            let dto = commands::apply(&engine, &mut workspace, operation)?;
            print_rewrite(cli.json, &dto)?;
            if write {
                commands::save_workspace(&snapshot, &workspace)?;
            }
        }
        Commands::Simplify {
            snapshot,
            container,
            all,
            write,
        } => {
            let mut workspace = commands::load_workspace(&snapshot)?;
            let container = commands::parse_container_id(&container)?;
            let dto = commands::simplify(&engine, &mut workspace, container, all)?;
            print_rewrite(cli.json, &dto)?;
            if write {
                commands::save_workspace(&snapshot, &workspace)?;
            }
        }
        Commands::Palette { category } => {
            let entries = commands::palette(category.map(PaletteCategory::from));
            if cli.json {
                print_json(&entries)?;
            } else {
                for entry in entries {
                    println!("{:<12} {:<12} {}", entry.category, entry.kind, entry.text);
                }
            }
        }
        Commands::InitSettings => {
            let Some(path) = cli.settings else {
                bail!("--settings <PATH> is required to write settings");
            };
            let mut manager = SettingsManager::new(&path);
            manager
                .reset()
                .with_context(|| format!("Failed to write settings to {}", path.display()))?;
            println!("Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    run(Cli::parse())
}
