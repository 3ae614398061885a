//! Reflex command line tool
//!
//! Introspects a class registry populated with the demo module:
//! list and describe classes, create objects and call methods by name.

mod commands;
mod demo;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reflex_core::{ClassRegistry, RegistryOptions};
use tracing_subscriber::EnvFilter;

use crate::output::{ColorMode, StyledOutput};

#[derive(Parser)]
#[command(name = "reflex")]
#[command(about = "Runtime type information explorer", long_about = None)]
#[command(version)]
struct Cli {
    /// Registry configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// When to color the output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered classes
    Classes {
        /// Only classes derived from this base
        #[arg(short, long, default_value = "")]
        base: String,
        /// Walk the whole subtree instead of direct children
        #[arg(short, long)]
        recursive: bool,
        /// Report the base class itself
        #[arg(long)]
        include_base: bool,
        /// Only classes with a default constructor
        #[arg(long)]
        concrete: bool,
    },

    /// Show the members of a class
    Describe {
        /// Full class name
        class: String,
    },

    /// Create an object and print its attribute values
    Create {
        /// Full class name
        class: String,
        /// Constructor parameters (e.g. 'Param0="4"')
        #[arg(short, long)]
        params: Option<String>,
        /// Attribute values to apply (e.g. 'Speed="3.5"')
        #[arg(long)]
        values: Option<String>,
        /// Print the object as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call a method on a default constructed object
    Call {
        /// Full class name
        class: String,
        /// Method name
        method: String,
        /// Parameter string (e.g. 'Param0="2" Param1="3"')
        #[arg(default_value = "")]
        params: String,
    },

    /// List registered modules
    Modules {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("REFLEX_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(path: Option<&PathBuf>) -> anyhow::Result<RegistryOptions> {
    match path {
        Some(path) => RegistryOptions::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(RegistryOptions::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = ClassRegistry::with_options(load_options(cli.config.as_ref())?);
    registry
        .load_module(&demo::DemoModule)
        .context("failed to load the demo module")?;

    let mut out = StyledOutput::new(cli.color.choice());

    match cli.command {
        Commands::Classes {
            base,
            recursive,
            include_base,
            concrete,
        } => {
            let filter = commands::classes::ClassFilter {
                base,
                recursive,
                include_base,
                concrete,
            };
            commands::classes::execute(&registry, &filter, &mut out)
        }
        Commands::Describe { class } => commands::describe::execute(&registry, &class, &mut out),
        Commands::Create {
            class,
            params,
            values,
            json,
        } => {
            let options = commands::create::CreateOptions {
                params,
                values,
                json,
            };
            commands::create::execute(&registry, &class, &options, &mut out)
        }
        Commands::Call {
            class,
            method,
            params,
        } => commands::call::execute(&registry, &class, &method, &params, &mut out),
        Commands::Modules { json } => commands::modules::execute(&registry, json, &mut out),
    }
}
