#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use modalias_core::paths::project_root;
use modalias_core::Config;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "modalias")]
#[command(author, version, about = "Inspect and test bundler path aliases", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory; the project root is found by walking up from it
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Config file to load instead of auto-discovery
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Extra aliases ahead of the config file's (e.g., --alias pages=./src/pages)
    #[arg(long = "alias", global = true, value_delimiter = ',', value_name = "FROM=TO")]
    aliases: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve a module specifier through the alias table
    Resolve {
        /// The specifier as written in an import statement
        specifier: String,

        /// The importing file (defaults to the project root)
        #[arg(long, value_name = "PATH")]
        importer: Option<PathBuf>,
    },

    /// Show the loaded configuration: base, plugins and aliases in priority order
    Config,

    /// Print the public URL of an emitted asset under the configured base
    Url {
        /// Asset path relative to the output directory (e.g., assets/index.js)
        asset: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    let root = project_root(&config.cwd).unwrap_or_else(|| config.cwd.clone());
    debug!(cwd = %config.cwd.display(), root = %root.display(), "project root");

    let config_path = cli.config.map(|p| config.cwd.join(p));
    let load = || {
        commands::load_project(&root, config_path.as_deref(), &cli.aliases, cli.json)
    };

    match cli.command.unwrap_or(Commands::Version) {
        Commands::Version => commands::version::run(),
        Commands::Resolve {
            specifier,
            importer,
        } => {
            let action = commands::resolve::ResolveAction {
                specifier,
                importer: importer.map(|p| {
                    if p.is_absolute() {
                        p
                    } else {
                        config.cwd.join(p)
                    }
                }),
            };
            commands::resolve::run(&load()?, action, cli.json)
        }
        Commands::Config => commands::config::run(&load()?, cli.json),
        Commands::Url { asset } => commands::url::run(&load()?, &asset, cli.json),
    }
}
