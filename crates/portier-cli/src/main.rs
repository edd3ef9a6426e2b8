mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, timers::TimersSubcommand, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "portier",
    about = "Remote door unlock: open the street door now and the floor door a little later",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "PORTIER_CONFIG",
        default_value = portier_core::config::DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server until interrupted
    Serve {
        /// Address to listen on (overrides `listen` in the config)
        #[arg(long)]
        listen: Option<String>,

        /// Keep pending timers in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Create or validate the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Inspect or cancel pending delayed unlocks (server must be stopped)
    Timers {
        #[command(subcommand)]
        subcommand: TimersSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { listen, ephemeral } => {
            cmd::serve::run(&cli.config, &cli.overrides, listen, ephemeral)
        }
        Commands::Config { subcommand } => {
            cmd::config::run(&cli.config, &cli.overrides, subcommand, cli.json)
        }
        Commands::Timers { subcommand } => {
            cmd::timers::run(&cli.config, &cli.overrides, subcommand, cli.json)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
