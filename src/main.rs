use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "lifegit")]
#[command(version, about = "Learn git by living a life in commits")]
pub struct Cli {
    /// Print diagnostic logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Begin your Life.git journey
    Start {
        /// Directory for your life repository (defaults to the configured
        /// directory, then the current one)
        directory: Option<PathBuf>,

        /// Type the git commands yourself instead of picking from menus
        #[arg(long)]
        advanced: bool,
    },
    /// Check whether an act is complete
    Validate {
        /// Act number to validate (1-2)
        act: u8,

        /// Path to the repository
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
    /// Show your progress through the tutorial
    Status {
        /// Path to the repository
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Check the configuration file for problems
    Validate,
    /// Write a default lifegit.toml
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    lifegit::logging::init(cli.verbose);

    match &cli.command {
        Commands::Start {
            directory,
            advanced,
        } => cmd::cmd_start(&cli, directory.clone(), *advanced)?,
        Commands::Validate { act, path } => cmd::cmd_validate(&cli, *act, path)?,
        Commands::Status { path } => cmd::cmd_status(&cli, path)?,
        Commands::Config { command } => cmd::cmd_config(&cli, command.clone())?,
    }

    Ok(())
}
