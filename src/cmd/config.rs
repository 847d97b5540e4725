//! Configuration view and validation commands: `lifegit config`.

use anyhow::Result;
use lifegit::config::{Config, LifegitToml};

use super::super::{Cli, ConfigCommands};

fn print_effective(config: &Config) {
    let tutorial = &config.toml.tutorial;
    println!("[tutorial]");
    println!("  advanced = {}", tutorial.advanced);
    match &tutorial.directory {
        Some(dir) => println!("  directory = \"{}\"", dir.display()),
        None => println!("  directory = (current directory)"),
    }
    match &tutorial.content {
        Some(path) => println!("  content = \"{}\"", path.display()),
        None => println!("  content = (built-in)"),
    }
    println!("  main_branches = {:?}", tutorial.main_branches);
    match &tutorial.what_if_prefix {
        Some(prefix) => println!("  what_if_prefix = \"{}\"", prefix),
        None => println!("  what_if_prefix = (from content)"),
    }
    println!();
}

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config = Config::load(cli.config.as_deref())?;
            println!();
            println!("Life.git Configuration");
            println!("======================");
            println!();
            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("No lifegit.toml found. Using defaults."),
            }
            println!();
            println!("Effective values (with env overrides):");
            print_effective(&config);
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let config = Config::load(cli.config.as_deref())?;
            if config.source.is_none() {
                println!("No lifegit.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            let Some(path) = cli.config.clone().or_else(LifegitToml::default_path) else {
                anyhow::bail!("No config directory on this platform; pass --config <PATH>");
            };
            if path.exists() {
                println!("lifegit.toml already exists at {}", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            LifegitToml::default().save(&path)?;

            println!("Created lifegit.toml at {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [tutorial] advanced, directory, content");
            println!("  - [tutorial] main_branches, what_if_prefix");
            println!();
        }
    }

    Ok(())
}
