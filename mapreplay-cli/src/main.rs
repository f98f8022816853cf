//! MapReplay CLI - replay finished mission simulations on a map.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::inspect::{LegsArgs, LevelsArgs, QueryArgs};
use commands::play::PlayArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "mapreplay")]
#[command(version = mapreplay::VERSION)]
#[command(about = "Time-scrubbable replay of mission simulation logs", long_about = None)]
struct Cli {
    /// Use this configuration file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the replay clock across a log and report what happens
    Play(PlayArgs),

    /// List the legs (depart/arrive pairs) found in a log
    Legs(LegsArgs),

    /// Show where entities are and what they are doing at one time
    Query(QueryArgs),

    /// Show reconstructed cargo levels at nodes
    Levels(LevelsArgs),

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config { command } => commands::config::run(command, config_path),
        Commands::Play(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::play::run(args, &runner)
        }
        Commands::Legs(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::inspect::run_legs(args, &runner)
        }
        Commands::Query(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::inspect::run_query(args, &runner)
        }
        Commands::Levels(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::inspect::run_levels(args, &runner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_arguments() {
        let cli = Cli::try_parse_from([
            "mapreplay",
            "query",
            "--events",
            "events.json",
            "--locations",
            "locations.json",
            "--time",
            "1:12:00",
            "--crop-lat",
            "-90",
        ])
        .unwrap();

        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.time, 0.5);
                assert_eq!(args.inputs.crop_lat, Some(-90.0));
                assert!(args.entity.is_none());
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_play_accepts_negative_speed() {
        let cli = Cli::try_parse_from([
            "mapreplay",
            "play",
            "-e",
            "events.json",
            "-l",
            "locations.json",
            "--speed",
            "-8",
        ])
        .unwrap();

        match cli.command {
            Commands::Play(args) => assert_eq!(args.speed, Some(-8.0)),
            _ => panic!("expected play command"),
        }
    }
}
