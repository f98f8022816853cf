//! Point-in-time inspection commands: `legs`, `query` and `levels`.

use clap::Args;
use mapreplay::clock::format_clock;
use mapreplay::inventory::{LevelSeries, Levels};
use mapreplay::replay::ReplayError;

use super::common::{format_state, load_engine, parse_time, InputArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the legs command.
#[derive(Debug, Args)]
pub struct LegsArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Only show legs of this entity
    #[arg(long)]
    pub entity: Option<String>,
}

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Replay time, in days or as D:HH:MM
    #[arg(short, long, value_parser = parse_time)]
    pub time: f64,

    /// Entity to query; all entities when omitted
    #[arg(long)]
    pub entity: Option<String>,
}

/// Arguments for the levels command.
#[derive(Debug, Args)]
pub struct LevelsArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Node to inspect; lists every node when omitted
    #[arg(long)]
    pub node: Option<String>,

    /// Replay time, in days or as D:HH:MM; the full series when omitted
    #[arg(short, long, value_parser = parse_time)]
    pub time: Option<f64>,
}

/// List the legs extracted from the log.
pub fn run_legs(args: LegsArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("legs");
    let engine = load_engine(&args.inputs, runner.config())?;

    let legs: Vec<_> = engine
        .data()
        .legs()
        .iter()
        .filter(|leg| args.entity.as_deref().map_or(true, |id| leg.entity_id == id))
        .collect();

    for leg in &legs {
        println!("{}", leg);
    }
    println!();
    println!("{} legs", legs.len());

    Ok(())
}

/// Print entity states at one time.
pub fn run_query(args: QueryArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("query");
    let engine = load_engine(&args.inputs, runner.config())?;
    let mut view = engine.view();

    let states = match &args.entity {
        Some(id) => vec![view.query(id, args.time)?],
        None => view.query_all(args.time)?,
    };

    println!("{}", format_clock(args.time));
    println!();
    for state in &states {
        println!("{}", format_state(state));
    }
    if args.entity.is_none() {
        println!();
        println!("{}", view.usage_summary(args.time)?);
    }

    Ok(())
}

/// Print cargo levels for one node or all nodes.
pub fn run_levels(args: LevelsArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("levels");
    let engine = load_engine(&args.inputs, runner.config())?;
    let inventory = engine.data().inventory();

    let node = match &args.node {
        Some(node) => node,
        None => {
            for series in inventory.iter() {
                println!("{:<12} max {}", series.node(), format_levels(series.maximums()));
            }
            println!();
            println!("{} nodes", inventory.len());
            return Ok(());
        }
    };

    match args.time {
        Some(t) => {
            let mut view = engine.view();
            let levels = view.query_level(node, t)?;
            println!("{} at {}: {}", node, format_clock(t), format_levels(&levels));
        }
        None => {
            let series = inventory
                .get(node)
                .ok_or_else(|| ReplayError::UnknownNode(node.clone()))?;
            print_series(series);
        }
    }

    Ok(())
}

fn print_series(series: &LevelSeries) {
    println!("{}", series.node());
    println!("  initial      {}", format_levels(series.initial()));
    for sample in series.samples() {
        println!(
            "  {}  {}",
            format_clock(sample.time),
            format_levels(&sample.levels)
        );
    }
    println!("  maximum      {}", format_levels(series.maximums()));
}

fn format_levels(levels: &Levels) -> String {
    if levels.is_empty() {
        return "(none)".to_string();
    }
    levels
        .iter()
        .map(|(commodity, amount)| format!("{}={}", commodity, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_levels() {
        let mut levels = Levels::new();
        assert_eq!(format_levels(&levels), "(none)");

        levels.insert("PAX".to_string(), 15.0);
        levels.insert("FUEL".to_string(), 2.5);
        assert_eq!(format_levels(&levels), "FUEL=2.5, PAX=15");
    }
}
