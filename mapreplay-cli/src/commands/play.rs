//! Play command - drive the replay clock over a log.
//!
//! Runs the clock from its start time until it reaches either end of the
//! replay, querying every entity and node each frame the way an animated
//! map would, and prints a usage summary at a fixed interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mapreplay::clock::{format_clock, FRAME_INTERVAL};
use tracing::{debug, info};

use super::common::{load_engine, parse_time, InputArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Resolution of the progress bar.
const PROGRESS_STEPS: u64 = 1000;

/// Arguments for the play command.
#[derive(Debug, Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Playback speed multiplier; negative values play backwards
    #[arg(long, allow_hyphen_values = true)]
    pub speed: Option<f64>,

    /// Days advanced per frame at 1x
    #[arg(long)]
    pub step: Option<f64>,

    /// Start time, in days or as D:HH:MM
    #[arg(long, value_parser = parse_time)]
    pub start: Option<f64>,

    /// Print a summary every N frames
    #[arg(long, default_value_t = 250)]
    pub every: u64,

    /// Pace frames in real time instead of running as fast as possible
    #[arg(long)]
    pub realtime: bool,
}

/// Run the play command.
pub fn run(args: PlayArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("play");
    let config = runner.config();

    let engine = load_engine(&args.inputs, config)?;
    let step = args.step.unwrap_or(config.replay.step);
    let speed = args.speed.unwrap_or(config.replay.speed);
    let mut clock = engine.clock(step, speed)?;
    if let Some(start) = args.start {
        clock.seek(start);
    }

    let data = engine.data().clone();
    let nodes: Vec<String> = data.inventory().nodes().map(str::to_string).collect();

    // Print banner
    println!("MapReplay v{}", mapreplay::VERSION);
    println!("==============");
    println!();
    println!("Events:    {}", args.inputs.events.display());
    println!("Entities:  {} ({} hidden)", data.entity_count(), data.hidden_count());
    println!("Legs:      {}", data.legs().len());
    println!("Nodes:     {}", nodes.len());
    println!("Duration:  {}", format_clock(data.end_time()));
    println!("Clock:     {}", clock);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up signal handler for graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let progress = ProgressBar::new(PROGRESS_STEPS);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {percent}% | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let every = args.every.max(1);
    let mut view = engine.view();
    let mut frames: u64 = 0;

    loop {
        let t = clock.time();
        let summary = view.usage_summary(t)?;
        for node in &nodes {
            view.query_level(node, t)?;
        }

        if frames % every == 0 {
            progress.println(format!("{}  {}", format_clock(t), summary));
        }
        progress.set_position((clock.progress() * PROGRESS_STEPS as f64) as u64);
        progress.set_message(clock.to_string());

        if shutdown.load(Ordering::SeqCst) {
            info!(time = t, "Stopped by user");
            break;
        }
        if clock.speed() == 0.0 || clock.at_boundary() {
            debug!(time = t, frames, "Clock reached the end of the replay");
            break;
        }

        clock.tick();
        frames += 1;
        if args.realtime {
            thread::sleep(FRAME_INTERVAL);
        }
    }
    progress.finish_and_clear();

    let t = clock.time();
    let stats = view.cache_stats();
    println!("Stopped at {} after {} frames", format_clock(t), frames);
    println!("{}", view.usage_summary(t)?);
    println!(
        "Cache: {} hits, {} misses ({:.1}% hit rate)",
        stats.hits,
        stats.misses,
        hit_rate(stats.hits, stats.misses)
    );
    info!(frames, hits = stats.hits, misses = stats.misses, "Playback finished");

    Ok(())
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 * 100.0 / total as f64
    }
}
