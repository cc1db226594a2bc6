//! ptimer demo
//!
//! Times a counting loop and prints the report line.

use anyhow::{Context, Result};
use clap::Parser;
use ptimer::{Timer, TimerConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ptimer-demo", about = "Time a counting loop and report the elapsed time")]
struct Cli {
    /// Name of the timed section
    #[arg(short, long, default_value = "my test")]
    name: String,

    /// Report prefix (replaces "Elapsed time for <name>: ")
    #[arg(short, long)]
    explainer: Option<String>,

    /// Formatter: time_fmt_ms, time_fmt_s or time_fmt_m
    #[arg(short = 'f', long, default_value = "time_fmt_m")]
    time_fmt: String,

    /// Loop iterations to time
    #[arg(short, long, default_value_t = 1_000_000)]
    iterations: u64,

    /// JSON timer configuration; its fields override the flags above
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut builder = Timer::builder().name(&cli.name).time_fmt_name(&cli.time_fmt);
    if let Some(explainer) = &cli.explainer {
        builder = builder.explainer(explainer);
    }
    if let Some(path) = &cli.config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = TimerConfig::from_json(&json)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        builder = builder.config(config);
    }
    let mut timer = builder.build().context("Failed to configure timer")?;

    tracing::debug!(iterations = cli.iterations, "starting timed loop");
    let total = timer.time(|| {
        let mut acc = 0u64;
        for i in 0..cli.iterations {
            acc = std::hint::black_box(acc.wrapping_add(i));
        }
        acc
    });
    tracing::debug!(total, elapsed_s = timer.elapsed(), "timed loop finished");

    Ok(())
}
