//! iftl-cli: operator tool for IFTL yield farm deployments.
//!
//! Inspects a deployment config, previews rewards and replays operation
//! scripts against an in-memory farm.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use iftl_core::clock::{ManualClock, SystemClock};
use iftl_core::traits::TimeSource;
use iftl_farm::FarmConfig;
use iftl_math::RewardEngine;

/// IFTL yield farm operator interface.
#[derive(Parser)]
#[command(name = "iftl-cli")]
#[command(version, about = "Interest Faster Than Light yield farm tooling.")]
struct Cli {
    /// Log level filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format: "text" or "json".
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, validate and print a deployment config.
    Config(ConfigArgs),
    /// Compute the reward a lock would earn.
    Reward(RewardArgs),
    /// Replay an operation script against an in-memory deployment.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the farm config (TOML).
    #[arg(short, long)]
    config: PathBuf,
}

#[derive(Args)]
struct RewardArgs {
    /// Path to the farm config (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Locked principal in accepted-token units.
    #[arg(short, long)]
    principal: u128,

    /// Time held, in seconds.
    #[arg(short, long)]
    elapsed: i64,
}

#[derive(Args)]
struct SimulateArgs {
    /// Path to the farm config (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// JSON array of operations.
    #[arg(short, long)]
    script: PathBuf,

    /// Deployment time in UNIX seconds (default: now).
    #[arg(long)]
    start: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Config(args) => show_config(args),
        Commands::Reward(args) => preview_reward(args),
        Commands::Simulate(args) => simulate(args),
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. Logs go to stderr so stdout carries
/// only command output.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(path: &Path) -> Result<FarmConfig> {
    let config = FarmConfig::load(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    Ok(config)
}

/// Print the resolved configuration as JSON.
fn show_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Print the reward a lock of `principal` earns after `elapsed` seconds.
fn preview_reward(args: RewardArgs) -> Result<()> {
    if args.elapsed < 0 {
        bail!("Elapsed time must not be negative: {}", args.elapsed);
    }
    let config = load_config(&args.config)?;
    let params = config.params()?;
    let engine = RewardEngine::new(params.interest_rate, params.multiplier)
        .context("Invalid reward parameters")?;

    let growth = engine.growth(args.elapsed)?;
    let reward = iftl_math::compute_reward(
        args.principal,
        params.interest_rate,
        params.multiplier,
        args.elapsed,
    )
    .context("Reward computation failed")?;

    println!("Principal:  {}", args.principal);
    println!("Elapsed:    {}s", args.elapsed);
    println!("Rate:       {}", params.interest_rate);
    println!("Multiplier: {}", params.multiplier);
    println!("Growth:     {growth}");
    println!("Reward:     {reward}");
    Ok(())
}

/// Deploy an in-memory farm and replay a script, one JSON line per signal.
fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let raw = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script: {}", args.script.display()))?;
    let ops = script::parse(&raw).context("Failed to parse script")?;

    let start = args.start.unwrap_or_else(|| SystemClock.timestamp());
    let clock = ManualClock::new(start);
    let mut sim = script::Simulation::deploy(&config, clock)?;
    info!(ops = ops.len(), start, "replaying script");

    for (index, op) in ops.iter().enumerate() {
        for line in sim.step(index, op)? {
            println!("{line}");
        }
    }
    println!("{}", sim.summary()?);
    Ok(())
}
