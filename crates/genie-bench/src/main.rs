use std::path::PathBuf;

use clap::Parser;

use genie_bench::config::{BenchConfig, ResolvedOutputs};
use genie_bench::logging::init_logging;
use genie_bench::runner::BenchRunner;

/// Self-play harness for the genie's question selector.
#[derive(Debug, Parser)]
#[command(
    name = "genie-bench",
    author,
    version,
    about = "Deterministic self-play benchmark for the guessing engine"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of passes over the roster.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<usize>,

    /// Override the RNG seed for the game stream.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of questions after which a guess is forced.
    #[arg(long, value_name = "COUNT")]
    question_cap: Option<u32>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(rounds) = cli.rounds {
        config.games.rounds = rounds;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(cap) = cli.question_cap {
        config.selector.question_cap = Some(cap);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let player_count = config.players.len();
    let run_id = config.run_id.clone();
    let rounds = config.games.rounds;

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = BenchRunner::new(config, outputs)?;

    println!(
        "Loaded configuration '{run_id}' with {player_count} player{} ({rounds} round{}, {} candidates)",
        if player_count == 1 { "" } else { "s" },
        if rounds == 1 { "" } else { "s" },
        runner.roster().candidates().len(),
    );

    if cli.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} games over {} round{} → {} rows at {}",
        summary.games_played,
        summary.rounds,
        if summary.rounds == 1 { "" } else { "s" },
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
