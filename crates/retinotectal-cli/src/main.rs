use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use retinotectal_core::{build_simulation, ExperimentConfig, SubstrateType};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

const WARMUP_STEPS: usize = 10;
const BENCHMARK_STEPS: usize = 200;

#[derive(Parser)]
#[command(name = "retinotectal")]
#[command(about = "Retinotectal growth cone navigation simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one experiment and print its projection summary
    Run {
        /// Path to an experiment config file (JSON)
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Built-in experiment (continuous_gradients, wedges, stripe, gap, gap_inv)
        #[arg(long)]
        preset: Option<String>,

        /// Override the number of steps
        #[arg(long)]
        steps: Option<usize>,

        /// Override the seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the summary JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Time simulation steps for a few population sizes
    Benchmark,
    /// Dump the default (or a preset) experiment configuration to stdout
    DumpDefaultConfig {
        #[arg(long)]
        preset: Option<String>,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn preset_config(name: &str) -> Result<ExperimentConfig> {
    let kind: SubstrateType = name.parse().context("invalid preset")?;
    Ok(ExperimentConfig::preset(kind))
}

fn load_config(config: Option<PathBuf>, preset: Option<String>) -> Result<ExperimentConfig> {
    match (config, preset) {
        (Some(path), _) => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open config file {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file)).context("failed to parse config")
        }
        (None, Some(name)) => preset_config(&name),
        (None, None) => Ok(ExperimentConfig::default()),
    }
}

fn run_benchmark(cones: usize) -> Result<()> {
    let mut config = ExperimentConfig::preset(SubstrateType::ContinuousGradients);
    config.substrate.rows = (cones * 4).max(100);
    config.growth_cones.count = cones;
    config.simulation.num_steps = WARMUP_STEPS + BENCHMARK_STEPS;
    let mut simulation = build_simulation(&config).context("benchmark config is invalid")?;

    for _ in 0..WARMUP_STEPS {
        simulation.step();
    }
    let mut total_us = 0u64;
    let mut accepted = 0usize;
    for _ in 0..BENCHMARK_STEPS {
        let stats = simulation.step();
        total_us += stats.total_us;
        accepted += stats.accepted;
    }

    let avg_step_us = total_us as f64 / BENCHMARK_STEPS as f64;
    println!("--- {cones} growth cones ---");
    println!(
        "  Avg step:      {avg_step_us:.0} us ({:.1} steps/sec)",
        1_000_000.0 / avg_step_us.max(1.0)
    );
    println!(
        "  Acceptance:    {:.1}%",
        accepted as f64 * 100.0 / (cones * BENCHMARK_STEPS) as f64
    );
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig { preset } => {
            let config = match preset {
                Some(name) => preset_config(&name)?,
                None => ExperimentConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p retinotectal-cli --release -- benchmark");
                eprintln!();
            }
            println!("Warmup: {WARMUP_STEPS} steps, Benchmark: {BENCHMARK_STEPS} steps");
            for cones in [10, 50, 200, 500] {
                run_benchmark(cones)?;
            }
        }
        Commands::Run {
            config,
            preset,
            steps,
            seed,
            out,
        } => {
            let mut experiment = load_config(config, preset)?;
            if let Some(steps) = steps {
                experiment.simulation.num_steps = steps;
            }
            if let Some(seed) = seed {
                experiment.simulation.seed = seed;
            }
            if experiment.simulation.num_steps == 0 {
                bail!("--steps must be positive");
            }
            experiment.validate().context("config validation error")?;

            let started = Instant::now();
            let result = build_simulation(&experiment)
                .context("failed to initialize simulation")?
                .run();
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "run complete");

            let summary = result.summary();
            match out {
                Some(path) => {
                    let file = File::create(&path).context("failed to create summary file")?;
                    serde_json::to_writer_pretty(file, &summary)
                        .context("failed to write summary")?;
                    println!("Run complete. Summary saved to {}", path.display());
                }
                None => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                    println!("{result}");
                }
            }
        }
    }
    Ok(())
}
