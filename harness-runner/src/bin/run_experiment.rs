//! CLI entry point for running an experiment.
//!
//! Argument shape grounded on `run_experiment.py`'s `main()`: `--config`
//! is required; `--task` runs a single ad-hoc task instead of the
//! configured benchmark. `--dataset` is a supplemented flag — dataset
//! ingestion is an out-of-scope external concern (§1), so unlike the
//! Python original (which left it a TODO), this harness expects the
//! caller to hand it a local SWE-bench JSONL file directly.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use harness_runner::{BatchRunner, LocalDirProvisioner};
use harness_types::{load_config, Task};

#[derive(Parser, Debug)]
#[command(name = "harness-run-experiment", about = "Run an agent-repair experiment")]
struct Args {
    /// Path to the experiment YAML config.
    #[arg(long)]
    config: PathBuf,
    /// Run a single ad-hoc task instead of the configured benchmark.
    #[arg(long)]
    task: Option<String>,
    /// Path to a SWE-bench JSONL dataset file (required unless `--task`
    /// is given).
    #[arg(long)]
    dataset: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    if let Some(description) = args.task {
        let task = Task::new("adhoc_test", description);
        let runner = BatchRunner::new(
            harness_types::ExperimentConfig {
                num_trials: 1,
                ..config
            },
            Arc::new(LocalDirProvisioner),
        )?;
        let summary = runner.run_experiment(vec![task]).await?;
        let row = &summary.results[0];
        println!(
            "Result: resolved={}, reason={}, tokens={}",
            row.resolved, row.completion_reason, row.tokens
        );
        return Ok(());
    }

    let dataset = args
        .dataset
        .ok_or_else(|| anyhow::anyhow!("--dataset is required unless --task is given"))?;
    let tasks = harness_bench::load_swebench_tasks(&dataset, &config.instance_ids)?;
    println!("Loaded {} tasks from {}", tasks.len(), dataset.display());

    let runner = BatchRunner::new(config, Arc::new(LocalDirProvisioner))?;
    let summary = runner.run_experiment(tasks).await?;

    println!(
        "Resolved {:.1}% ({} rows) — summary saved to {}",
        summary.resolve_rate * 100.0,
        summary.results.len(),
        runner.summary_path().display()
    );

    Ok(())
}
