//! CLI entry point for the Docker-based grader adapter.
//!
//! Argument shape grounded verbatim on `docker_eval.py`'s `main()`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use harness_grader::{build_predictions, run_grader, GraderInvocation};

#[derive(Parser, Debug)]
#[command(name = "harness-docker-eval", about = "Docker-based SWE-bench evaluation")]
struct Args {
    /// Directory with `.diff` files, one per task.
    #[arg(long)]
    patch_dir: PathBuf,
    /// Name for this run.
    #[arg(long, default_value = "v2_agent")]
    run_name: String,
    /// Parallel containers.
    #[arg(long, default_value_t = 10)]
    max_workers: usize,
    /// Per-instance timeout, in seconds.
    #[arg(long, default_value_t = 900)]
    timeout: u64,
    /// Specific instance IDs to evaluate; defaults to every non-empty
    /// `.diff` file found in `patch_dir`.
    #[arg(long)]
    instance_ids: Vec<String>,
    /// Output directory for grader reports.
    #[arg(long, default_value = "results/docker_eval")]
    report_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let instance_ids = if args.instance_ids.is_empty() {
        discover_instance_ids(&args.patch_dir).await?
    } else {
        args.instance_ids
    };

    println!(
        "Evaluating {} instances with Docker (max_workers={})",
        instance_ids.len(),
        args.max_workers
    );

    let predictions_path = build_predictions(&args.patch_dir, &instance_ids, &args.run_name).await?;
    println!("Predictions saved to {}", predictions_path.display());

    let invocation = GraderInvocation {
        run_name: args.run_name,
        max_workers: args.max_workers,
        timeout: Duration::from_secs(args.timeout),
        report_dir: args.report_dir,
        ..GraderInvocation::default()
    };

    let report = run_grader(&invocation, &predictions_path, &instance_ids).await?;
    println!("\n{}", "=".repeat(60));
    println!("Evaluation Results");
    println!("{}", "=".repeat(60));
    for (name, value) in &report.reports {
        println!("\n{name}:");
        println!("{}", serde_json::to_string_pretty(value)?);
    }

    Ok(())
}

/// Every non-empty `{instance_id}.diff` in `patch_dir`, sorted — matching
/// `docker_eval.py`'s fallback discovery when `--instance-ids` is omitted.
async fn discover_instance_ids(patch_dir: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut entries = tokio::fs::read_dir(patch_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("diff") {
            continue;
        }
        if entry.metadata().await?.len() == 0 {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            ids.push(stem.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}
