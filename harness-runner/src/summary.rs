//! The experiment summary document (§4.G), grounded on
//! `original_source/scripts/run_experiment.py`'s `run_experiment` summary
//! builder, supplemented with the aggregate fields named in §4.G:
//! `total_cost_usd`, `mean_cache_hit_rate`, `mean_wall_clock_seconds`.

use serde::Serialize;

use harness_types::TaskResult;

/// One row of the summary's `results` array — the Python original's
/// per-result dict, with a `trial` index added since the batch runner
/// (unlike the single-pass original) runs every task `num_trials` times.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    /// Which trial (1-indexed) this row is from.
    pub trial: u32,
    /// The task this result is for.
    pub task_id: String,
    /// Whether the verifier passed.
    pub resolved: bool,
    /// Total input + output tokens for this run.
    pub tokens: u64,
    /// Wall-clock seconds elapsed.
    pub wall_clock_seconds: f64,
    /// Tool calls dispatched.
    pub tool_calls: u64,
    /// Verifier invocations.
    pub verifications: u64,
    /// Recovery invocations.
    pub recoveries: u64,
    /// Model-generation iterations.
    pub iterations: u64,
    /// The terminal reason's string tag (the Python original's
    /// `completion_reason`).
    pub completion_reason: String,
    /// Cache hit rate for this run's cumulative usage.
    pub cache_hit_rate: f64,
    /// Cost in USD for this run.
    pub cost_usd: rust_decimal::Decimal,
}

impl ResultRow {
    #[must_use]
    pub fn from_result(trial: u32, result: &TaskResult) -> Self {
        ResultRow {
            trial,
            task_id: result.task_id.clone(),
            resolved: result.resolved,
            tokens: result.usage.input_tokens + result.usage.output_tokens,
            wall_clock_seconds: result.wall_clock_seconds,
            tool_calls: result.tool_call_count,
            verifications: result.verification_count,
            recoveries: result.recovery_count,
            iterations: result.iteration_count,
            completion_reason: result.terminal_reason.as_str().to_string(),
            cache_hit_rate: result.usage.cache_hit_rate(),
            cost_usd: result.usage.cost_usd,
        }
    }
}

/// The full summary document written at the end of a batch run (§4.G's
/// exact field shape).
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// The experiment this summary is for.
    pub experiment_id: String,
    /// Distinct tasks run.
    pub num_tasks: usize,
    /// Trials run per task.
    pub num_trials: u32,
    /// Fraction of rows with `resolved = true`.
    pub resolve_rate: f64,
    /// Sum of every row's `cost_usd`.
    pub total_cost_usd: rust_decimal::Decimal,
    /// Mean of every row's `cache_hit_rate`.
    pub mean_cache_hit_rate: f64,
    /// Mean of every row's `wall_clock_seconds`.
    pub mean_wall_clock_seconds: f64,
    /// Per-task-per-trial result rows.
    pub results: Vec<ResultRow>,
}

/// Build a [`Summary`] from every trial's results, matching
/// `run_experiment`'s `resolve_rate` division-by-zero guard (`0` when
/// `results` is empty) and extending it with the supplemented aggregates.
#[must_use]
pub fn build_summary(experiment_id: &str, num_tasks: usize, num_trials: u32, results: Vec<ResultRow>) -> Summary {
    let count = results.len();
    let (resolve_rate, mean_cache_hit_rate, mean_wall_clock_seconds, total_cost_usd) = if count == 0 {
        (0.0, 0.0, 0.0, rust_decimal::Decimal::ZERO)
    } else {
        let resolved = results.iter().filter(|r| r.resolved).count();
        let cache_sum: f64 = results.iter().map(|r| r.cache_hit_rate).sum();
        let wall_sum: f64 = results.iter().map(|r| r.wall_clock_seconds).sum();
        let cost_sum: rust_decimal::Decimal = results.iter().map(|r| r.cost_usd).sum();
        (
            resolved as f64 / count as f64,
            cache_sum / count as f64,
            wall_sum / count as f64,
            cost_sum,
        )
    };

    Summary {
        experiment_id: experiment_id.to_string(),
        num_tasks,
        num_trials,
        resolve_rate,
        total_cost_usd,
        mean_cache_hit_rate,
        mean_wall_clock_seconds,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::{TerminalReason, TokenUsage};

    fn result(task_id: &str, resolved: bool) -> TaskResult {
        let reason = if resolved { TerminalReason::Verified } else { TerminalReason::MaxIterations };
        TaskResult::new(task_id, reason, TokenUsage::default())
    }

    #[test]
    fn empty_results_yield_zero_rates() {
        let summary = build_summary("exp1", 0, 3, vec![]);
        assert_eq!(summary.resolve_rate, 0.0);
        assert_eq!(summary.mean_wall_clock_seconds, 0.0);
        assert_eq!(summary.total_cost_usd, rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn resolve_rate_is_fraction_resolved() {
        let rows = vec![
            ResultRow::from_result(1, &result("t1", true)),
            ResultRow::from_result(1, &result("t2", false)),
        ];
        let summary = build_summary("exp1", 2, 1, rows);
        assert_eq!(summary.resolve_rate, 0.5);
        assert_eq!(summary.results.len(), 2);
    }
}
