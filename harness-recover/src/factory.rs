//! Builds a [`RecoveryStrategy`] from configuration (§4.E).

use harness_types::RecoveryStrategyType;

use crate::compact::CompactAndRetry;
use crate::fresh::FreshRestart;
use crate::retry::RetryInContext;
use crate::strategy::RecoveryStrategy;
use crate::transport::RecoveryTransport;

/// Select the recovery strategy named by `strategy_type`. `transport` is
/// only consumed by `CompactAndRetry`; R1/R3 ignore it. Passing `None` for
/// `CompactAndRetry` is valid — it degrades to R1 behavior per-call rather
/// than failing to construct.
#[must_use]
pub fn create_recovery_strategy(
    strategy_type: RecoveryStrategyType,
    transport: Option<Box<dyn RecoveryTransport>>,
) -> Box<dyn RecoveryStrategy> {
    match strategy_type {
        RecoveryStrategyType::RetryInContext => Box::new(RetryInContext),
        RecoveryStrategyType::CompactAndRetry => match transport {
            Some(transport) => Box::new(CompactAndRetry::with_transport(transport)),
            None => Box::new(CompactAndRetry::new()),
        },
        RecoveryStrategyType::FreshRestart => Box::new(FreshRestart),
    }
}
