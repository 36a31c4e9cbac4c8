//! R3: fresh-context restart — Ralph-style clean restart. "No compaction,
//! no degradation." Filesystem and git state are preserved by the harness
//! outside this strategy; only the verification failure message carries
//! forward into the new conversation.

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};

use crate::outcome::RecoveryOutcome;
use crate::strategy::RecoveryStrategy;

/// R3: start completely fresh, carrying only cumulative counters and a
/// minimal failure signal forward.
#[derive(Debug, Default)]
pub struct FreshRestart;

impl RecoveryStrategy for FreshRestart {
    fn strategy_name(&self) -> &'static str {
        "fresh_restart"
    }

    fn recover<'a>(
        &'a self,
        context: &'a mut Context,
        verification: &'a VerificationResult,
        task: &'a Task,
    ) -> BoxFuture<'a, RecoveryOutcome> {
        Box::pin(async move {
            let mut fresh = context.clone_fresh();
            let restart_message = format!(
                "## Task\n{}\n\n\
                 ## Previous Attempt Result\n\
                 A previous attempt was made but verification failed:\n{}\n\n\
                 The workspace filesystem contains changes from the previous attempt. \
                 You may inspect the current state of files and git history.\n\n\
                 Please complete this task, addressing the issues identified above.",
                task.description, verification.message
            );
            fresh.add_user_message(restart_message);
            RecoveryOutcome::Replaced(fresh)
        })
    }
}
