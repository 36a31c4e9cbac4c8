//! Builds a [`Verifier`] from configuration (§4.D).

use std::time::Duration;

use harness_types::VerificationMethod;

use crate::e2e::E2eVerifier;
use crate::none::NoVerification;
use crate::self_review::SelfReviewVerifier;
use crate::spec_comparison::SpecComparisonVerifier;
use crate::test_execution::TestExecutionVerifier;
use crate::verifier::Verifier;

/// Select the verifier strategy named by `method`, with `subprocess_timeout`
/// applied to V2/V4's subprocess call.
#[must_use]
pub fn create_verifier(method: VerificationMethod, subprocess_timeout: Duration) -> Box<dyn Verifier> {
    match method {
        VerificationMethod::None => Box::new(NoVerification),
        VerificationMethod::SelfReview => Box::new(SelfReviewVerifier),
        VerificationMethod::TestExecution => Box::new(TestExecutionVerifier::new(subprocess_timeout)),
        VerificationMethod::SpecComparison => Box::new(SpecComparisonVerifier),
        VerificationMethod::E2e => Box::new(E2eVerifier::new(subprocess_timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_name_matches_selection() {
        assert_eq!(
            create_verifier(VerificationMethod::None, Duration::from_secs(1)).method_name(),
            "none"
        );
        assert_eq!(
            create_verifier(VerificationMethod::TestExecution, Duration::from_secs(1)).method_name(),
            "test_execution"
        );
        assert_eq!(
            create_verifier(VerificationMethod::E2e, Duration::from_secs(1)).method_name(),
            "e2e"
        );
    }
}
