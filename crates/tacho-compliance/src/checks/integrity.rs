//! Recorder data integrity.
//!
//! A suspicious decoder signal becomes its own violation but does not stop
//! the other rules from running.

use tacho_ingest::IntegritySignal;
use tacho_model::{Severity, Violation, ViolationKind};

use crate::checks::CheckInput;

pub(crate) fn check(input: &CheckInput<'_>) -> Option<Violation> {
    if input.integrity != IntegritySignal::Suspicious {
        return None;
    }

    Some(Violation {
        kind: ViolationKind::ManipulationDetected,
        detail: "decoder reported tampering or implausible recorder values".to_string(),
        severity: Severity::Medium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacho_standards::WtdLimits;

    fn input(limits: &WtdLimits, integrity: IntegritySignal) -> CheckInput<'_> {
        CheckInput {
            limits,
            driving_minutes: 0,
            breaks_found: 0,
            qualifying_breaks: 0,
            max_speed_kmh: 0.0,
            supports_card_events: false,
            card_gap_minutes: 0,
            integrity,
        }
    }

    #[test]
    fn plausible_data_raises_nothing() {
        let limits = WtdLimits::default();
        assert!(check(&input(&limits, IntegritySignal::Plausible)).is_none());
    }

    #[test]
    fn suspicious_data_is_a_violation() {
        let limits = WtdLimits::default();
        let violation = check(&input(&limits, IntegritySignal::Suspicious)).unwrap();
        assert_eq!(violation.kind, ViolationKind::ManipulationDetected);
    }
}
