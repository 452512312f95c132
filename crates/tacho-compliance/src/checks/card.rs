//! Driver card insertion coverage.
//!
//! Only smart recorders (Generation 2 formats) report card events, so the
//! rule is gated on the capability flag rather than the file type.

use tacho_model::{Severity, Violation, ViolationKind};

use crate::checks::CheckInput;
use crate::util::format_hhmm;

pub(crate) fn check(input: &CheckInput<'_>) -> Option<Violation> {
    if !input.supports_card_events || input.card_gap_minutes <= 0 {
        return None;
    }

    Some(Violation {
        kind: ViolationKind::CardInsertionViolation,
        detail: format!(
            "driver card absent for {} of recorded driving",
            format_hhmm(input.card_gap_minutes),
        ),
        severity: Severity::Medium,
    })
}
