//! Rest periods after continuous driving.

use tacho_model::{Severity, Violation, ViolationKind};

use crate::checks::CheckInput;
use crate::util::format_hhmm;

pub(crate) fn check(input: &CheckInput<'_>) -> Option<Violation> {
    if input.driving_minutes <= input.limits.continuous_driving_limit_minutes {
        return None;
    }
    if input.qualifying_breaks > 0 {
        return None;
    }

    Some(Violation {
        kind: ViolationKind::RestPeriodViolation,
        detail: format!(
            "driving time {} exceeds {} with no qualifying break of at least {} ({} shorter break(s) recorded)",
            format_hhmm(input.driving_minutes),
            format_hhmm(input.limits.continuous_driving_limit_minutes),
            format_hhmm(input.limits.minimum_break_minutes),
            input.breaks_found,
        ),
        severity: Severity::Medium,
    })
}
