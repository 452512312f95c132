//! Speed limit check.

use tacho_model::{Severity, Violation, ViolationKind};

use crate::checks::CheckInput;

pub(crate) fn check(input: &CheckInput<'_>) -> Option<Violation> {
    if input.max_speed_kmh <= input.limits.speed_limit_kmh {
        return None;
    }

    Some(Violation {
        kind: ViolationKind::SpeedViolation,
        detail: format!(
            "maximum observed speed {:.1} km/h exceeds the {:.1} km/h limit",
            input.max_speed_kmh, input.limits.speed_limit_kmh,
        ),
        severity: Severity::Medium,
    })
}
