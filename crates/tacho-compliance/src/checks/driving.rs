//! Daily driving time ceiling.

use tacho_model::{Severity, Violation, ViolationKind};

use crate::checks::CheckInput;
use crate::util::format_hhmm;

pub(crate) fn check(input: &CheckInput<'_>) -> Option<Violation> {
    let limit = input.limits.daily_driving_limit_minutes;
    if input.driving_minutes <= limit {
        return None;
    }

    Some(Violation {
        kind: ViolationKind::DrivingTimeViolation,
        detail: format!(
            "driving time {} exceeds the daily limit of {}",
            format_hhmm(input.driving_minutes),
            format_hhmm(limit),
        ),
        severity: Severity::Medium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacho_ingest::IntegritySignal;
    use tacho_standards::WtdLimits;

    fn input(limits: &WtdLimits, driving_minutes: i64) -> CheckInput<'_> {
        CheckInput {
            limits,
            driving_minutes,
            breaks_found: 0,
            qualifying_breaks: 0,
            max_speed_kmh: 0.0,
            supports_card_events: false,
            card_gap_minutes: 0,
            integrity: IntegritySignal::Plausible,
        }
    }

    #[test]
    fn at_limit_is_compliant() {
        let limits = WtdLimits::default();
        assert!(check(&input(&limits, 540)).is_none());
    }

    #[test]
    fn over_limit_reports_hhmm_detail() {
        let limits = WtdLimits::default();
        let violation = check(&input(&limits, 600)).unwrap();
        assert_eq!(violation.kind, ViolationKind::DrivingTimeViolation);
        assert!(violation.detail.contains("10h00m"));
        assert!(violation.detail.contains("9h00m"));
    }
}
