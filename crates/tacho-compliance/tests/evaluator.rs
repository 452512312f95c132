//! Rule evaluator scenarios and properties.

mod common;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use tacho_compliance::{AnalysisInput, Evaluator, PriorContext, format_hhmm};
use tacho_ingest::{IntegritySignal, RecorderMetadata, TachographFileType};
use tacho_model::{
    ActivitySample, ActivityType, DataIntegrity, SampleSource, Severity, ViolationKind,
};
use tacho_standards::WtdLimits;

use crate::common::{driver, org, sample, vehicle};

fn input_for(
    file_type: TachographFileType,
    samples: Vec<ActivitySample>,
    max_speed_kmh: f64,
    card_gap_minutes: i64,
    integrity: IntegritySignal,
) -> AnalysisInput {
    let period_start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
    AnalysisInput {
        organization_id: org("org-1"),
        driver_id: driver("D-1"),
        vehicle_id: vehicle("V-1"),
        file_type,
        period_start,
        period_end: period_start + Duration::days(1),
        samples,
        max_speed_kmh,
        recorder: RecorderMetadata {
            generation: file_type.generation(),
            software_version: None,
            card_gap_minutes,
        },
        integrity,
        prior: PriorContext::empty(),
    }
}

#[test]
fn six_hundred_minutes_driving_without_breaks_raises_two_violations() {
    let d = driver("D-1");
    let samples = vec![sample(&d, 0, 600, ActivityType::Driving)];
    let input = input_for(
        TachographFileType::V2b,
        samples,
        0.0,
        0,
        IntegritySignal::Plausible,
    );

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();

    let kinds: Vec<ViolationKind> = assessment.violations.iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ViolationKind::DrivingTimeViolation,
            ViolationKind::RestPeriodViolation,
        ]
    );
    assert_eq!(assessment.overall_severity(), Severity::Medium);
    assert!(
        assessment
            .violations
            .iter()
            .all(|v| v.severity == Severity::Medium)
    );
    assert_eq!(assessment.driving_time_total_minutes, 600);
    assert_eq!(assessment.data_integrity, DataIntegrity::Intact);
}

#[test]
fn more_than_two_violations_escalate_to_high() {
    let d = driver("D-1");
    let samples = vec![sample(&d, 0, 600, ActivityType::Driving)];
    let input = input_for(
        TachographFileType::V2b,
        samples,
        95.0,
        30,
        IntegritySignal::Plausible,
    );

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();

    assert_eq!(assessment.violations.len(), 4);
    assert_eq!(assessment.overall_severity(), Severity::High);
    assert!(
        assessment
            .violations
            .iter()
            .all(|v| v.severity == Severity::High)
    );
}

#[test]
fn zero_driving_zero_violations_is_the_compliant_case() {
    let input = input_for(
        TachographFileType::Ddd,
        Vec::new(),
        0.0,
        0,
        IntegritySignal::Plausible,
    );

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();

    assert!(assessment.violations.is_empty());
    assert_eq!(assessment.driving_time_total_minutes, 0);
    assert_eq!(assessment.data_integrity, DataIntegrity::Intact);
}

#[test]
fn qualifying_break_satisfies_the_rest_rule() {
    let d = driver("D-1");
    let samples = vec![
        sample(&d, 0, 250, ActivityType::Driving),
        sample(&d, 250, 295, ActivityType::Break),
        sample(&d, 295, 500, ActivityType::Driving),
    ];
    let input = input_for(
        TachographFileType::V1b,
        samples,
        0.0,
        0,
        IntegritySignal::Plausible,
    );

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();

    assert!(assessment.violations.is_empty());
    assert_eq!(assessment.rest_periods_count, 1);
}

#[test]
fn suspicious_integrity_is_reported_alongside_other_rules() {
    let d = driver("D-1");
    let samples = vec![sample(&d, 0, 600, ActivityType::Driving)];
    let input = input_for(
        TachographFileType::Esm,
        samples,
        0.0,
        0,
        IntegritySignal::Suspicious,
    );

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();

    let kinds: Vec<ViolationKind> = assessment.violations.iter().map(|v| v.kind).collect();
    assert!(kinds.contains(&ViolationKind::ManipulationDetected));
    assert!(kinds.contains(&ViolationKind::DrivingTimeViolation));
    assert_eq!(assessment.data_integrity, DataIntegrity::Suspicious);
}

#[test]
fn card_gap_on_legacy_format_is_not_a_violation() {
    let d = driver("D-1");
    let samples = vec![sample(&d, 0, 120, ActivityType::Driving)];
    let input = input_for(
        TachographFileType::Ddd,
        samples,
        0.0,
        60,
        IntegritySignal::Plausible,
    );

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();
    assert!(assessment.violations.is_empty());
}

#[test]
fn evaluation_is_deterministic_including_the_id() {
    let d = driver("D-1");
    let samples = vec![
        sample(&d, 0, 300, ActivityType::Driving),
        sample(&d, 300, 360, ActivityType::Break),
    ];
    let input = input_for(
        TachographFileType::V2b,
        samples,
        88.0,
        0,
        IntegritySignal::Plausible,
    );

    let evaluator = Evaluator::new(WtdLimits::default());
    let first = evaluator.evaluate(&input).unwrap();
    let second = evaluator.evaluate(&input).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.id, second.id);
}

#[test]
fn prior_manual_samples_extend_the_window() {
    let d = driver("D-1");
    let decoded = vec![sample(&d, 300, 700, ActivityType::Driving)];
    let prior = vec![ActivitySample::new(
        d.clone(),
        vehicle("V-1"),
        common::base_time(),
        common::base_time() + Duration::minutes(200),
        ActivityType::Driving,
        SampleSource::ManualClock,
    )
    .unwrap()];

    let mut input = input_for(
        TachographFileType::V2b,
        decoded,
        0.0,
        0,
        IntegritySignal::Plausible,
    );
    input.prior = PriorContext {
        samples: prior,
        daily_rest: Vec::new(),
    };

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();

    // 400 decoded + 200 prior manual minutes breach the 540 limit together.
    assert_eq!(assessment.driving_time_total_minutes, 600);
    assert!(
        assessment
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::DrivingTimeViolation)
    );
}

#[test]
fn prior_samples_shadowed_by_decoded_data_are_dropped() {
    let d = driver("D-1");
    let decoded = vec![sample(&d, 0, 300, ActivityType::Driving)];
    let prior = vec![sample(&d, 100, 200, ActivityType::OtherWork)];

    let mut input = input_for(
        TachographFileType::V2b,
        decoded,
        0.0,
        0,
        IntegritySignal::Plausible,
    );
    input.prior = PriorContext {
        samples: prior,
        daily_rest: Vec::new(),
    };

    let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();
    assert_eq!(assessment.driving_time_total_minutes, 300);
}

/// Build a compliant day: driving chunks of at most 200 minutes separated
/// by qualifying 45-minute breaks.
fn compliant_day(d: &tacho_model::DriverId, total_driving: i64) -> Vec<ActivitySample> {
    let mut samples = Vec::new();
    let mut cursor = 0i64;
    let mut remaining = total_driving;
    while remaining > 0 {
        let chunk = remaining.min(200);
        samples.push(sample(d, cursor, cursor + chunk, ActivityType::Driving));
        cursor += chunk;
        samples.push(sample(d, cursor, cursor + 45, ActivityType::Break));
        cursor += 45;
        remaining -= chunk;
    }
    samples
}

proptest! {
    #[test]
    fn driving_within_limits_never_raises_time_or_rest_violations(total in 0i64..=540) {
        let d = driver("D-1");
        let input = input_for(
            TachographFileType::V2b,
            compliant_day(&d, total),
            0.0,
            0,
            IntegritySignal::Plausible,
        );
        let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();
        prop_assert!(assessment.violations.iter().all(|v| v.kind
            != ViolationKind::DrivingTimeViolation
            && v.kind != ViolationKind::RestPeriodViolation));
        prop_assert_eq!(assessment.driving_time_total_minutes, total);
    }

    #[test]
    fn driving_over_the_limit_always_raises_a_violation(total in 541i64..=1200) {
        let d = driver("D-1");
        let input = input_for(
            TachographFileType::V2b,
            compliant_day(&d, total),
            0.0,
            0,
            IntegritySignal::Plausible,
        );
        let assessment = Evaluator::new(WtdLimits::default()).evaluate(&input).unwrap();
        let violation = assessment
            .violations
            .iter()
            .find(|v| v.kind == ViolationKind::DrivingTimeViolation)
            .expect("driving time violation must be present");
        prop_assert!(violation.detail.contains(&format_hhmm(total)));
    }
}
