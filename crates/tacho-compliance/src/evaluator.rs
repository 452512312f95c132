//! The compliance rule evaluator.
//!
//! `evaluate` is a pure function of its input: no wall clock, no
//! randomness, no storage. Identical input produces an identical
//! assessment, including its id. That determinism is what the
//! materializer's idempotency keys on.

use tracing::debug;

use tacho_ingest::IntegritySignal;
use tacho_model::{
    ActivitySample, AssessmentId, ComplianceAssessment, DataIntegrity, Severity, Warning,
    WarningKind, check_sample_sequence,
};
use tacho_standards::WtdLimits;

use crate::checks::{self, CheckInput};
use crate::error::Result;
use crate::input::AnalysisInput;

pub struct Evaluator {
    limits: WtdLimits,
}

impl Evaluator {
    pub fn new(limits: WtdLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &WtdLimits {
        &self.limits
    }

    /// Evaluate one analysis window into a [`ComplianceAssessment`].
    ///
    /// A window with zero driving and zero violations yields an assessment
    /// with an empty violation list and intact data: the compliant case.
    /// Evaluation failures are errors; an empty assessment never means
    /// "not evaluated".
    pub fn evaluate(&self, input: &AnalysisInput) -> Result<ComplianceAssessment> {
        let samples = merge_samples(input)?;

        let driving_minutes: i64 = samples
            .iter()
            .filter(|s| s.activity == tacho_model::ActivityType::Driving)
            .map(ActivitySample::duration_minutes)
            .sum();
        let breaks_found = samples.iter().filter(|s| s.activity.is_rest()).count();
        let qualifying_breaks = samples
            .iter()
            .filter(|s| {
                s.activity.is_rest() && s.duration_minutes() >= self.limits.minimum_break_minutes
            })
            .count();

        let capabilities = input.file_type.capabilities();
        let check_input = CheckInput {
            limits: &self.limits,
            driving_minutes,
            breaks_found,
            qualifying_breaks,
            max_speed_kmh: input.max_speed_kmh,
            supports_card_events: capabilities.supports_card_events,
            card_gap_minutes: input.recorder.card_gap_minutes,
            integrity: input.integrity,
        };

        let mut violations = checks::run_all(&check_input);

        // More than 2 violations in one assessment escalates them all.
        if violations.len() > 2 {
            for violation in &mut violations {
                violation.severity = Severity::High;
            }
        }

        let warnings = coverage_warnings(input, &samples);

        let data_integrity = if input.integrity == IntegritySignal::Suspicious {
            DataIntegrity::Suspicious
        } else {
            DataIntegrity::Intact
        };

        debug!(
            driver = %input.driver_id,
            driving_minutes,
            violations = violations.len(),
            "evaluated analysis window"
        );

        Ok(ComplianceAssessment {
            id: assessment_id(input, &samples),
            violations,
            warnings,
            driving_time_total_minutes: driving_minutes,
            rest_periods_count: breaks_found,
            max_speed_kmh: input.max_speed_kmh,
            data_integrity,
        })
    }
}

/// Merge decoded samples with prior stored context.
///
/// Decoded samples are authoritative for their intervals; a prior sample
/// that overlaps a decoded one (a manual entry later covered by a
/// download) is dropped. The merged sequence must satisfy the model
/// invariants.
fn merge_samples(input: &AnalysisInput) -> Result<Vec<ActivitySample>> {
    let mut merged = input.samples.clone();

    for prior in &input.prior.samples {
        if prior.end <= input.period_start || prior.start >= input.period_end {
            continue;
        }
        let overlaps_decoded = input
            .samples
            .iter()
            .any(|s| prior.start < s.end && s.start < prior.end);
        if overlaps_decoded {
            debug!(
                start = %prior.start,
                end = %prior.end,
                "dropping prior sample shadowed by decoded data"
            );
            continue;
        }
        merged.push(prior.clone());
    }

    merged.sort_by_key(|s| s.start);
    check_sample_sequence(&merged)?;
    Ok(merged)
}

/// Warn when the samples cover less than half the declared period.
fn coverage_warnings(input: &AnalysisInput, samples: &[ActivitySample]) -> Vec<Warning> {
    if samples.is_empty() {
        return Vec::new();
    }
    let period_minutes = (input.period_end - input.period_start).num_minutes();
    let covered_minutes: i64 = samples.iter().map(ActivitySample::duration_minutes).sum();
    if period_minutes > 0 && covered_minutes * 2 < period_minutes {
        return vec![Warning {
            kind: WarningKind::IncompleteSampleCoverage,
            detail: format!(
                "samples cover {covered_minutes} of {period_minutes} minutes in the declared period"
            ),
        }];
    }
    Vec::new()
}

/// Deterministic assessment id over every analysis input that can change
/// the outcome.
fn assessment_id(input: &AnalysisInput, samples: &[ActivitySample]) -> AssessmentId {
    let mut parts: Vec<String> = vec![
        "upload".to_string(),
        input.organization_id.to_string(),
        input.driver_id.to_string(),
        input.vehicle_id.to_string(),
        input.file_type.as_str().to_string(),
        input.period_start.to_rfc3339(),
        input.period_end.to_rfc3339(),
        format!("{:.3}", input.max_speed_kmh),
        input.recorder.card_gap_minutes.to_string(),
        format!("{:?}", input.integrity),
    ];
    for sample in samples {
        parts.push(format!(
            "{}|{}|{}",
            sample.start.to_rfc3339(),
            sample.end.to_rfc3339(),
            sample.activity.as_str(),
        ));
    }
    AssessmentId::digest_parts(parts)
}
