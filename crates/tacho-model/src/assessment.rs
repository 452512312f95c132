//! Compliance assessments produced by the rule evaluator.

use serde::{Deserialize, Serialize};

use crate::ids::AssessmentId;

/// Severity attached to a violation or alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

/// Integrity of the decoded data an assessment was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataIntegrity {
    Intact,
    Suspicious,
    Corrupted,
}

impl DataIntegrity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataIntegrity::Intact => "intact",
            DataIntegrity::Suspicious => "suspicious",
            DataIntegrity::Corrupted => "corrupted",
        }
    }
}

/// The regulatory rule a violation was raised under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DrivingTimeViolation,
    RestPeriodViolation,
    SpeedViolation,
    CardInsertionViolation,
    ManipulationDetected,
    WeeklyRestMissing,
    WorkingTimeExceeded,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::DrivingTimeViolation => "driving_time_violation",
            ViolationKind::RestPeriodViolation => "rest_period_violation",
            ViolationKind::SpeedViolation => "speed_violation",
            ViolationKind::CardInsertionViolation => "card_insertion_violation",
            ViolationKind::ManipulationDetected => "manipulation_detected",
            ViolationKind::WeeklyRestMissing => "weekly_rest_missing",
            ViolationKind::WorkingTimeExceeded => "working_time_exceeded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "driving_time_violation" => Some(ViolationKind::DrivingTimeViolation),
            "rest_period_violation" => Some(ViolationKind::RestPeriodViolation),
            "speed_violation" => Some(ViolationKind::SpeedViolation),
            "card_insertion_violation" => Some(ViolationKind::CardInsertionViolation),
            "manipulation_detected" => Some(ViolationKind::ManipulationDetected),
            "weekly_rest_missing" => Some(ViolationKind::WeeklyRestMissing),
            "working_time_exceeded" => Some(ViolationKind::WorkingTimeExceeded),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected regulatory violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub detail: String,
    pub severity: Severity,
}

/// Non-violation findings worth surfacing to a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    ApproachingWorkingTimeCeiling,
    IncompleteSampleCoverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub detail: String,
}

/// The evaluator's output for one analysis unit (one upload or one
/// day/week window).
///
/// A value object: never mutated after creation, consumed exactly once by
/// the materializer. An assessment with an empty violation list and intact
/// data is the compliant case, not an "unevaluated" one; evaluation
/// failures are errors, never empty assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub id: AssessmentId,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
    pub driving_time_total_minutes: i64,
    pub rest_periods_count: usize,
    pub max_speed_kmh: f64,
    pub data_integrity: DataIntegrity,
}

impl ComplianceAssessment {
    pub fn violations_detected(&self) -> usize {
        self.violations.len()
    }

    /// High when more than 2 violations are present, otherwise medium.
    pub fn overall_severity(&self) -> Severity {
        if self.violations.len() > 2 {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}
