//! Persisted infringement and alert records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{Severity, ViolationKind};
use crate::error::{ModelError, Result};
use crate::ids::{AssessmentId, DriverId, OrganizationId, VehicleId};

/// Review lifecycle of an infringement. Transitions only move forward and
/// only through an explicit reviewer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfringementStatus {
    Open,
    Reviewed,
    Resolved,
}

impl InfringementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfringementStatus::Open => "open",
            InfringementStatus::Reviewed => "reviewed",
            InfringementStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(InfringementStatus::Open),
            "reviewed" => Some(InfringementStatus::Reviewed),
            "resolved" => Some(InfringementStatus::Resolved),
            _ => None,
        }
    }

    /// Check that `next` is a forward move from `self`.
    pub fn check_transition(self, next: InfringementStatus) -> Result<()> {
        if next <= self {
            return Err(ModelError::StatusRegression {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// One persisted record of a detected violation, keyed by
/// `(assessment_id, violation_kind)` so re-running an analysis never
/// duplicates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infringement {
    pub assessment_id: AssessmentId,
    pub violation_kind: ViolationKind,
    pub driver_id: DriverId,
    /// Absent for violations not tied to a single vehicle (weekly windows).
    pub vehicle_id: Option<VehicleId>,
    pub organization_id: OrganizationId,
    pub detail: String,
    pub severity: Severity,
    pub status: InfringementStatus,
    pub detected_at: DateTime<Utc>,
}

/// One alert summarizing a batch of infringements from a single assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAlert {
    pub assessment_id: AssessmentId,
    pub organization_id: OrganizationId,
    pub severity: Severity,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_forward_only() {
        use InfringementStatus::{Open, Resolved, Reviewed};

        assert!(Open.check_transition(Reviewed).is_ok());
        assert!(Open.check_transition(Resolved).is_ok());
        assert!(Reviewed.check_transition(Resolved).is_ok());

        assert!(Reviewed.check_transition(Open).is_err());
        assert!(Resolved.check_transition(Reviewed).is_err());
        assert!(Open.check_transition(Open).is_err());
    }
}
