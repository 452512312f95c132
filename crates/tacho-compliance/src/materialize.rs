//! Violation-to-infringement materialization.
//!
//! Consumes an assessment exactly once: each violation becomes an
//! infringement row keyed by (assessment_id, violation_kind), so retries
//! and duplicate deliveries collapse at the storage layer. Write failures
//! are logged and swallowed; alerting must never fail the upload that
//! produced the assessment.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tacho_model::{
    ComplianceAlert, ComplianceAssessment, DriverId, Infringement, InfringementStatus,
    OrganizationId, VehicleId,
};

use crate::store::{InfringementSink, UpsertOutcome};

/// Materialize an assessment's violations into infringement rows.
///
/// Returns the count of infringements actually created by this call;
/// rows that already existed are skipped. `detected_at` is supplied by
/// the caller so the engine itself stays clock-free.
pub fn materialize(
    sink: &dyn InfringementSink,
    assessment: &ComplianceAssessment,
    driver_id: &DriverId,
    vehicle_id: Option<&VehicleId>,
    organization_id: &OrganizationId,
    detected_at: DateTime<Utc>,
) -> usize {
    let mut created = 0usize;

    for violation in &assessment.violations {
        let infringement = Infringement {
            assessment_id: assessment.id,
            violation_kind: violation.kind,
            driver_id: driver_id.clone(),
            vehicle_id: vehicle_id.cloned(),
            organization_id: organization_id.clone(),
            detail: violation.detail.clone(),
            severity: violation.severity,
            status: InfringementStatus::Open,
            detected_at,
        };

        match sink.insert_infringement(&infringement) {
            Ok(UpsertOutcome::Created) => created += 1,
            Ok(UpsertOutcome::AlreadyRecorded) => {
                debug!(
                    assessment = %assessment.id,
                    kind = %violation.kind,
                    "infringement already recorded, skipping"
                );
            }
            Err(error) => {
                warn!(
                    assessment = %assessment.id,
                    kind = %violation.kind,
                    %error,
                    "failed to create infringement, continuing"
                );
            }
        }
    }

    if assessment.violations_detected() > 0 {
        let alert = ComplianceAlert {
            assessment_id: assessment.id,
            organization_id: organization_id.clone(),
            severity: assessment.overall_severity(),
            description: format!(
                "{} violation(s) detected for driver {driver_id}; {created} infringement record(s) created",
                assessment.violations_detected(),
            ),
            created_at: detected_at,
        };
        if let Err(error) = sink.insert_alert(&alert) {
            warn!(assessment = %assessment.id, %error, "failed to create compliance alert");
        }
    }

    created
}
