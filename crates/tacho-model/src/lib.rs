pub mod activity;
pub mod assessment;
pub mod error;
pub mod ids;
pub mod infringement;
pub mod rest;

pub use activity::{
    ActivitySample, ActivityType, SampleSource, check_sample_sequence, sort_and_check,
};
pub use assessment::{
    ComplianceAssessment, DataIntegrity, Severity, Violation, ViolationKind, Warning, WarningKind,
};
pub use error::{ModelError, Result};
pub use ids::{AssessmentId, DriverId, OrganizationId, VehicleId};
pub use infringement::{ComplianceAlert, Infringement, InfringementStatus};
pub use rest::{
    DailyRestRecord, WeeklyRest, WeeklyRestType, iso_week_end, iso_week_start,
};
