//! Persistence boundary contract.
//!
//! The engine depends on a relational store through these traits; the
//! concrete implementation lives with the surrounding application
//! (`tacho-store` ships the SQLite one). Idempotency is a storage-level
//! guarantee: upserts key on unique constraints, never on a caller-side
//! check-then-insert.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tacho_ingest::TachographFileType;
use tacho_model::{
    ActivitySample, AssessmentId, ComplianceAlert, ComplianceAssessment, DailyRestRecord,
    DriverId, Infringement, InfringementStatus, OrganizationId, VehicleId, ViolationKind,
    WeeklyRest,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store (or a table it needs) is not provisioned. Callers that can
    /// degrade gracefully treat this as "no data".
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Transient contention; retried once at the storage boundary before
    /// being surfaced.
    #[error("store busy: {0}")]
    Busy(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("infringement status cannot move from {from} to {to}")]
    StatusRegression { from: String, to: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    AlreadyRecorded,
}

/// Activity samples plus daily/weekly rest rows for a driver.
pub trait RestStore {
    /// Samples for one driver overlapping `[start, end)`, ordered by start.
    fn samples_in_range(
        &self,
        driver: &DriverId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<ActivitySample>>;

    /// Append-only sample insert; duplicates (same driver and start) are
    /// skipped. Returns the number of rows actually written.
    fn append_samples(&self, samples: &[ActivitySample]) -> StoreResult<usize>;

    fn daily_rest_between(
        &self,
        driver: &DriverId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<DailyRestRecord>>;

    /// Insert a daily rest row; an existing (driver, date) row is kept as-is.
    fn upsert_daily_rest(&self, record: &DailyRestRecord) -> StoreResult<UpsertOutcome>;

    /// Explicit correction of an existing daily rest row.
    fn update_daily_rest(&self, record: &DailyRestRecord) -> StoreResult<()>;

    fn weekly_rest_for(
        &self,
        driver: &DriverId,
        week_start: NaiveDate,
    ) -> StoreResult<Option<WeeklyRest>>;

    /// Transactional upsert keyed on (driver, week_start).
    fn upsert_weekly_rest(&self, rest: &WeeklyRest) -> StoreResult<UpsertOutcome>;

    /// Move a reduced weekly rest to compensated with the given date.
    fn set_compensation(
        &self,
        driver: &DriverId,
        week_start: NaiveDate,
        date: NaiveDate,
    ) -> StoreResult<()>;
}

/// Write side for infringements and alerts.
pub trait InfringementSink {
    /// Insert keyed on (assessment_id, violation_kind); an existing row is
    /// left untouched.
    fn insert_infringement(&self, infringement: &Infringement) -> StoreResult<UpsertOutcome>;

    /// Insert keyed on assessment_id; an existing alert is left untouched.
    fn insert_alert(&self, alert: &ComplianceAlert) -> StoreResult<UpsertOutcome>;

    /// Reviewer operation; only forward transitions are accepted.
    fn update_infringement_status(
        &self,
        assessment_id: &AssessmentId,
        kind: ViolationKind,
        next: InfringementStatus,
    ) -> StoreResult<()>;

    fn infringements_for_driver(&self, driver: &DriverId) -> StoreResult<Vec<Infringement>>;
}

/// One persisted tachograph upload with its analysis results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TachographRecord {
    pub organization_id: OrganizationId,
    pub vehicle_id: VehicleId,
    pub driver_id: Option<DriverId>,
    pub file_type: TachographFileType,
    pub artifact_reference: String,
    pub content_sha256: String,
    pub download_date: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub assessment: ComplianceAssessment,
}

/// Persisted upload records.
pub trait TachographRecordStore {
    /// Insert and return the assigned record id.
    fn insert_record(&self, record: &TachographRecord) -> StoreResult<i64>;

    fn record_count(&self) -> StoreResult<i64>;
}
