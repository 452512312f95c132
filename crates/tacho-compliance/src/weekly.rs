//! Weekly rest aggregation.
//!
//! Rolls daily rest and work figures into one ISO week per driver,
//! classifies the rest (full / reduced / missing), and tracks whether
//! compensation is owed and by when.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tacho_model::{
    ActivitySample, AssessmentId, ComplianceAssessment, DailyRestRecord, DataIntegrity, DriverId,
    OrganizationId, Severity, Violation, ViolationKind, Warning, WarningKind, WeeklyRest,
    WeeklyRestType, iso_week_end, iso_week_start,
};
use tacho_standards::WtdLimits;

use crate::error::{ComplianceError, Result};
use crate::store::{RestStore, StoreError, UpsertOutcome};
use crate::util::format_hhmm;

/// How one week's rest classifies against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyRestClassification {
    Full,
    Reduced,
    Missing,
}

/// Result of the idempotent auto-record operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Created,
    AlreadyRecorded,
    /// Nothing recordable: a missing week raises a violation instead of a
    /// rest row, and a degraded analysis records nothing.
    NothingToRecord,
}

/// One analyzed (driver, ISO week) window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRestAnalysis {
    pub driver_id: DriverId,
    pub organization_id: OrganizationId,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_work_hours: f64,
    pub total_driving_minutes: i64,
    pub total_rest_hours: f64,
    pub rest_periods_count: usize,
    /// `None` when the analysis ran degraded (store unavailable).
    pub classification: Option<WeeklyRestClassification>,
    pub compensation_required: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
    pub degraded: bool,
}

impl WeeklyRestAnalysis {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Express the week as a compliance assessment so weekly violations
    /// flow through the same materializer as upload violations.
    pub fn to_assessment(&self) -> ComplianceAssessment {
        ComplianceAssessment {
            id: AssessmentId::digest_parts([
                "weekly",
                self.organization_id.as_str(),
                self.driver_id.as_str(),
                &self.week_start.to_string(),
            ]),
            violations: self.violations.clone(),
            warnings: self.warnings.clone(),
            driving_time_total_minutes: self.total_driving_minutes,
            rest_periods_count: self.rest_periods_count,
            max_speed_kmh: 0.0,
            data_integrity: DataIntegrity::Intact,
        }
    }

    fn empty_degraded(
        driver_id: DriverId,
        organization_id: OrganizationId,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Self {
        Self {
            driver_id,
            organization_id,
            week_start,
            week_end,
            total_work_hours: 0.0,
            total_driving_minutes: 0,
            total_rest_hours: 0.0,
            rest_periods_count: 0,
            classification: None,
            compensation_required: false,
            violations: Vec::new(),
            warnings: Vec::new(),
            degraded: true,
        }
    }
}

pub struct WeeklyAggregator {
    limits: WtdLimits,
}

impl WeeklyAggregator {
    pub fn new(limits: WtdLimits) -> Self {
        Self { limits }
    }

    /// Analyze one (driver, ISO week) window.
    ///
    /// Never fails the surrounding request: when the store is unavailable
    /// the analysis comes back empty and degraded, with a warning logged.
    pub fn analyze(
        &self,
        store: &dyn RestStore,
        driver_id: &DriverId,
        organization_id: &OrganizationId,
        week_start: NaiveDate,
    ) -> WeeklyRestAnalysis {
        let week_start = iso_week_start(week_start);
        let week_end = iso_week_end(week_start);

        let range_start = week_start.and_time(chrono::NaiveTime::MIN).and_utc();
        let range_end = week_end
            .succ_opt()
            .unwrap_or(week_end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let samples = match store.samples_in_range(driver_id, range_start, range_end) {
            Ok(samples) => samples,
            Err(error) => {
                warn!(driver = %driver_id, %week_start, %error, "rest store unavailable, returning empty weekly analysis");
                return WeeklyRestAnalysis::empty_degraded(
                    driver_id.clone(),
                    organization_id.clone(),
                    week_start,
                    week_end,
                );
            }
        };
        let daily_rest = match store.daily_rest_between(driver_id, week_start, week_end) {
            Ok(rows) => rows,
            Err(error) => {
                warn!(driver = %driver_id, %week_start, %error, "rest store unavailable, returning empty weekly analysis");
                return WeeklyRestAnalysis::empty_degraded(
                    driver_id.clone(),
                    organization_id.clone(),
                    week_start,
                    week_end,
                );
            }
        };

        let total_work_minutes: i64 = samples
            .iter()
            .filter(|s| s.activity.is_work())
            .map(ActivitySample::duration_minutes)
            .sum();
        let total_driving_minutes: i64 = samples
            .iter()
            .filter(|s| s.activity == tacho_model::ActivityType::Driving)
            .map(ActivitySample::duration_minutes)
            .sum();
        let total_work_hours = total_work_minutes as f64 / 60.0;
        let total_rest_hours: f64 = daily_rest.iter().map(|r| r.duration_hours).sum();

        let classification = if total_rest_hours >= self.limits.full_weekly_rest_hours {
            WeeklyRestClassification::Full
        } else if total_rest_hours >= self.limits.reduced_weekly_rest_hours {
            WeeklyRestClassification::Reduced
        } else {
            WeeklyRestClassification::Missing
        };

        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        if classification == WeeklyRestClassification::Missing {
            violations.push(Violation {
                kind: ViolationKind::WeeklyRestMissing,
                detail: format!(
                    "only {total_rest_hours:.1}h of weekly rest recorded, below the {:.0}h reduced minimum",
                    self.limits.reduced_weekly_rest_hours,
                ),
                severity: Severity::Medium,
            });
        }

        if total_work_hours > self.limits.weekly_working_ceiling_hours {
            violations.push(Violation {
                kind: ViolationKind::WorkingTimeExceeded,
                detail: format!(
                    "working time {} exceeds the {:.0}h weekly ceiling",
                    format_hhmm(total_work_minutes),
                    self.limits.weekly_working_ceiling_hours,
                ),
                severity: Severity::Medium,
            });
        } else if total_work_hours > self.limits.weekly_working_warning_hours {
            warnings.push(Warning {
                kind: WarningKind::ApproachingWorkingTimeCeiling,
                detail: format!(
                    "working time {} is approaching the {:.0}h weekly ceiling",
                    format_hhmm(total_work_minutes),
                    self.limits.weekly_working_ceiling_hours,
                ),
            });
        }

        debug!(
            driver = %driver_id,
            %week_start,
            total_rest_hours,
            total_work_hours,
            ?classification,
            "analyzed week"
        );

        WeeklyRestAnalysis {
            driver_id: driver_id.clone(),
            organization_id: organization_id.clone(),
            week_start,
            week_end,
            total_work_hours,
            total_driving_minutes,
            total_rest_hours,
            rest_periods_count: daily_rest.len(),
            classification: Some(classification),
            compensation_required: classification == WeeklyRestClassification::Reduced,
            violations,
            warnings,
            degraded: false,
        }
    }

    /// Record the analyzed week as a [`WeeklyRest`] row, exactly once.
    ///
    /// The store upserts on the (driver, week_start) unique key, so a
    /// concurrent duplicate collapses to `AlreadyRecorded` instead of a
    /// second row.
    pub fn auto_record(
        &self,
        store: &dyn RestStore,
        analysis: &WeeklyRestAnalysis,
    ) -> std::result::Result<RecordOutcome, StoreError> {
        let rest_type = match analysis.classification {
            Some(WeeklyRestClassification::Full) => WeeklyRestType::FullWeeklyRest,
            Some(WeeklyRestClassification::Reduced) => WeeklyRestType::ReducedWeeklyRest,
            Some(WeeklyRestClassification::Missing) | None => {
                return Ok(RecordOutcome::NothingToRecord);
            }
        };

        let row = WeeklyRest {
            driver_id: analysis.driver_id.clone(),
            week_start_date: analysis.week_start,
            week_end_date: analysis.week_end,
            total_rest_hours: analysis.total_rest_hours,
            rest_type,
            compensation_required: analysis.compensation_required,
            compensation_date: None,
        };

        match store.upsert_weekly_rest(&row)? {
            UpsertOutcome::Created => Ok(RecordOutcome::Created),
            UpsertOutcome::AlreadyRecorded => Ok(RecordOutcome::AlreadyRecorded),
        }
    }

    /// Link a compensation date to a reduced week.
    ///
    /// The date must fall within the regulatory window measured from the
    /// end of the reduced week.
    pub fn link_compensation(
        &self,
        store: &dyn RestStore,
        driver_id: &DriverId,
        week_start: NaiveDate,
        date: NaiveDate,
    ) -> Result<()> {
        let week_start = iso_week_start(week_start);
        let existing = store
            .weekly_rest_for(driver_id, week_start)?
            .ok_or_else(|| ComplianceError::WeekNotRecorded {
                driver: driver_id.to_string(),
                week_start,
            })?;

        if existing.rest_type != WeeklyRestType::ReducedWeeklyRest {
            return Err(ComplianceError::NotReducedRest {
                driver: driver_id.to_string(),
                week_start,
            });
        }

        let deadline = existing.compensation_deadline(self.limits.compensation_period_weeks);
        if date > deadline {
            return Err(ComplianceError::CompensationWindowExceeded {
                deadline,
                requested: date,
            });
        }

        store.set_compensation(driver_id, week_start, date)?;
        Ok(())
    }
}

/// Aggregate one calendar day's rest from its samples.
///
/// Returns `None` for a day with no rest or break samples at all, so
/// absent data never turns into a zero-hour row.
pub fn aggregate_daily_rest(
    driver_id: &DriverId,
    organization_id: &OrganizationId,
    rest_date: NaiveDate,
    samples: &[ActivitySample],
) -> Option<DailyRestRecord> {
    let rest_minutes: i64 = samples
        .iter()
        .filter(|s| s.activity.is_rest() && s.start.date_naive() == rest_date)
        .map(ActivitySample::duration_minutes)
        .sum();

    let any_rest = samples
        .iter()
        .any(|s| s.activity.is_rest() && s.start.date_naive() == rest_date);
    if !any_rest {
        return None;
    }

    Some(DailyRestRecord {
        driver_id: driver_id.clone(),
        organization_id: organization_id.clone(),
        rest_date,
        duration_hours: rest_minutes as f64 / 60.0,
    })
}

/// Days covered by a UTC interval, inclusive of the end date's day.
pub fn days_in_period(
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start.date_naive();
    let last = end.date_naive();
    while day <= last {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}
