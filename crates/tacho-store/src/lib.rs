#![deny(unsafe_code)]

//! SQLite-backed persistence for the compliance engine.
//!
//! Implements the `tacho-compliance` store traits over a single SQLite
//! database in WAL mode. Upserts rely on the schema's UNIQUE constraints
//! with `ON CONFLICT DO NOTHING`, which closes the duplicate-row race
//! under concurrent uploads. Transient busy errors are retried once at
//! this boundary before being surfaced.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

use tacho_compliance::{
    InfringementSink, RestStore, StoreError, StoreResult, TachographRecord,
    TachographRecordStore, UpsertOutcome,
};
use tacho_ingest::TachographFileType;
use tacho_model::{
    ActivitySample, ActivityType, AssessmentId, ComplianceAlert, ComplianceAssessment,
    DailyRestRecord, DriverId, Infringement, InfringementStatus, OrganizationId, SampleSource,
    Severity, VehicleId, ViolationKind, WeeklyRest, WeeklyRestType,
};

/// SQLite store for tachograph records, rest rows, and infringements.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("could not create {}: {e}", parent.display())))?;
        }

        debug!("opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(map_sqlite)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(map_sqlite)?;
        migrations::initialize_schema(&conn)?;

        info!("database ready at {}", path.display());
        Ok(Self { path, conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite)?;
        migrations::initialize_schema(&conn)?;
        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Retry a storage operation once when the database reports contention.
fn busy_retry<T>(mut op: impl FnMut() -> StoreResult<T>) -> StoreResult<T> {
    match op() {
        Err(StoreError::Busy(message)) => {
            warn!(%message, "database busy, retrying once");
            op()
        }
        other => other,
    }
}

fn map_sqlite(error: rusqlite::Error) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(ffi, message) => match ffi.code {
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                StoreError::Busy(error.to_string())
            }
            _ => {
                let text = message.clone().unwrap_or_else(|| error.to_string());
                if text.contains("no such table") {
                    StoreError::Unavailable(text)
                } else {
                    StoreError::Backend(text)
                }
            }
        },
        _ => StoreError::Backend(error.to_string()),
    }
}

fn corrupt(what: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("corrupt row: invalid {what} {value:?}"))
}

fn parse_utc(value: &str, what: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt(what, value))
}

fn parse_date(value: &str, what: &str) -> StoreResult<NaiveDate> {
    value.parse().map_err(|_| corrupt(what, value))
}

fn sample_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String, String, String, String)> {
    Ok((
        row.get("driver_id")?,
        row.get("vehicle_id")?,
        row.get("start_time")?,
        row.get("end_time")?,
        row.get("activity")?,
        row.get("source")?,
    ))
}

fn build_sample(
    (driver, vehicle, start, end, activity, source): (String, String, String, String, String, String),
) -> StoreResult<ActivitySample> {
    ActivitySample::new(
        DriverId::new(driver).map_err(|e| StoreError::Backend(e.to_string()))?,
        VehicleId::new(vehicle).map_err(|e| StoreError::Backend(e.to_string()))?,
        parse_utc(&start, "start_time")?,
        parse_utc(&end, "end_time")?,
        ActivityType::parse(&activity).ok_or_else(|| corrupt("activity", &activity))?,
        SampleSource::parse(&source).ok_or_else(|| corrupt("source", &source))?,
    )
    .map_err(|e| StoreError::Backend(e.to_string()))
}

impl RestStore for SqliteStore {
    fn samples_in_range(
        &self,
        driver: &DriverId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<ActivitySample>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT driver_id, vehicle_id, start_time, end_time, activity, source
                 FROM activity_samples
                 WHERE driver_id = ?1 AND start_time < ?2 AND end_time > ?3
                 ORDER BY start_time ASC",
            )
            .map_err(map_sqlite)?;

        let rows = stmt
            .query_map(
                params![driver.as_str(), end.to_rfc3339(), start.to_rfc3339()],
                sample_from_row,
            )
            .map_err(map_sqlite)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(build_sample(row.map_err(map_sqlite)?)?);
        }
        Ok(out)
    }

    fn append_samples(&self, samples: &[ActivitySample]) -> StoreResult<usize> {
        busy_retry(|| {
            let mut written = 0;
            for sample in samples {
                let changed = self
                    .conn
                    .execute(
                        "INSERT INTO activity_samples
                             (driver_id, vehicle_id, start_time, end_time, activity, source)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT (driver_id, start_time) DO NOTHING",
                        params![
                            sample.driver_id.as_str(),
                            sample.vehicle_id.as_str(),
                            sample.start.to_rfc3339(),
                            sample.end.to_rfc3339(),
                            sample.activity.as_str(),
                            sample.source.as_str(),
                        ],
                    )
                    .map_err(map_sqlite)?;
                written += changed;
            }
            Ok(written)
        })
    }

    fn daily_rest_between(
        &self,
        driver: &DriverId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<DailyRestRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT driver_id, organization_id, rest_date, duration_hours
                 FROM daily_rest
                 WHERE driver_id = ?1 AND rest_date >= ?2 AND rest_date <= ?3
                 ORDER BY rest_date ASC",
            )
            .map_err(map_sqlite)?;

        let rows = stmt
            .query_map(
                params![driver.as_str(), from.to_string(), to.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("driver_id")?,
                        row.get::<_, String>("organization_id")?,
                        row.get::<_, String>("rest_date")?,
                        row.get::<_, f64>("duration_hours")?,
                    ))
                },
            )
            .map_err(map_sqlite)?;

        let mut out = Vec::new();
        for row in rows {
            let (driver, organization, rest_date, duration_hours) = row.map_err(map_sqlite)?;
            out.push(DailyRestRecord {
                driver_id: DriverId::new(driver)
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
                organization_id: OrganizationId::new(organization)
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
                rest_date: parse_date(&rest_date, "rest_date")?,
                duration_hours,
            });
        }
        Ok(out)
    }

    fn upsert_daily_rest(&self, record: &DailyRestRecord) -> StoreResult<UpsertOutcome> {
        busy_retry(|| {
            let changed = self
                .conn
                .execute(
                    "INSERT INTO daily_rest (driver_id, organization_id, rest_date, duration_hours)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (driver_id, rest_date) DO NOTHING",
                    params![
                        record.driver_id.as_str(),
                        record.organization_id.as_str(),
                        record.rest_date.to_string(),
                        record.duration_hours,
                    ],
                )
                .map_err(map_sqlite)?;
            Ok(if changed > 0 {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::AlreadyRecorded
            })
        })
    }

    fn update_daily_rest(&self, record: &DailyRestRecord) -> StoreResult<()> {
        busy_retry(|| {
            let changed = self
                .conn
                .execute(
                    "UPDATE daily_rest SET duration_hours = ?1, organization_id = ?2
                     WHERE driver_id = ?3 AND rest_date = ?4",
                    params![
                        record.duration_hours,
                        record.organization_id.as_str(),
                        record.driver_id.as_str(),
                        record.rest_date.to_string(),
                    ],
                )
                .map_err(map_sqlite)?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!(
                    "daily rest for {} on {}",
                    record.driver_id, record.rest_date
                )));
            }
            Ok(())
        })
    }

    fn weekly_rest_for(
        &self,
        driver: &DriverId,
        week_start: NaiveDate,
    ) -> StoreResult<Option<WeeklyRest>> {
        let row = self
            .conn
            .query_row(
                "SELECT driver_id, week_start_date, week_end_date, total_rest_hours,
                        rest_type, compensation_required, compensation_date
                 FROM weekly_rest
                 WHERE driver_id = ?1 AND week_start_date = ?2",
                params![driver.as_str(), week_start.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("driver_id")?,
                        row.get::<_, String>("week_start_date")?,
                        row.get::<_, String>("week_end_date")?,
                        row.get::<_, f64>("total_rest_hours")?,
                        row.get::<_, String>("rest_type")?,
                        row.get::<_, i64>("compensation_required")?,
                        row.get::<_, Option<String>>("compensation_date")?,
                    ))
                },
            )
            .optional()
            .map_err(map_sqlite)?;

        let Some((driver, start, end, total, rest_type, required, comp_date)) = row else {
            return Ok(None);
        };

        Ok(Some(WeeklyRest {
            driver_id: DriverId::new(driver).map_err(|e| StoreError::Backend(e.to_string()))?,
            week_start_date: parse_date(&start, "week_start_date")?,
            week_end_date: parse_date(&end, "week_end_date")?,
            total_rest_hours: total,
            rest_type: WeeklyRestType::parse(&rest_type)
                .ok_or_else(|| corrupt("rest_type", &rest_type))?,
            compensation_required: required != 0,
            compensation_date: comp_date
                .map(|d| parse_date(&d, "compensation_date"))
                .transpose()?,
        }))
    }

    fn upsert_weekly_rest(&self, rest: &WeeklyRest) -> StoreResult<UpsertOutcome> {
        busy_retry(|| {
            let changed = self
                .conn
                .execute(
                    "INSERT INTO weekly_rest
                         (driver_id, week_start_date, week_end_date, total_rest_hours,
                          rest_type, compensation_required, compensation_date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT (driver_id, week_start_date) DO NOTHING",
                    params![
                        rest.driver_id.as_str(),
                        rest.week_start_date.to_string(),
                        rest.week_end_date.to_string(),
                        rest.total_rest_hours,
                        rest.rest_type.as_str(),
                        i64::from(rest.compensation_required),
                        rest.compensation_date.map(|d| d.to_string()),
                    ],
                )
                .map_err(map_sqlite)?;
            Ok(if changed > 0 {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::AlreadyRecorded
            })
        })
    }

    fn set_compensation(
        &self,
        driver: &DriverId,
        week_start: NaiveDate,
        date: NaiveDate,
    ) -> StoreResult<()> {
        busy_retry(|| {
            let changed = self
                .conn
                .execute(
                    "UPDATE weekly_rest
                     SET rest_type = ?1, compensation_date = ?2
                     WHERE driver_id = ?3 AND week_start_date = ?4",
                    params![
                        WeeklyRestType::CompensatedRest.as_str(),
                        date.to_string(),
                        driver.as_str(),
                        week_start.to_string(),
                    ],
                )
                .map_err(map_sqlite)?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!(
                    "weekly rest for {driver} starting {week_start}"
                )));
            }
            Ok(())
        })
    }
}

impl InfringementSink for SqliteStore {
    fn insert_infringement(&self, infringement: &Infringement) -> StoreResult<UpsertOutcome> {
        busy_retry(|| {
            let changed = self
                .conn
                .execute(
                    "INSERT INTO infringements
                         (assessment_id, violation_kind, driver_id, vehicle_id,
                          organization_id, detail, severity, status, detected_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT (assessment_id, violation_kind) DO NOTHING",
                    params![
                        infringement.assessment_id.to_hex(),
                        infringement.violation_kind.as_str(),
                        infringement.driver_id.as_str(),
                        infringement.vehicle_id.as_ref().map(VehicleId::as_str),
                        infringement.organization_id.as_str(),
                        infringement.detail,
                        infringement.severity.as_str(),
                        infringement.status.as_str(),
                        infringement.detected_at.to_rfc3339(),
                    ],
                )
                .map_err(map_sqlite)?;
            Ok(if changed > 0 {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::AlreadyRecorded
            })
        })
    }

    fn insert_alert(&self, alert: &ComplianceAlert) -> StoreResult<UpsertOutcome> {
        busy_retry(|| {
            let changed = self
                .conn
                .execute(
                    "INSERT INTO compliance_alerts
                         (assessment_id, organization_id, severity, description, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (assessment_id) DO NOTHING",
                    params![
                        alert.assessment_id.to_hex(),
                        alert.organization_id.as_str(),
                        alert.severity.as_str(),
                        alert.description,
                        alert.created_at.to_rfc3339(),
                    ],
                )
                .map_err(map_sqlite)?;
            Ok(if changed > 0 {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::AlreadyRecorded
            })
        })
    }

    fn update_infringement_status(
        &self,
        assessment_id: &AssessmentId,
        kind: ViolationKind,
        next: InfringementStatus,
    ) -> StoreResult<()> {
        busy_retry(|| {
            // Read-check-write under one transaction so two reviewers
            // cannot interleave.
            let tx = self
                .conn
                .unchecked_transaction()
                .map_err(map_sqlite)?;

            let current: Option<String> = tx
                .query_row(
                    "SELECT status FROM infringements
                     WHERE assessment_id = ?1 AND violation_kind = ?2",
                    params![assessment_id.to_hex(), kind.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sqlite)?;

            let Some(current) = current else {
                return Err(StoreError::NotFound(format!(
                    "infringement {assessment_id}/{kind}"
                )));
            };
            let current = InfringementStatus::parse(&current)
                .ok_or_else(|| corrupt("status", &current))?;

            current
                .check_transition(next)
                .map_err(|_| StoreError::StatusRegression {
                    from: current.as_str().to_string(),
                    to: next.as_str().to_string(),
                })?;

            tx.execute(
                "UPDATE infringements SET status = ?1
                 WHERE assessment_id = ?2 AND violation_kind = ?3",
                params![next.as_str(), assessment_id.to_hex(), kind.as_str()],
            )
            .map_err(map_sqlite)?;

            tx.commit().map_err(map_sqlite)
        })
    }

    fn infringements_for_driver(&self, driver: &DriverId) -> StoreResult<Vec<Infringement>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT assessment_id, violation_kind, driver_id, vehicle_id,
                        organization_id, detail, severity, status, detected_at
                 FROM infringements
                 WHERE driver_id = ?1
                 ORDER BY detected_at ASC, violation_kind ASC",
            )
            .map_err(map_sqlite)?;

        let rows = stmt
            .query_map(params![driver.as_str()], |row| {
                Ok((
                    row.get::<_, String>("assessment_id")?,
                    row.get::<_, String>("violation_kind")?,
                    row.get::<_, String>("driver_id")?,
                    row.get::<_, Option<String>>("vehicle_id")?,
                    row.get::<_, String>("organization_id")?,
                    row.get::<_, String>("detail")?,
                    row.get::<_, String>("severity")?,
                    row.get::<_, String>("status")?,
                    row.get::<_, String>("detected_at")?,
                ))
            })
            .map_err(map_sqlite)?;

        let mut out = Vec::new();
        for row in rows {
            let (assessment, kind, driver, vehicle, organization, detail, severity, status, detected) =
                row.map_err(map_sqlite)?;
            out.push(Infringement {
                assessment_id: AssessmentId::from_hex(&assessment)
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
                violation_kind: ViolationKind::parse(&kind)
                    .ok_or_else(|| corrupt("violation_kind", &kind))?,
                driver_id: DriverId::new(driver)
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
                vehicle_id: vehicle
                    .map(|v| VehicleId::new(v).map_err(|e| StoreError::Backend(e.to_string())))
                    .transpose()?,
                organization_id: OrganizationId::new(organization)
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
                detail,
                severity: Severity::parse(&severity)
                    .ok_or_else(|| corrupt("severity", &severity))?,
                status: InfringementStatus::parse(&status)
                    .ok_or_else(|| corrupt("status", &status))?,
                detected_at: parse_utc(&detected, "detected_at")?,
            });
        }
        Ok(out)
    }
}

impl TachographRecordStore for SqliteStore {
    fn insert_record(&self, record: &TachographRecord) -> StoreResult<i64> {
        busy_retry(|| {
            let assessment_json = serde_json::to_string(&record.assessment)
                .map_err(|e| StoreError::Backend(format!("could not serialize assessment: {e}")))?;

            self.conn
                .execute(
                    "INSERT INTO tachograph_records
                         (organization_id, vehicle_id, driver_id, file_type,
                          artifact_reference, content_sha256, download_date,
                          period_start, period_end, assessment_json)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        record.organization_id.as_str(),
                        record.vehicle_id.as_str(),
                        record.driver_id.as_ref().map(DriverId::as_str),
                        record.file_type.as_str(),
                        record.artifact_reference,
                        record.content_sha256,
                        record.download_date.to_rfc3339(),
                        record.period_start.to_rfc3339(),
                        record.period_end.to_rfc3339(),
                        assessment_json,
                    ],
                )
                .map_err(map_sqlite)?;

            Ok(self.conn.last_insert_rowid())
        })
    }

    fn record_count(&self) -> StoreResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM tachograph_records", [], |row| row.get(0))
            .map_err(map_sqlite)
    }
}

impl SqliteStore {
    /// Load one stored record's assessment back, by record id.
    pub fn assessment_for_record(&self, record_id: i64) -> StoreResult<Option<ComplianceAssessment>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT assessment_json FROM tachograph_records WHERE id = ?1",
                params![record_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sqlite)?;

        json.map(|text| {
            serde_json::from_str(&text)
                .map_err(|e| StoreError::Backend(format!("corrupt assessment json: {e}")))
        })
        .transpose()
    }

    /// File type of one stored record, mostly for reporting.
    pub fn record_file_type(&self, record_id: i64) -> StoreResult<Option<TachographFileType>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT file_type FROM tachograph_records WHERE id = ?1",
                params![record_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sqlite)?;

        text.map(|t| TachographFileType::parse(&t).map_err(|_| corrupt("file_type", &t)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tacho_model::{DataIntegrity, Violation};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("open in-memory store")
    }

    fn driver() -> DriverId {
        DriverId::new("D-1").unwrap()
    }

    fn sample(start_min: i64, end_min: i64, activity: ActivityType) -> ActivitySample {
        let base = Utc.with_ymd_and_hms(2025, 3, 3, 6, 0, 0).unwrap();
        ActivitySample::new(
            driver(),
            VehicleId::new("V-1").unwrap(),
            base + Duration::minutes(start_min),
            base + Duration::minutes(end_min),
            activity,
            SampleSource::Tachograph,
        )
        .unwrap()
    }

    fn infringement(kind: ViolationKind) -> Infringement {
        Infringement {
            assessment_id: AssessmentId::digest_parts(["store-test"]),
            violation_kind: kind,
            driver_id: driver(),
            vehicle_id: Some(VehicleId::new("V-1").unwrap()),
            organization_id: OrganizationId::new("org-1").unwrap(),
            detail: "test detail".to_string(),
            severity: Severity::Medium,
            status: InfringementStatus::Open,
            detected_at: Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn append_samples_skips_duplicates() {
        let store = store();
        let samples = vec![sample(0, 60, ActivityType::Driving)];

        assert_eq!(store.append_samples(&samples).unwrap(), 1);
        assert_eq!(store.append_samples(&samples).unwrap(), 0);

        let base = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let loaded = store
            .samples_in_range(&driver(), base, base + Duration::days(1))
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].activity, ActivityType::Driving);
    }

    #[test]
    fn weekly_rest_upsert_is_idempotent() {
        let store = store();
        let rest = WeeklyRest {
            driver_id: driver(),
            week_start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            week_end_date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            total_rest_hours: 30.0,
            rest_type: WeeklyRestType::ReducedWeeklyRest,
            compensation_required: true,
            compensation_date: None,
        };

        assert_eq!(
            store.upsert_weekly_rest(&rest).unwrap(),
            UpsertOutcome::Created
        );
        assert_eq!(
            store.upsert_weekly_rest(&rest).unwrap(),
            UpsertOutcome::AlreadyRecorded
        );

        let loaded = store
            .weekly_rest_for(&driver(), rest.week_start_date)
            .unwrap()
            .unwrap();
        assert_eq!(loaded, rest);
    }

    #[test]
    fn set_compensation_updates_the_row() {
        let store = store();
        let rest = WeeklyRest {
            driver_id: driver(),
            week_start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            week_end_date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            total_rest_hours: 30.0,
            rest_type: WeeklyRestType::ReducedWeeklyRest,
            compensation_required: true,
            compensation_date: None,
        };
        store.upsert_weekly_rest(&rest).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        store
            .set_compensation(&driver(), rest.week_start_date, date)
            .unwrap();

        let loaded = store
            .weekly_rest_for(&driver(), rest.week_start_date)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.rest_type, WeeklyRestType::CompensatedRest);
        assert_eq!(loaded.compensation_date, Some(date));
    }

    #[test]
    fn infringement_insert_is_idempotent() {
        let store = store();
        let row = infringement(ViolationKind::DrivingTimeViolation);

        assert_eq!(
            store.insert_infringement(&row).unwrap(),
            UpsertOutcome::Created
        );
        assert_eq!(
            store.insert_infringement(&row).unwrap(),
            UpsertOutcome::AlreadyRecorded
        );

        let loaded = store.infringements_for_driver(&driver()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], row);
    }

    #[test]
    fn alert_insert_is_idempotent() {
        let store = store();
        let alert = ComplianceAlert {
            assessment_id: AssessmentId::digest_parts(["alert-test"]),
            organization_id: OrganizationId::new("org-1").unwrap(),
            severity: Severity::High,
            description: "3 violation(s) detected".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap(),
        };

        assert_eq!(store.insert_alert(&alert).unwrap(), UpsertOutcome::Created);
        assert_eq!(
            store.insert_alert(&alert).unwrap(),
            UpsertOutcome::AlreadyRecorded
        );
    }

    #[test]
    fn status_updates_enforce_forward_transitions() {
        let store = store();
        let row = infringement(ViolationKind::SpeedViolation);
        store.insert_infringement(&row).unwrap();

        store
            .update_infringement_status(
                &row.assessment_id,
                ViolationKind::SpeedViolation,
                InfringementStatus::Reviewed,
            )
            .unwrap();

        let err = store
            .update_infringement_status(
                &row.assessment_id,
                ViolationKind::SpeedViolation,
                InfringementStatus::Open,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::StatusRegression { .. }));

        let loaded = store.infringements_for_driver(&driver()).unwrap();
        assert_eq!(loaded[0].status, InfringementStatus::Reviewed);
    }

    #[test]
    fn record_round_trips_with_its_assessment() {
        let store = store();
        let assessment = ComplianceAssessment {
            id: AssessmentId::digest_parts(["record-test"]),
            violations: vec![Violation {
                kind: ViolationKind::DrivingTimeViolation,
                detail: "driving time 10h00m exceeds the daily limit of 9h00m".to_string(),
                severity: Severity::Medium,
            }],
            warnings: vec![],
            driving_time_total_minutes: 600,
            rest_periods_count: 0,
            max_speed_kmh: 82.0,
            data_integrity: DataIntegrity::Intact,
        };
        let record = TachographRecord {
            organization_id: OrganizationId::new("org-1").unwrap(),
            vehicle_id: VehicleId::new("V-1").unwrap(),
            driver_id: Some(driver()),
            file_type: TachographFileType::V2b,
            artifact_reference: "/artifacts/org-1/V-1/x.v2b".to_string(),
            content_sha256: "ab".repeat(32),
            download_date: Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap(),
            period_start: Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
            period_end: Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap(),
            assessment: assessment.clone(),
        };

        let id = store.insert_record(&record).unwrap();
        assert_eq!(store.record_count().unwrap(), 1);
        assert_eq!(store.assessment_for_record(id).unwrap(), Some(assessment));
        assert_eq!(
            store.record_file_type(id).unwrap(),
            Some(TachographFileType::V2b)
        );
    }

    #[test]
    fn unprovisioned_database_reports_unavailable() {
        // A raw connection without the schema stands in for a store that
        // has not been provisioned yet.
        let store = SqliteStore {
            path: PathBuf::from(":memory:"),
            conn: Connection::open_in_memory().unwrap(),
        };

        let base = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let err = store
            .samples_in_range(&driver(), base, base + Duration::days(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn update_missing_daily_rest_is_not_found() {
        let store = store();
        let record = DailyRestRecord {
            driver_id: driver(),
            organization_id: OrganizationId::new("org-1").unwrap(),
            rest_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            duration_hours: 11.0,
        };
        let err = store.update_daily_rest(&record).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        store.upsert_daily_rest(&record).unwrap();
        let mut corrected = record.clone();
        corrected.duration_hours = 10.0;
        store.update_daily_rest(&corrected).unwrap();

        let rows = store
            .daily_rest_between(&driver(), record.rest_date, record.rest_date)
            .unwrap();
        assert_eq!(rows[0].duration_hours, 10.0);
    }
}
