//! Shared in-memory store fake for the compliance integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use tacho_compliance::{
    InfringementSink, RestStore, StoreError, StoreResult, TachographRecord,
    TachographRecordStore, UpsertOutcome,
};
use tacho_model::{
    ActivitySample, ActivityType, AssessmentId, ComplianceAlert, DailyRestRecord, DriverId,
    Infringement, InfringementStatus, SampleSource, VehicleId, ViolationKind, WeeklyRest,
    WeeklyRestType,
};

pub fn driver(id: &str) -> DriverId {
    DriverId::new(id).unwrap()
}

pub fn vehicle(id: &str) -> VehicleId {
    VehicleId::new(id).unwrap()
}

pub fn org(id: &str) -> tacho_model::OrganizationId {
    tacho_model::OrganizationId::new(id).unwrap()
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 6, 0, 0).unwrap()
}

pub fn sample(
    driver_id: &DriverId,
    start_min: i64,
    end_min: i64,
    activity: ActivityType,
) -> ActivitySample {
    ActivitySample::new(
        driver_id.clone(),
        vehicle("V-1"),
        base_time() + Duration::minutes(start_min),
        base_time() + Duration::minutes(end_min),
        activity,
        SampleSource::Tachograph,
    )
    .unwrap()
}

#[derive(Default)]
struct Inner {
    samples: Vec<ActivitySample>,
    daily: BTreeMap<(String, NaiveDate), DailyRestRecord>,
    weekly: BTreeMap<(String, NaiveDate), WeeklyRest>,
    infringements: BTreeMap<(String, &'static str), Infringement>,
    alerts: BTreeMap<String, ComplianceAlert>,
    records: Vec<TachographRecord>,
}

/// In-memory implementation of the persistence boundary.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_daily_rest(&self, record: DailyRestRecord) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .daily
            .insert((record.driver_id.to_string(), record.rest_date), record);
    }

    pub fn seed_samples(&self, samples: Vec<ActivitySample>) {
        self.inner.lock().unwrap().samples.extend(samples);
    }

    pub fn infringement_count(&self) -> usize {
        self.inner.lock().unwrap().infringements.len()
    }

    pub fn alert_count(&self) -> usize {
        self.inner.lock().unwrap().alerts.len()
    }

    pub fn alerts(&self) -> Vec<ComplianceAlert> {
        self.inner.lock().unwrap().alerts.values().cloned().collect()
    }

    pub fn weekly_count(&self) -> usize {
        self.inner.lock().unwrap().weekly.len()
    }
}

impl RestStore for MemoryStore {
    fn samples_in_range(
        &self,
        driver: &DriverId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<ActivitySample>> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<ActivitySample> = inner
            .samples
            .iter()
            .filter(|s| &s.driver_id == driver && s.start < end && s.end > start)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.start);
        Ok(out)
    }

    fn append_samples(&self, samples: &[ActivitySample]) -> StoreResult<usize> {
        let mut inner = self.inner.lock().unwrap();
        let mut written = 0;
        for sample in samples {
            let duplicate = inner
                .samples
                .iter()
                .any(|s| s.driver_id == sample.driver_id && s.start == sample.start);
            if !duplicate {
                inner.samples.push(sample.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    fn daily_rest_between(
        &self,
        driver: &DriverId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<DailyRestRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .daily
            .values()
            .filter(|r| &r.driver_id == driver && r.rest_date >= from && r.rest_date <= to)
            .cloned()
            .collect())
    }

    fn upsert_daily_rest(&self, record: &DailyRestRecord) -> StoreResult<UpsertOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let key = (record.driver_id.to_string(), record.rest_date);
        if inner.daily.contains_key(&key) {
            return Ok(UpsertOutcome::AlreadyRecorded);
        }
        inner.daily.insert(key, record.clone());
        Ok(UpsertOutcome::Created)
    }

    fn update_daily_rest(&self, record: &DailyRestRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (record.driver_id.to_string(), record.rest_date);
        if !inner.daily.contains_key(&key) {
            return Err(StoreError::NotFound(format!(
                "daily rest for {} on {}",
                record.driver_id, record.rest_date
            )));
        }
        inner.daily.insert(key, record.clone());
        Ok(())
    }

    fn weekly_rest_for(
        &self,
        driver: &DriverId,
        week_start: NaiveDate,
    ) -> StoreResult<Option<WeeklyRest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .weekly
            .get(&(driver.to_string(), week_start))
            .cloned())
    }

    fn upsert_weekly_rest(&self, rest: &WeeklyRest) -> StoreResult<UpsertOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let key = (rest.driver_id.to_string(), rest.week_start_date);
        if inner.weekly.contains_key(&key) {
            return Ok(UpsertOutcome::AlreadyRecorded);
        }
        inner.weekly.insert(key, rest.clone());
        Ok(UpsertOutcome::Created)
    }

    fn set_compensation(
        &self,
        driver: &DriverId,
        week_start: NaiveDate,
        date: NaiveDate,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (driver.to_string(), week_start);
        let Some(rest) = inner.weekly.get_mut(&key) else {
            return Err(StoreError::NotFound(format!(
                "weekly rest for {driver} starting {week_start}"
            )));
        };
        rest.rest_type = WeeklyRestType::CompensatedRest;
        rest.compensation_date = Some(date);
        Ok(())
    }
}

impl InfringementSink for MemoryStore {
    fn insert_infringement(&self, infringement: &Infringement) -> StoreResult<UpsertOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let key = (
            infringement.assessment_id.to_hex(),
            infringement.violation_kind.as_str(),
        );
        if inner.infringements.contains_key(&key) {
            return Ok(UpsertOutcome::AlreadyRecorded);
        }
        inner.infringements.insert(key, infringement.clone());
        Ok(UpsertOutcome::Created)
    }

    fn insert_alert(&self, alert: &ComplianceAlert) -> StoreResult<UpsertOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let key = alert.assessment_id.to_hex();
        if inner.alerts.contains_key(&key) {
            return Ok(UpsertOutcome::AlreadyRecorded);
        }
        inner.alerts.insert(key, alert.clone());
        Ok(UpsertOutcome::Created)
    }

    fn update_infringement_status(
        &self,
        assessment_id: &AssessmentId,
        kind: ViolationKind,
        next: InfringementStatus,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (assessment_id.to_hex(), kind.as_str());
        let Some(infringement) = inner.infringements.get_mut(&key) else {
            return Err(StoreError::NotFound(format!(
                "infringement {assessment_id}/{kind}"
            )));
        };
        infringement
            .status
            .check_transition(next)
            .map_err(|_| StoreError::StatusRegression {
                from: infringement.status.as_str().to_string(),
                to: next.as_str().to_string(),
            })?;
        infringement.status = next;
        Ok(())
    }

    fn infringements_for_driver(&self, driver: &DriverId) -> StoreResult<Vec<Infringement>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .infringements
            .values()
            .filter(|i| &i.driver_id == driver)
            .cloned()
            .collect())
    }
}

impl TachographRecordStore for MemoryStore {
    fn insert_record(&self, record: &TachographRecord) -> StoreResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.records.push(record.clone());
        Ok(inner.records.len() as i64)
    }

    fn record_count(&self) -> StoreResult<i64> {
        Ok(self.inner.lock().unwrap().records.len() as i64)
    }
}

/// A store whose rest tables are not provisioned.
pub struct UnavailableStore;

impl RestStore for UnavailableStore {
    fn samples_in_range(
        &self,
        _driver: &DriverId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> StoreResult<Vec<ActivitySample>> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn append_samples(&self, _samples: &[ActivitySample]) -> StoreResult<usize> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn daily_rest_between(
        &self,
        _driver: &DriverId,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> StoreResult<Vec<DailyRestRecord>> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn upsert_daily_rest(&self, _record: &DailyRestRecord) -> StoreResult<UpsertOutcome> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn update_daily_rest(&self, _record: &DailyRestRecord) -> StoreResult<()> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn weekly_rest_for(
        &self,
        _driver: &DriverId,
        _week_start: NaiveDate,
    ) -> StoreResult<Option<WeeklyRest>> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn upsert_weekly_rest(&self, _rest: &WeeklyRest) -> StoreResult<UpsertOutcome> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }

    fn set_compensation(
        &self,
        _driver: &DriverId,
        _week_start: NaiveDate,
        _date: NaiveDate,
    ) -> StoreResult<()> {
        Err(StoreError::Unavailable("rest tables missing".to_string()))
    }
}
