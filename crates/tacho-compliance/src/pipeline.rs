//! The end-to-end ingest pipeline and the scheduled compliance sweep.
//!
//! Wiring order: validate upload → decode → store artifact → evaluate →
//! persist the tachograph record → materialize infringements
//! (best-effort) → refresh daily/weekly aggregation (best-effort).
//! Format and storage errors surface to the caller; downstream write
//! failures only reduce `infringements_created`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span, warn};

use tacho_ingest::{ArtifactStore, IngestError, TachographDecoder, TachographUpload, artifact_key};
use tacho_model::{ComplianceAssessment, DriverId, OrganizationId, iso_week_start};

use crate::error::ComplianceError;
use crate::evaluator::Evaluator;
use crate::input::{AnalysisInput, PriorContext};
use crate::materialize::materialize;
use crate::store::{
    InfringementSink, RestStore, StoreError, TachographRecord, TachographRecordStore,
};
use crate::weekly::{RecordOutcome, WeeklyAggregator, aggregate_daily_rest, days_in_period};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Response returned to the application boundary for one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub record_id: i64,
    pub analysis_results: ComplianceAssessment,
    pub violations_detected: bool,
    pub infringements_created: usize,
}

/// Summary of one scheduled compliance sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub drivers_processed: usize,
    pub weeks_analyzed: usize,
    pub weekly_rows_created: usize,
    pub infringements_created: usize,
    pub degraded_weeks: usize,
}

/// Wires the engine components against one store.
pub struct Pipeline<'a, S>
where
    S: RestStore + InfringementSink + TachographRecordStore,
{
    evaluator: &'a Evaluator,
    aggregator: &'a WeeklyAggregator,
    decoder: &'a dyn TachographDecoder,
    artifacts: &'a dyn ArtifactStore,
    store: &'a S,
}

impl<'a, S> Pipeline<'a, S>
where
    S: RestStore + InfringementSink + TachographRecordStore,
{
    pub fn new(
        evaluator: &'a Evaluator,
        aggregator: &'a WeeklyAggregator,
        decoder: &'a dyn TachographDecoder,
        artifacts: &'a dyn ArtifactStore,
        store: &'a S,
    ) -> Self {
        Self {
            evaluator,
            aggregator,
            decoder,
            artifacts,
            store,
        }
    }

    /// Process one uploaded tachograph file.
    pub fn ingest(&self, upload: &TachographUpload) -> Result<IngestResponse, PipelineError> {
        let span = info_span!("ingest", vehicle = %upload.vehicle_id, file_type = %upload.file_type);
        let _guard = span.enter();

        // Rejections happen before anything is stored.
        upload.validate()?;
        let decoded = self.decoder.decode(upload)?;

        let driver_id = upload
            .driver_id
            .clone()
            .or_else(|| decoded.samples.first().map(|s| s.driver_id.clone()))
            .ok_or_else(|| IngestError::Decode {
                message: "no driver identity on upload or in decoded samples".to_string(),
            })?;

        // Prior context is best-effort: an unprovisioned store must not
        // block the upload.
        let prior = match self
            .store
            .samples_in_range(&driver_id, upload.period_start, upload.period_end)
        {
            Ok(samples) => PriorContext {
                samples,
                daily_rest: Vec::new(),
            },
            Err(error) => {
                warn!(%error, "could not load prior context, evaluating decoded samples only");
                PriorContext::empty()
            }
        };

        let artifact = self
            .artifacts
            .store(&artifact_key(upload), &upload.file_bytes)?;

        let input = AnalysisInput::from_decoded(upload, driver_id.clone(), &decoded, prior);
        let assessment = self.evaluator.evaluate(&input)?;

        let record_id = self.store.insert_record(&TachographRecord {
            organization_id: upload.organization_id.clone(),
            vehicle_id: upload.vehicle_id.clone(),
            driver_id: Some(driver_id.clone()),
            file_type: upload.file_type,
            artifact_reference: artifact.reference,
            content_sha256: artifact.sha256_hex,
            download_date: upload.download_date,
            period_start: upload.period_start,
            period_end: upload.period_end,
            assessment: assessment.clone(),
        })?;

        let infringements_created = materialize(
            self.store,
            &assessment,
            &driver_id,
            Some(&upload.vehicle_id),
            &upload.organization_id,
            upload.download_date,
        );

        self.refresh_aggregation(upload, &driver_id, &decoded.samples);

        info!(
            record_id,
            violations = assessment.violations_detected(),
            infringements_created,
            "upload processed"
        );

        Ok(IngestResponse {
            record_id,
            violations_detected: assessment.violations_detected() > 0,
            infringements_created,
            analysis_results: assessment,
        })
    }

    /// Best-effort refresh of the daily and weekly aggregates touched by
    /// an upload. Failures are logged, never propagated.
    fn refresh_aggregation(
        &self,
        upload: &TachographUpload,
        driver_id: &DriverId,
        samples: &[tacho_model::ActivitySample],
    ) {
        if let Err(error) = self.store.append_samples(samples) {
            warn!(%error, "could not persist decoded samples");
        }

        let days = days_in_period(upload.period_start, upload.period_end);
        for day in &days {
            if let Some(record) =
                aggregate_daily_rest(driver_id, &upload.organization_id, *day, samples)
                && let Err(error) = self.store.upsert_daily_rest(&record)
            {
                warn!(%error, rest_date = %day, "could not record daily rest");
            }
        }

        let mut weeks: Vec<NaiveDate> = days.iter().map(|d| iso_week_start(*d)).collect();
        weeks.dedup();
        for week_start in weeks {
            let analysis = self.aggregator.analyze(
                self.store,
                driver_id,
                &upload.organization_id,
                week_start,
            );
            if analysis.degraded {
                continue;
            }
            if let Err(error) = self.aggregator.auto_record(self.store, &analysis) {
                warn!(%error, %week_start, "could not auto-record weekly rest");
            }
        }
    }

    /// Periodic compliance sweep across drivers.
    ///
    /// Drivers are independent of each other, but each driver's weeks are
    /// processed strictly in order so the temporal invariants hold.
    /// `detected_at` stamps any infringements raised by the sweep.
    pub fn sweep(
        &self,
        organization_id: &OrganizationId,
        drivers: &[DriverId],
        from_week: NaiveDate,
        weeks: u32,
        detected_at: chrono::DateTime<chrono::Utc>,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        for driver_id in drivers {
            let span = info_span!("sweep_driver", driver = %driver_id);
            let _guard = span.enter();
            report.drivers_processed += 1;

            let mut week_start = iso_week_start(from_week);
            for _ in 0..weeks {
                let analysis =
                    self.aggregator
                        .analyze(self.store, driver_id, organization_id, week_start);
                report.weeks_analyzed += 1;

                if analysis.degraded {
                    report.degraded_weeks += 1;
                } else {
                    match self.aggregator.auto_record(self.store, &analysis) {
                        Ok(RecordOutcome::Created) => report.weekly_rows_created += 1,
                        Ok(_) => {}
                        Err(error) => {
                            warn!(%error, %week_start, "could not auto-record weekly rest");
                        }
                    }

                    if !analysis.violations.is_empty() {
                        let assessment = analysis.to_assessment();
                        report.infringements_created += materialize(
                            self.store,
                            &assessment,
                            driver_id,
                            None,
                            organization_id,
                            detected_at,
                        );
                    }
                }

                let Some(next) = week_start.checked_add_days(chrono::Days::new(7)) else {
                    break;
                };
                week_start = next;
            }
        }

        report
    }
}
