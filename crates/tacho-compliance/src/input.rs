//! Evaluator input assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tacho_ingest::{DecodedFile, IntegritySignal, RecorderMetadata, TachographFileType, TachographUpload};
use tacho_model::{ActivitySample, DailyRestRecord, DriverId, OrganizationId, VehicleId};

/// Previously stored activity context for the analysis window.
///
/// Manual clock entries recorded through the application sit here; the
/// evaluator merges them with the decoded samples so a day split between a
/// tachograph download and manual entries is judged as one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorContext {
    pub samples: Vec<ActivitySample>,
    pub daily_rest: Vec<DailyRestRecord>,
}

impl PriorContext {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Everything `evaluate` needs, assembled by the caller. The evaluator
/// itself is a pure function of this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub organization_id: OrganizationId,
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub file_type: TachographFileType,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub samples: Vec<ActivitySample>,
    pub max_speed_kmh: f64,
    pub recorder: RecorderMetadata,
    pub integrity: IntegritySignal,
    pub prior: PriorContext,
}

impl AnalysisInput {
    /// Build an input from an upload and its decoded file.
    pub fn from_decoded(
        upload: &TachographUpload,
        driver_id: DriverId,
        decoded: &DecodedFile,
        prior: PriorContext,
    ) -> Self {
        Self {
            organization_id: upload.organization_id.clone(),
            driver_id,
            vehicle_id: upload.vehicle_id.clone(),
            file_type: upload.file_type,
            period_start: upload.period_start,
            period_end: upload.period_end,
            samples: decoded.samples.clone(),
            max_speed_kmh: decoded.max_speed_kmh,
            recorder: decoded.recorder.clone(),
            integrity: decoded.integrity,
            prior,
        }
    }
}
