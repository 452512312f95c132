//! Decoder contract and the normalized CSV interchange decoder.
//!
//! Byte-level decoding of device formats (DDD/ESM and friends) lives behind
//! the [`TachographDecoder`] trait; the engine only consumes its normalized
//! output. The built-in [`CsvActivityDecoder`] reads the CSV interchange
//! form used for manual clock data and fixtures: one row per activity
//! sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tacho_model::{ActivitySample, ActivityType, DriverId, SampleSource, sort_and_check};

use crate::error::{IngestError, Result};
use crate::format::Generation;
use crate::upload::TachographUpload;

/// Speeds above this are treated as implausible recorder output.
pub const IMPLAUSIBLE_SPEED_KMH: f64 = 200.0;

/// Decoder-level integrity verdict on the raw data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegritySignal {
    Plausible,
    Suspicious,
}

/// Facts about the recorder extracted during decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderMetadata {
    pub generation: Generation,
    pub software_version: Option<String>,
    /// Minutes of driving with no driver card present. Only meaningful for
    /// recorders that support card events.
    pub card_gap_minutes: i64,
}

/// Normalized output of a decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedFile {
    pub samples: Vec<ActivitySample>,
    pub max_speed_kmh: f64,
    pub recorder: RecorderMetadata,
    pub integrity: IntegritySignal,
}

/// Turns an upload's raw bytes into normalized samples.
pub trait TachographDecoder {
    fn decode(&self, upload: &TachographUpload) -> Result<DecodedFile>;
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    start: String,
    end: String,
    activity: String,
    source: Option<String>,
    speed_kmh: Option<f64>,
    card_present: Option<bool>,
}

/// Decoder for the normalized CSV interchange form.
///
/// Expected header: `start,end,activity[,source][,speed_kmh][,card_present]`
/// with RFC 3339 timestamps. Rows inherit driver and vehicle identity from
/// the upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvActivityDecoder;

impl CsvActivityDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl TachographDecoder for CsvActivityDecoder {
    fn decode(&self, upload: &TachographUpload) -> Result<DecodedFile> {
        let driver_id = upload
            .driver_id
            .clone()
            .ok_or_else(|| IngestError::Decode {
                message: "upload carries no driver identity".to_string(),
            })?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(upload.file_bytes.as_slice());

        let mut samples = Vec::new();
        let mut max_speed_kmh = 0.0f64;
        let mut card_gap_minutes = 0i64;
        let mut suspicious = false;

        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            let record = index + 1;
            let row = row.map_err(|e| IngestError::Csv {
                record,
                message: e.to_string(),
            })?;

            let start = parse_timestamp(&row.start, record)?;
            let end = parse_timestamp(&row.end, record)?;
            let activity =
                ActivityType::parse(&row.activity).ok_or_else(|| IngestError::Csv {
                    record,
                    message: format!("unknown activity {:?}", row.activity),
                })?;
            let source = match &row.source {
                Some(s) if !s.is_empty() => {
                    SampleSource::parse(s).ok_or_else(|| IngestError::Csv {
                        record,
                        message: format!("unknown source {s:?}"),
                    })?
                }
                _ => SampleSource::Tachograph,
            };

            let sample = ActivitySample::new(
                driver_id.clone(),
                upload.vehicle_id.clone(),
                start,
                end,
                activity,
                source,
            )?;

            if let Some(speed) = row.speed_kmh {
                if speed > IMPLAUSIBLE_SPEED_KMH || speed < 0.0 {
                    suspicious = true;
                }
                if speed > max_speed_kmh {
                    max_speed_kmh = speed;
                }
            }
            if activity == ActivityType::Driving && row.card_present == Some(false) {
                card_gap_minutes += sample.duration_minutes();
            }

            samples.push(sample);
        }

        sort_and_check(&mut samples)?;

        Ok(DecodedFile {
            samples,
            max_speed_kmh,
            recorder: RecorderMetadata {
                generation: upload.file_type.generation(),
                software_version: upload.device_metadata.software_version.clone(),
                card_gap_minutes,
            },
            integrity: if suspicious {
                IntegritySignal::Suspicious
            } else {
                IntegritySignal::Plausible
            },
        })
    }
}

fn parse_timestamp(value: &str, record: usize) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| IngestError::Csv {
            record,
            message: format!("invalid timestamp {value:?}: {e}"),
        })
}
