//! Upload contract and pre-storage validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tacho_model::{DriverId, OrganizationId, VehicleId};

use crate::error::{IngestError, Result};
use crate::format::TachographFileType;

/// Legacy DDD payloads shorter than this fail the integrity heuristic.
pub const MIN_DDD_BYTES: usize = 100;

/// Metadata reported by the download device alongside the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub device_serial: Option<String>,
    pub software_version: Option<String>,
}

/// One uploaded tachograph file with its surrounding identity.
///
/// The surrounding application supplies identity explicitly; nothing here
/// is read from ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TachographUpload {
    pub organization_id: OrganizationId,
    pub vehicle_id: VehicleId,
    pub driver_id: Option<DriverId>,
    pub file_type: TachographFileType,
    #[serde(with = "serde_bytes_hex")]
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub download_date: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub device_metadata: DeviceMetadata,
}

impl TachographUpload {
    /// Validate the upload before anything is stored.
    ///
    /// Corruption short-circuits the whole pipeline: nothing is persisted
    /// and no analysis runs for a payload that fails the heuristic.
    pub fn validate(&self) -> Result<()> {
        if self.period_end <= self.period_start {
            return Err(IngestError::PeriodInvalid {
                start: self.period_start,
                end: self.period_end,
            });
        }
        if self.file_type == TachographFileType::Ddd && self.file_bytes.len() < MIN_DDD_BYTES {
            return Err(IngestError::CorruptedFile {
                file_type: self.file_type.as_str().to_string(),
                len: self.file_bytes.len(),
                min: MIN_DDD_BYTES,
            });
        }
        Ok(())
    }

    /// SHA-256 digest of the payload, rendered as lowercase hex.
    pub fn content_digest(&self) -> String {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(&self.file_bytes))
    }

    pub fn download_day(&self) -> NaiveDate {
        self.download_date.date_naive()
    }
}

/// Raw file bytes travel through JSON boundaries as lowercase hex.
mod serde_bytes_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}
