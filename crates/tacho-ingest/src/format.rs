//! Tachograph file formats and the recorder capabilities they imply.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Supported download file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TachographFileType {
    /// Legacy digital tachograph download.
    Ddd,
    Tgd,
    C1b,
    V1b,
    /// Generation 2 vehicle unit download.
    V2b,
    /// Smart tachograph export.
    Esm,
}

/// Recorder generation a file format was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    Digital,
    Smart,
}

impl TachographFileType {
    pub const ALL: [TachographFileType; 6] = [
        TachographFileType::Ddd,
        TachographFileType::Tgd,
        TachographFileType::C1b,
        TachographFileType::V1b,
        TachographFileType::V2b,
        TachographFileType::Esm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TachographFileType::Ddd => "ddd",
            TachographFileType::Tgd => "tgd",
            TachographFileType::C1b => "c1b",
            TachographFileType::V1b => "v1b",
            TachographFileType::V2b => "v2b",
            TachographFileType::Esm => "esm",
        }
    }

    /// Parse a file type from a string (case-insensitive). Unknown values
    /// are an [`IngestError::InvalidFormat`], rejected before any storage.
    pub fn parse(s: &str) -> Result<Self, IngestError> {
        match s.trim().to_lowercase().as_str() {
            "ddd" => Ok(TachographFileType::Ddd),
            "tgd" => Ok(TachographFileType::Tgd),
            "c1b" => Ok(TachographFileType::C1b),
            "v1b" => Ok(TachographFileType::V1b),
            "v2b" => Ok(TachographFileType::V2b),
            "esm" => Ok(TachographFileType::Esm),
            other => Err(IngestError::InvalidFormat {
                given: other.to_string(),
            }),
        }
    }

    /// Map a file extension to a file type.
    pub fn from_extension(ext: &str) -> Result<Self, IngestError> {
        Self::parse(ext)
    }

    pub fn generation(&self) -> Generation {
        match self {
            TachographFileType::Ddd
            | TachographFileType::Tgd
            | TachographFileType::C1b
            | TachographFileType::V1b => Generation::Digital,
            TachographFileType::V2b | TachographFileType::Esm => Generation::Smart,
        }
    }

    /// Capability flags derived from the generation. Rules branch on these,
    /// never on the file type itself.
    pub fn capabilities(&self) -> RecorderCapabilities {
        match self.generation() {
            Generation::Digital => RecorderCapabilities {
                supports_card_events: false,
                satellite_positioning: false,
                remote_download: false,
            },
            Generation::Smart => RecorderCapabilities {
                supports_card_events: true,
                satellite_positioning: true,
                remote_download: true,
            },
        }
    }
}

impl std::fmt::Display for TachographFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the recorder that produced a file is able to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderCapabilities {
    /// Card insertion/withdrawal events are recorded, so card coverage can
    /// be checked against driving periods.
    pub supports_card_events: bool,
    pub satellite_positioning: bool,
    pub remote_download: bool,
}
