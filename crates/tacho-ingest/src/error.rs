use std::path::PathBuf;

use thiserror::Error;

use tacho_model::DataIntegrity;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported tachograph file type: {given:?}")]
    InvalidFormat { given: String },

    #[error(
        "corrupted {file_type} payload: {len} bytes is below the {min}-byte integrity minimum"
    )]
    CorruptedFile {
        file_type: String,
        len: usize,
        min: usize,
    },

    #[error("upload period is empty or inverted: start {start}, end {end}")]
    PeriodInvalid {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    #[error("artifact path already exists: {path}")]
    ArtifactCollision { path: PathBuf },

    #[error("failed to write artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode samples: {message}")]
    Decode { message: String },

    #[error("invalid sample data: {0}")]
    Samples(#[from] tacho_model::ModelError),

    #[error("csv error at record {record}: {message}")]
    Csv { record: usize, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// The data-integrity verdict a rejection implies, for the structured
    /// error object at the application boundary.
    pub fn data_integrity(&self) -> Option<DataIntegrity> {
        match self {
            IngestError::CorruptedFile { .. } => Some(DataIntegrity::Corrupted),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
