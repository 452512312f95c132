pub mod artifact;
pub mod decoder;
pub mod error;
pub mod format;
pub mod upload;

pub use artifact::{ArtifactStore, FsArtifactStore, StoredArtifact, artifact_key};
pub use decoder::{
    CsvActivityDecoder, DecodedFile, IMPLAUSIBLE_SPEED_KMH, IntegritySignal, RecorderMetadata,
    TachographDecoder,
};
pub use error::{IngestError, Result};
pub use format::{Generation, RecorderCapabilities, TachographFileType};
pub use upload::{DeviceMetadata, MIN_DDD_BYTES, TachographUpload};
