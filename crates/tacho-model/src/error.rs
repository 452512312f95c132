use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid driver id: {0:?}")]
    InvalidDriverId(String),

    #[error("invalid vehicle id: {0:?}")]
    InvalidVehicleId(String),

    #[error("invalid organization id: {0:?}")]
    InvalidOrganizationId(String),

    #[error("invalid assessment id: {0:?}")]
    InvalidAssessmentId(String),

    #[error("sample interval is empty or inverted: start {start}, end {end}")]
    EmptyInterval {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    #[error("samples for driver {driver} overlap at index {index}: {previous_end} > {next_start}")]
    OverlappingSamples {
        driver: String,
        index: usize,
        previous_end: chrono::DateTime<chrono::Utc>,
        next_start: chrono::DateTime<chrono::Utc>,
    },

    #[error("samples belong to more than one driver: {first} and {second}")]
    MixedDrivers { first: String, second: String },

    #[error("infringement status cannot move from {from} to {to}")]
    StatusRegression { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
