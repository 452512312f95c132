use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("invalid sample data: {0}")]
    InvalidSamples(#[from] tacho_model::ModelError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no weekly rest recorded for driver {driver} in week starting {week_start}")]
    WeekNotRecorded { driver: String, week_start: NaiveDate },

    #[error(
        "weekly rest for driver {driver} in week starting {week_start} is not a reduced rest"
    )]
    NotReducedRest { driver: String, week_start: NaiveDate },

    #[error("compensation date {requested} is past the deadline {deadline}")]
    CompensationWindowExceeded {
        deadline: NaiveDate,
        requested: NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
