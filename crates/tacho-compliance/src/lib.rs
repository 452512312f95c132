mod checks;
mod error;
mod evaluator;
mod input;
mod materialize;
mod pipeline;
mod store;
mod util;
mod weekly;

pub use error::{ComplianceError, Result};
pub use evaluator::Evaluator;
pub use input::{AnalysisInput, PriorContext};
pub use materialize::materialize;
pub use pipeline::{IngestResponse, Pipeline, PipelineError, SweepReport};
pub use store::{
    InfringementSink, RestStore, StoreError, StoreResult, TachographRecord,
    TachographRecordStore, UpsertOutcome,
};
pub use util::format_hhmm;
pub use weekly::{
    RecordOutcome, WeeklyAggregator, WeeklyRestAnalysis, WeeklyRestClassification,
    aggregate_daily_rest, days_in_period,
};
