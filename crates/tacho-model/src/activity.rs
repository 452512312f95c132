//! Driver activity samples derived from tachograph downloads or manual
//! clock entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{DriverId, VehicleId};

/// Activity recorded for one contiguous interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Driving,
    Break,
    Rest,
    OtherWork,
    Availability,
}

impl ActivityType {
    /// Returns the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Driving => "driving",
            ActivityType::Break => "break",
            ActivityType::Rest => "rest",
            ActivityType::OtherWork => "other_work",
            ActivityType::Availability => "availability",
        }
    }

    /// Parse an activity type from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "driving" => Some(ActivityType::Driving),
            "break" => Some(ActivityType::Break),
            "rest" => Some(ActivityType::Rest),
            "other_work" | "work" => Some(ActivityType::OtherWork),
            "availability" => Some(ActivityType::Availability),
            _ => None,
        }
    }

    /// Counts toward working time under the directive.
    pub fn is_work(&self) -> bool {
        matches!(self, ActivityType::Driving | ActivityType::OtherWork)
    }

    /// Counts toward rest when aggregating daily rest figures.
    pub fn is_rest(&self) -> bool {
        matches!(self, ActivityType::Break | ActivityType::Rest)
    }
}

/// Where a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    Tachograph,
    ManualClock,
}

impl SampleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleSource::Tachograph => "tachograph",
            SampleSource::ManualClock => "manual_clock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tachograph" => Some(SampleSource::Tachograph),
            "manual_clock" | "manual" => Some(SampleSource::ManualClock),
            _ => None,
        }
    }
}

/// One atomic record of driver activity.
///
/// Invariants: `end > start`, and samples for one driver never overlap.
/// Use [`check_sample_sequence`] before feeding a batch to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySample {
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub activity: ActivityType,
    pub source: SampleSource,
}

impl ActivitySample {
    pub fn new(
        driver_id: DriverId,
        vehicle_id: VehicleId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        activity: ActivityType,
        source: SampleSource,
    ) -> Result<Self> {
        if end <= start {
            return Err(ModelError::EmptyInterval { start, end });
        }
        Ok(Self {
            driver_id,
            vehicle_id,
            start,
            end,
            activity,
            source,
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Validate a batch of samples: single driver, positive intervals, sorted
/// without overlap.
///
/// The slice must already be sorted by `start`; callers that accept samples
/// in arbitrary order should sort first. Reports the first offending pair.
pub fn check_sample_sequence(samples: &[ActivitySample]) -> Result<()> {
    let Some(first) = samples.first() else {
        return Ok(());
    };

    for sample in samples {
        if sample.end <= sample.start {
            return Err(ModelError::EmptyInterval {
                start: sample.start,
                end: sample.end,
            });
        }
        if sample.driver_id != first.driver_id {
            return Err(ModelError::MixedDrivers {
                first: first.driver_id.to_string(),
                second: sample.driver_id.to_string(),
            });
        }
    }

    for (index, window) in samples.windows(2).enumerate() {
        if window[1].start < window[0].end {
            return Err(ModelError::OverlappingSamples {
                driver: first.driver_id.to_string(),
                index: index + 1,
                previous_end: window[0].end,
                next_start: window[1].start,
            });
        }
    }

    Ok(())
}

/// Sort samples chronologically, then validate the sequence.
pub fn sort_and_check(samples: &mut [ActivitySample]) -> Result<()> {
    samples.sort_by_key(|s| s.start);
    check_sample_sequence(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(start_min: i64, end_min: i64, activity: ActivityType) -> ActivitySample {
        let base = Utc.with_ymd_and_hms(2025, 3, 3, 6, 0, 0).unwrap();
        ActivitySample::new(
            DriverId::new("D-1").unwrap(),
            VehicleId::new("V-1").unwrap(),
            base + chrono::Duration::minutes(start_min),
            base + chrono::Duration::minutes(end_min),
            activity,
            SampleSource::Tachograph,
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_interval() {
        let base = Utc.with_ymd_and_hms(2025, 3, 3, 6, 0, 0).unwrap();
        let result = ActivitySample::new(
            DriverId::new("D-1").unwrap(),
            VehicleId::new("V-1").unwrap(),
            base,
            base,
            ActivityType::Driving,
            SampleSource::Tachograph,
        );
        assert!(matches!(result, Err(ModelError::EmptyInterval { .. })));
    }

    #[test]
    fn sequence_accepts_contiguous_samples() {
        let samples = vec![
            sample(0, 60, ActivityType::Driving),
            sample(60, 105, ActivityType::Break),
            sample(105, 180, ActivityType::Driving),
        ];
        assert!(check_sample_sequence(&samples).is_ok());
    }

    #[test]
    fn sequence_rejects_overlap() {
        let samples = vec![
            sample(0, 60, ActivityType::Driving),
            sample(30, 90, ActivityType::OtherWork),
        ];
        let err = check_sample_sequence(&samples).unwrap_err();
        assert!(matches!(err, ModelError::OverlappingSamples { index: 1, .. }));
    }

    #[test]
    fn empty_sequence_is_valid() {
        assert!(check_sample_sequence(&[]).is_ok());
    }

    #[test]
    fn activity_parse_round_trip() {
        for activity in [
            ActivityType::Driving,
            ActivityType::Break,
            ActivityType::Rest,
            ActivityType::OtherWork,
            ActivityType::Availability,
        ] {
            assert_eq!(ActivityType::parse(activity.as_str()), Some(activity));
        }
        assert_eq!(ActivityType::parse("parked"), None);
    }
}
