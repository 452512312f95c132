//! Daily and weekly rest records derived from activity history.

use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::ids::{DriverId, OrganizationId};

/// One calendar day's aggregated rest for a driver.
///
/// Derived by aggregation over rest/break samples. Recomputable from the
/// sample history; corrected only by explicit update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRestRecord {
    pub driver_id: DriverId,
    pub organization_id: OrganizationId,
    pub rest_date: NaiveDate,
    pub duration_hours: f64,
}

/// Classification of one ISO week's rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyRestType {
    FullWeeklyRest,
    ReducedWeeklyRest,
    CompensatedRest,
}

impl WeeklyRestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeeklyRestType::FullWeeklyRest => "full_weekly_rest",
            WeeklyRestType::ReducedWeeklyRest => "reduced_weekly_rest",
            WeeklyRestType::CompensatedRest => "compensated_rest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full_weekly_rest" => Some(WeeklyRestType::FullWeeklyRest),
            "reduced_weekly_rest" => Some(WeeklyRestType::ReducedWeeklyRest),
            "compensated_rest" => Some(WeeklyRestType::CompensatedRest),
            _ => None,
        }
    }
}

/// One ISO week of rest for a driver. At most one record per (driver, week).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRest {
    pub driver_id: DriverId,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub total_rest_hours: f64,
    pub rest_type: WeeklyRestType,
    pub compensation_required: bool,
    pub compensation_date: Option<NaiveDate>,
}

impl WeeklyRest {
    /// Last date on which compensation for a reduced week may be taken.
    pub fn compensation_deadline(&self, compensation_period_weeks: u32) -> NaiveDate {
        self.week_end_date
            .checked_add_days(Days::new(u64::from(compensation_period_weeks) * 7))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Monday of the ISO week containing `date`.
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Sunday of the ISO week containing `date`.
pub fn iso_week_end(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).last_day()
}
