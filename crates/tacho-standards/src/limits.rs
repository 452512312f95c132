//! Working Time Directive limit set.
//!
//! Default values carry the regulation numbers; deployments may override
//! individual thresholds from a TOML file. Every load is validated for
//! internal consistency so a bad override fails loudly instead of silently
//! relaxing a rule.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StandardsError};

/// Numeric thresholds the compliance rules evaluate against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WtdLimits {
    /// Daily driving ceiling (9 h).
    pub daily_driving_limit_minutes: i64,
    /// Continuous driving allowed before a qualifying break (4.5 h).
    pub continuous_driving_limit_minutes: i64,
    /// Minimum duration for a break to qualify.
    pub minimum_break_minutes: i64,
    /// UK HGV motorway limit.
    pub speed_limit_kmh: f64,
    /// Full weekly rest threshold.
    pub full_weekly_rest_hours: f64,
    /// Reduced weekly rest threshold.
    pub reduced_weekly_rest_hours: f64,
    /// Working hours per week at which a warning is emitted.
    pub weekly_working_warning_hours: f64,
    /// Absolute weekly working ceiling.
    pub weekly_working_ceiling_hours: f64,
    /// Weeks allowed to compensate a reduced weekly rest.
    pub compensation_period_weeks: u32,
}

impl Default for WtdLimits {
    fn default() -> Self {
        Self {
            daily_driving_limit_minutes: 540,
            continuous_driving_limit_minutes: 270,
            minimum_break_minutes: 45,
            speed_limit_kmh: 90.0,
            full_weekly_rest_hours: 45.0,
            reduced_weekly_rest_hours: 24.0,
            weekly_working_warning_hours: 55.0,
            weekly_working_ceiling_hours: 60.0,
            compensation_period_weeks: 3,
        }
    }
}

impl WtdLimits {
    /// Parse limits from TOML text. Missing keys keep regulation defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let limits: WtdLimits =
            toml::from_str(text).map_err(|source| StandardsError::Toml { source })?;
        limits.validate()?;
        Ok(limits)
    }

    /// Load limits from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| StandardsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check internal consistency of the threshold set.
    pub fn validate(&self) -> Result<()> {
        if self.daily_driving_limit_minutes <= 0 {
            return Err(StandardsError::invalid(
                "daily_driving_limit_minutes must be positive",
            ));
        }
        if self.continuous_driving_limit_minutes <= 0
            || self.continuous_driving_limit_minutes >= self.daily_driving_limit_minutes
        {
            return Err(StandardsError::invalid(
                "continuous_driving_limit_minutes must be positive and below the daily limit",
            ));
        }
        if self.minimum_break_minutes <= 0 {
            return Err(StandardsError::invalid(
                "minimum_break_minutes must be positive",
            ));
        }
        if self.speed_limit_kmh <= 0.0 {
            return Err(StandardsError::invalid("speed_limit_kmh must be positive"));
        }
        if self.reduced_weekly_rest_hours <= 0.0
            || self.reduced_weekly_rest_hours >= self.full_weekly_rest_hours
        {
            return Err(StandardsError::invalid(
                "reduced_weekly_rest_hours must be positive and below full_weekly_rest_hours",
            ));
        }
        if self.weekly_working_warning_hours >= self.weekly_working_ceiling_hours {
            return Err(StandardsError::invalid(
                "weekly_working_warning_hours must be below weekly_working_ceiling_hours",
            ));
        }
        if self.compensation_period_weeks == 0 {
            return Err(StandardsError::invalid(
                "compensation_period_weeks must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_regulation_values() {
        let limits = WtdLimits::default();
        assert_eq!(limits.daily_driving_limit_minutes, 540);
        assert_eq!(limits.continuous_driving_limit_minutes, 270);
        assert_eq!(limits.minimum_break_minutes, 45);
        assert_eq!(limits.speed_limit_kmh, 90.0);
        assert_eq!(limits.full_weekly_rest_hours, 45.0);
        assert_eq!(limits.reduced_weekly_rest_hours, 24.0);
        assert_eq!(limits.compensation_period_weeks, 3);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let limits = WtdLimits::from_toml_str("speed_limit_kmh = 80.0\n").unwrap();
        assert_eq!(limits.speed_limit_kmh, 80.0);
        assert_eq!(limits.daily_driving_limit_minutes, 540);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = WtdLimits::from_toml_str("max_speed = 90.0\n");
        assert!(matches!(result, Err(StandardsError::Toml { .. })));
    }

    #[test]
    fn rejects_inconsistent_thresholds() {
        let result = WtdLimits::from_toml_str(
            "reduced_weekly_rest_hours = 50.0\nfull_weekly_rest_hours = 45.0\n",
        );
        assert!(matches!(result, Err(StandardsError::InvalidLimits { .. })));

        let result = WtdLimits::from_toml_str(
            "weekly_working_warning_hours = 61.0\nweekly_working_ceiling_hours = 60.0\n",
        );
        assert!(matches!(result, Err(StandardsError::InvalidLimits { .. })));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limits.toml");
        std::fs::write(&path, "daily_driving_limit_minutes = 480\n").unwrap();

        let limits = WtdLimits::load(&path).unwrap();
        assert_eq!(limits.daily_driving_limit_minutes, 480);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = WtdLimits::load(Path::new("/nonexistent/limits.toml")).unwrap_err();
        assert!(matches!(err, StandardsError::Io { .. }));
    }
}
