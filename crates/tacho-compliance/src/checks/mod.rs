//! Compliance rule checks.
//!
//! Each module evaluates one regulatory rule against the prepared figures
//! and reports at most one violation. `run_all` fixes the evaluation order
//! so identical input always yields an identically ordered violation list.

mod card;
mod driving;
mod integrity;
mod rest;
mod speed;

use tacho_ingest::IntegritySignal;
use tacho_model::Violation;
use tacho_standards::WtdLimits;

/// Figures the checks evaluate against, derived once from the merged
/// sample set.
#[derive(Debug, Clone)]
pub(crate) struct CheckInput<'a> {
    pub limits: &'a WtdLimits,
    /// Total driving minutes in the analysis window.
    pub driving_minutes: i64,
    /// Break/rest periods of any length found in the window.
    pub breaks_found: usize,
    /// Breaks meeting the qualifying minimum duration.
    pub qualifying_breaks: usize,
    pub max_speed_kmh: f64,
    /// Whether the recorder reports card insertion events at all.
    pub supports_card_events: bool,
    /// Minutes of driving with no driver card present.
    pub card_gap_minutes: i64,
    pub integrity: IntegritySignal,
}

/// Run every rule in its fixed order.
pub(crate) fn run_all(input: &CheckInput<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    // 1. Daily driving ceiling
    violations.extend(driving::check(input));

    // 2. Rest after continuous driving
    violations.extend(rest::check(input));

    // 3. Speed limit
    violations.extend(speed::check(input));

    // 4. Card insertion coverage (smart recorders only)
    violations.extend(card::check(input));

    // 5. Recorder integrity
    violations.extend(integrity::check(input));

    violations
}
