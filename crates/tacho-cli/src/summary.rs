//! Table rendering for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use tacho_compliance::{IngestResponse, SweepReport, WeeklyRestAnalysis};
use tacho_model::{ComplianceAssessment, Infringement};
use tacho_standards::WtdLimits;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

pub fn print_ingest_response(response: &IngestResponse) {
    println!("Record: {}", response.record_id);
    println!("Assessment: {}", response.analysis_results.id);
    println!(
        "Infringements created: {}",
        response.infringements_created
    );
    print_assessment(&response.analysis_results);
}

pub fn print_assessment(assessment: &ComplianceAssessment) {
    println!(
        "Driving: {} | Rest periods: {} | Max speed: {:.1} km/h | Integrity: {}",
        tacho_compliance::format_hhmm(assessment.driving_time_total_minutes),
        assessment.rest_periods_count,
        assessment.max_speed_kmh,
        assessment.data_integrity.as_str(),
    );

    if assessment.violations.is_empty() {
        println!("No violations detected.");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Violation"),
            header_cell("Severity"),
            header_cell("Detail"),
        ]);
        apply_table_style(&mut table);
        for violation in &assessment.violations {
            table.add_row(vec![
                violation.kind.as_str().to_string(),
                violation.severity.as_str().to_string(),
                violation.detail.clone(),
            ]);
        }
        println!("{table}");
    }

    for warning in &assessment.warnings {
        println!("warning: {}", warning.detail);
    }
}

pub fn print_weekly_analysis(analysis: &WeeklyRestAnalysis) {
    println!(
        "Week {} to {} for {}",
        analysis.week_start, analysis.week_end, analysis.driver_id
    );
    if analysis.degraded {
        println!("Rest store unavailable; analysis is empty.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Work (h)"),
        header_cell("Rest (h)"),
        header_cell("Classification"),
        header_cell("Compensation"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(format!("{:.1}", analysis.total_work_hours))
            .set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.1}", analysis.total_rest_hours))
            .set_alignment(CellAlignment::Right),
        Cell::new(
            analysis
                .classification
                .map_or("unknown", |c| match c {
                    tacho_compliance::WeeklyRestClassification::Full => "full weekly rest",
                    tacho_compliance::WeeklyRestClassification::Reduced => "reduced weekly rest",
                    tacho_compliance::WeeklyRestClassification::Missing => "missing",
                }),
        ),
        Cell::new(if analysis.compensation_required {
            "required"
        } else {
            "not required"
        }),
    ]);
    println!("{table}");

    for violation in &analysis.violations {
        println!("violation: {} - {}", violation.kind, violation.detail);
    }
    for warning in &analysis.warnings {
        println!("warning: {}", warning.detail);
    }
}

pub fn print_sweep_report(report: &SweepReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Drivers"),
        header_cell("Weeks"),
        header_cell("Rest rows created"),
        header_cell("Infringements created"),
        header_cell("Degraded weeks"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(report.drivers_processed).set_alignment(CellAlignment::Right),
        Cell::new(report.weeks_analyzed).set_alignment(CellAlignment::Right),
        Cell::new(report.weekly_rows_created).set_alignment(CellAlignment::Right),
        Cell::new(report.infringements_created).set_alignment(CellAlignment::Right),
        Cell::new(report.degraded_weeks).set_alignment(CellAlignment::Right),
    ]);
    println!("{table}");
}

pub fn print_infringements(infringements: &[Infringement]) {
    if infringements.is_empty() {
        println!("No infringements on record.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Assessment"),
        header_cell("Violation"),
        header_cell("Severity"),
        header_cell("Status"),
        header_cell("Detected"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    for infringement in infringements {
        table.add_row(vec![
            infringement.assessment_id.to_hex(),
            infringement.violation_kind.as_str().to_string(),
            infringement.severity.as_str().to_string(),
            infringement.status.as_str().to_string(),
            infringement.detected_at.format("%Y-%m-%d").to_string(),
            infringement.detail.clone(),
        ]);
    }
    println!("{table}");
}

pub fn print_limits(limits: &WtdLimits) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Limit"), header_cell("Value")]);
    apply_table_style(&mut table);
    let rows: [(&str, String); 9] = [
        (
            "Daily driving limit",
            tacho_compliance::format_hhmm(limits.daily_driving_limit_minutes),
        ),
        (
            "Continuous driving limit",
            tacho_compliance::format_hhmm(limits.continuous_driving_limit_minutes),
        ),
        (
            "Minimum qualifying break",
            tacho_compliance::format_hhmm(limits.minimum_break_minutes),
        ),
        ("Speed limit", format!("{:.1} km/h", limits.speed_limit_kmh)),
        (
            "Full weekly rest",
            format!("{:.0} h", limits.full_weekly_rest_hours),
        ),
        (
            "Reduced weekly rest",
            format!("{:.0} h", limits.reduced_weekly_rest_hours),
        ),
        (
            "Weekly working warning",
            format!("{:.0} h", limits.weekly_working_warning_hours),
        ),
        (
            "Weekly working ceiling",
            format!("{:.0} h", limits.weekly_working_ceiling_hours),
        ),
        (
            "Compensation period",
            format!("{} weeks", limits.compensation_period_weeks),
        ),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    println!("{table}");
}
