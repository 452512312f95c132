//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tacho",
    version,
    about = "Driver hours and tachograph compliance engine",
    long_about = "Ingest tachograph download files, evaluate driver activity against\n\
                  Working Time Directive limits, and track infringements, weekly rest,\n\
                  and compensation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to the compliance database.
    #[arg(
        long = "db",
        value_name = "PATH",
        default_value = "tacho.db",
        global = true
    )]
    pub db: PathBuf,

    /// Path to a WTD limits TOML file (defaults to the regulation values).
    #[arg(long = "limits", value_name = "PATH", global = true)]
    pub limits: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest one tachograph download file and evaluate it.
    Ingest(IngestArgs),

    /// Analyze (and optionally record) one driver's weekly rest.
    Weekly(WeeklyArgs),

    /// Run a compliance sweep across drivers and weeks.
    Sweep(SweepArgs),

    /// List or review persisted infringements.
    Infringements(InfringementsArgs),

    /// Show the effective regulatory limits.
    Limits(LimitsArgs),
}

#[derive(Parser)]
pub struct IngestArgs {
    /// Path to the tachograph file (normalized CSV interchange form).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Vehicle the file was downloaded from.
    #[arg(long = "vehicle", value_name = "ID")]
    pub vehicle: String,

    /// Driver the file belongs to.
    #[arg(long = "driver", value_name = "ID")]
    pub driver: Option<String>,

    /// Organization the upload belongs to.
    #[arg(long = "organization", value_name = "ID")]
    pub organization: String,

    /// File type (ddd, tgd, c1b, v1b, v2b, esm). Defaults to the file
    /// extension.
    #[arg(long = "file-type", value_name = "TYPE")]
    pub file_type: Option<String>,

    /// Start of the covered period (RFC 3339).
    #[arg(long = "period-start", value_name = "TIMESTAMP")]
    pub period_start: String,

    /// End of the covered period (RFC 3339).
    #[arg(long = "period-end", value_name = "TIMESTAMP")]
    pub period_end: String,

    /// Download timestamp (RFC 3339; defaults to now).
    #[arg(long = "download-date", value_name = "TIMESTAMP")]
    pub download_date: Option<String>,

    /// Directory for stored file artifacts.
    #[arg(
        long = "artifacts-dir",
        value_name = "DIR",
        default_value = "artifacts"
    )]
    pub artifacts_dir: PathBuf,

    /// Print the response as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct WeeklyArgs {
    /// Driver to analyze.
    #[arg(value_name = "DRIVER")]
    pub driver: String,

    /// Organization the driver belongs to.
    #[arg(long = "organization", value_name = "ID")]
    pub organization: String,

    /// Any date inside the ISO week to analyze (YYYY-MM-DD).
    #[arg(long = "week", value_name = "DATE")]
    pub week: String,

    /// Record the result as a weekly rest row.
    #[arg(long = "record")]
    pub record: bool,

    /// Link a compensation date (YYYY-MM-DD) to a reduced week.
    #[arg(long = "compensate", value_name = "DATE")]
    pub compensate: Option<String>,

    /// Print the analysis as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct SweepArgs {
    /// Drivers to sweep (comma separated).
    #[arg(
        long = "drivers",
        value_name = "IDS",
        value_delimiter = ',',
        required = true
    )]
    pub drivers: Vec<String>,

    /// Organization the drivers belong to.
    #[arg(long = "organization", value_name = "ID")]
    pub organization: String,

    /// First ISO week to analyze (any date inside it, YYYY-MM-DD).
    #[arg(long = "from-week", value_name = "DATE")]
    pub from_week: String,

    /// Number of consecutive weeks to analyze.
    #[arg(long = "weeks", value_name = "N", default_value_t = 1)]
    pub weeks: u32,

    /// Print the report as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct InfringementsArgs {
    #[command(subcommand)]
    pub action: InfringementsAction,
}

#[derive(Subcommand)]
pub enum InfringementsAction {
    /// List infringements for a driver.
    List {
        /// Driver to list infringements for.
        #[arg(value_name = "DRIVER")]
        driver: String,

        /// Print the list as JSON instead of a table.
        #[arg(long = "json")]
        json: bool,
    },

    /// Move an infringement to a new review status.
    Review {
        /// Assessment id the infringement belongs to (hex).
        #[arg(value_name = "ASSESSMENT")]
        assessment: String,

        /// Violation kind (e.g. driving_time_violation).
        #[arg(value_name = "KIND")]
        kind: String,

        /// New status: reviewed or resolved.
        #[arg(long = "status", value_enum)]
        status: ReviewStatusArg,
    },
}

#[derive(Parser)]
pub struct LimitsArgs {
    /// Print the limits as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReviewStatusArg {
    Reviewed,
    Resolved,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
