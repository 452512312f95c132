//! Command implementations.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use tacho_compliance::{
    Evaluator, InfringementSink, Pipeline, RecordOutcome, WeeklyAggregator,
};
use tacho_ingest::{
    CsvActivityDecoder, DeviceMetadata, FsArtifactStore, TachographFileType, TachographUpload,
};
use tacho_model::{DriverId, InfringementStatus, OrganizationId, VehicleId, ViolationKind};
use tacho_standards::WtdLimits;
use tacho_store::SqliteStore;

use crate::cli::{
    IngestArgs, InfringementsAction, InfringementsArgs, LimitsArgs, ReviewStatusArg, SweepArgs,
    WeeklyArgs,
};
use crate::summary::{
    print_infringements, print_ingest_response, print_limits, print_sweep_report,
    print_weekly_analysis,
};

pub fn load_limits(path: Option<&Path>) -> Result<WtdLimits> {
    match path {
        Some(path) => WtdLimits::load(path)
            .with_context(|| format!("load limits from {}", path.display())),
        None => Ok(WtdLimits::default()),
    }
}

fn parse_timestamp(value: &str, what: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("{what} must be an RFC 3339 timestamp, got {value:?}"))
}

fn parse_date(value: &str, what: &str) -> Result<NaiveDate> {
    value
        .parse()
        .with_context(|| format!("{what} must be YYYY-MM-DD, got {value:?}"))
}

fn open_store(db: &Path) -> Result<SqliteStore> {
    SqliteStore::open(db).with_context(|| format!("open database {}", db.display()))
}

pub fn run_ingest(args: &IngestArgs, db: &Path, limits: &WtdLimits) -> Result<()> {
    let file_bytes = std::fs::read(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;

    let file_type = match &args.file_type {
        Some(text) => TachographFileType::parse(text)?,
        None => {
            let extension = args
                .file
                .extension()
                .and_then(|e| e.to_str())
                .context("file has no extension; pass --file-type")?;
            TachographFileType::from_extension(extension)?
        }
    };

    let download_date = match &args.download_date {
        Some(text) => parse_timestamp(text, "--download-date")?,
        None => Utc::now(),
    };

    let upload = TachographUpload {
        organization_id: OrganizationId::new(args.organization.as_str())?,
        vehicle_id: VehicleId::new(args.vehicle.as_str())?,
        driver_id: args.driver.as_deref().map(DriverId::new).transpose()?,
        file_type,
        file_bytes,
        file_name: args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string()),
        download_date,
        period_start: parse_timestamp(&args.period_start, "--period-start")?,
        period_end: parse_timestamp(&args.period_end, "--period-end")?,
        device_metadata: DeviceMetadata::default(),
    };

    let store = open_store(db)?;
    let artifacts = FsArtifactStore::new(&args.artifacts_dir);
    let evaluator = Evaluator::new(limits.clone());
    let aggregator = WeeklyAggregator::new(limits.clone());
    let decoder = CsvActivityDecoder::new();

    let pipeline = Pipeline::new(&evaluator, &aggregator, &decoder, &artifacts, &store);
    let response = pipeline.ingest(&upload)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_ingest_response(&response);
    }
    Ok(())
}

pub fn run_weekly(args: &WeeklyArgs, db: &Path, limits: &WtdLimits) -> Result<()> {
    let driver = DriverId::new(args.driver.as_str())?;
    let organization = OrganizationId::new(args.organization.as_str())?;
    let week = parse_date(&args.week, "--week")?;

    let store = open_store(db)?;
    let aggregator = WeeklyAggregator::new(limits.clone());
    let analysis = aggregator.analyze(&store, &driver, &organization, week);

    if args.record {
        match aggregator.auto_record(&store, &analysis)? {
            RecordOutcome::Created => info!("weekly rest recorded"),
            RecordOutcome::AlreadyRecorded => info!("weekly rest already recorded"),
            RecordOutcome::NothingToRecord => info!("nothing to record for this week"),
        }
    }

    if let Some(date) = &args.compensate {
        let date = parse_date(date, "--compensate")?;
        aggregator.link_compensation(&store, &driver, week, date)?;
        info!(%date, "compensation linked");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_weekly_analysis(&analysis);
    }
    Ok(())
}

pub fn run_sweep(args: &SweepArgs, db: &Path, limits: &WtdLimits) -> Result<()> {
    let organization = OrganizationId::new(args.organization.as_str())?;
    let drivers: Vec<DriverId> = args
        .drivers
        .iter()
        .map(|d| DriverId::new(d.as_str()))
        .collect::<std::result::Result<_, _>>()?;
    let from_week = parse_date(&args.from_week, "--from-week")?;

    let store = open_store(db)?;
    let artifacts = FsArtifactStore::new("artifacts");
    let evaluator = Evaluator::new(limits.clone());
    let aggregator = WeeklyAggregator::new(limits.clone());
    let decoder = CsvActivityDecoder::new();

    let pipeline = Pipeline::new(&evaluator, &aggregator, &decoder, &artifacts, &store);
    let report = pipeline.sweep(&organization, &drivers, from_week, args.weeks, Utc::now());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_sweep_report(&report);
    }
    Ok(())
}

pub fn run_infringements(args: &InfringementsArgs, db: &Path) -> Result<()> {
    let store = open_store(db)?;

    match &args.action {
        InfringementsAction::List { driver, json } => {
            let driver = DriverId::new(driver.as_str())?;
            let infringements = store.infringements_for_driver(&driver)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&infringements)?);
            } else {
                print_infringements(&infringements);
            }
        }
        InfringementsAction::Review {
            assessment,
            kind,
            status,
        } => {
            let assessment_id = tacho_model::AssessmentId::from_hex(assessment)?;
            let Some(kind) = ViolationKind::parse(kind) else {
                bail!("unknown violation kind {kind:?}");
            };
            let next = match status {
                ReviewStatusArg::Reviewed => InfringementStatus::Reviewed,
                ReviewStatusArg::Resolved => InfringementStatus::Resolved,
            };
            store.update_infringement_status(&assessment_id, kind, next)?;
            info!(status = next.as_str(), "infringement updated");
        }
    }
    Ok(())
}

pub fn run_limits(args: &LimitsArgs, limits: &WtdLimits) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(limits)?);
    } else {
        print_limits(limits);
    }
    Ok(())
}
