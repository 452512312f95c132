//! SQLite schema.
//!
//! Idempotency rests on the UNIQUE constraints here: weekly rest keys on
//! (driver, week start) and infringements on (assessment, violation kind),
//! so concurrent writers collapse into one row at the database, not in
//! application code.

pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tachograph_records (
    id                  INTEGER PRIMARY KEY,
    organization_id     TEXT NOT NULL,
    vehicle_id          TEXT NOT NULL,
    driver_id           TEXT,
    file_type           TEXT NOT NULL,
    artifact_reference  TEXT NOT NULL,
    content_sha256      TEXT NOT NULL,
    download_date       TEXT NOT NULL,
    period_start        TEXT NOT NULL,
    period_end          TEXT NOT NULL,
    assessment_json     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_vehicle
    ON tachograph_records (vehicle_id, download_date);

CREATE TABLE IF NOT EXISTS activity_samples (
    id          INTEGER PRIMARY KEY,
    driver_id   TEXT NOT NULL,
    vehicle_id  TEXT NOT NULL,
    start_time  TEXT NOT NULL,
    end_time    TEXT NOT NULL,
    activity    TEXT NOT NULL,
    source      TEXT NOT NULL,
    UNIQUE (driver_id, start_time)
);

CREATE INDEX IF NOT EXISTS idx_samples_driver_time
    ON activity_samples (driver_id, start_time);

CREATE TABLE IF NOT EXISTS daily_rest (
    id               INTEGER PRIMARY KEY,
    driver_id        TEXT NOT NULL,
    organization_id  TEXT NOT NULL,
    rest_date        TEXT NOT NULL,
    duration_hours   REAL NOT NULL,
    UNIQUE (driver_id, rest_date)
);

CREATE TABLE IF NOT EXISTS weekly_rest (
    id                     INTEGER PRIMARY KEY,
    driver_id              TEXT NOT NULL,
    week_start_date        TEXT NOT NULL,
    week_end_date          TEXT NOT NULL,
    total_rest_hours       REAL NOT NULL,
    rest_type              TEXT NOT NULL,
    compensation_required  INTEGER NOT NULL,
    compensation_date      TEXT,
    UNIQUE (driver_id, week_start_date)
);

CREATE TABLE IF NOT EXISTS infringements (
    id               INTEGER PRIMARY KEY,
    assessment_id    TEXT NOT NULL,
    violation_kind   TEXT NOT NULL,
    driver_id        TEXT NOT NULL,
    vehicle_id       TEXT,
    organization_id  TEXT NOT NULL,
    detail           TEXT NOT NULL,
    severity         TEXT NOT NULL,
    status           TEXT NOT NULL,
    detected_at      TEXT NOT NULL,
    UNIQUE (assessment_id, violation_kind)
);

CREATE INDEX IF NOT EXISTS idx_infringements_driver
    ON infringements (driver_id, detected_at);

CREATE TABLE IF NOT EXISTS compliance_alerts (
    id               INTEGER PRIMARY KEY,
    assessment_id    TEXT NOT NULL UNIQUE,
    organization_id  TEXT NOT NULL,
    severity         TEXT NOT NULL,
    description      TEXT NOT NULL,
    created_at       TEXT NOT NULL
);
";
