// SQL for the history tables; every function borrows a connection or transaction

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::HistoryRecord;
use crate::error::HistoryError;
use crate::models::{AnalysisResult, AttributeReading, AttributeSnapshot, Issue, Severity};

/// Timestamps are stored as microseconds since the Unix epoch and compared numerically.
pub fn to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(idx: usize, micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {micros}").into(),
        )
    })
}

fn parse_col<T: FromStr<Err = String>>(idx: usize, text: &str) -> rusqlite::Result<T> {
    text.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn to_sql_u64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Insert the header row and all child rows. Returns the new record id.
pub fn insert_record(
    conn: &Connection,
    snapshot: &AttributeSnapshot,
    result: &AnalysisResult,
    recorded_at: &DateTime<Utc>,
) -> Result<i64, HistoryError> {
    let wear = result.ssd_wear.as_ref();
    conn.execute(
        "INSERT INTO health_records (
            device, model, serial, recorded_at, temperature, power_on_hours,
            overall_health, predicted_failure, failure_probability,
            percent_used, remaining_life, critical_issues, warning_issues
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            snapshot.device,
            snapshot.model,
            snapshot.serial,
            to_micros(recorded_at),
            snapshot.temperature,
            to_sql_u64(snapshot.power_on_hours),
            result.overall_health.as_str(),
            result.predicted_failure,
            result.failure_probability,
            wear.map(|w| w.percent_used),
            wear.map(|w| w.remaining_life),
            result.count_issues(Severity::Critical) as i64,
            result.count_issues(Severity::Warning) as i64,
        ],
    )
    .map_err(HistoryError::sqlite("insert health record"))?;
    let record_id = conn.last_insert_rowid();

    let mut attr_stmt = conn
        .prepare_cached(
            "INSERT INTO attribute_readings (
                record_id, attribute_id, name, value, worst, threshold,
                raw_value, attr_type, when_failed, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .map_err(HistoryError::sqlite("prepare attribute insert"))?;
    for reading in &snapshot.attributes {
        attr_stmt
            .execute(params![
                record_id,
                reading.id,
                reading.name,
                reading.value,
                reading.worst,
                reading.threshold,
                to_sql_u64(reading.raw),
                reading.attr_type.as_str(),
                reading.when_failed.as_str(),
                reading.status().as_str(),
            ])
            .map_err(HistoryError::sqlite("insert attribute reading"))?;
    }

    let mut issue_stmt = conn
        .prepare_cached(
            "INSERT INTO record_issues (
                record_id, severity, code, description, attribute_id, value
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(HistoryError::sqlite("prepare issue insert"))?;
    for issue in &result.issues {
        issue_stmt
            .execute(params![
                record_id,
                issue.severity.as_str(),
                issue.code,
                issue.description,
                issue.attribute_id,
                issue.value,
            ])
            .map_err(HistoryError::sqlite("insert record issue"))?;
    }

    Ok(record_id)
}

const RECORD_COLUMNS: &str = "id, device, model, serial, recorded_at, temperature, power_on_hours,
    overall_health, predicted_failure, failure_probability, percent_used, remaining_life,
    critical_issues, warning_issues";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let overall_health: String = row.get(7)?;
    Ok(HistoryRecord {
        id: row.get(0)?,
        device: row.get(1)?,
        model: row.get(2)?,
        serial: row.get(3)?,
        recorded_at: from_micros(4, row.get(4)?)?,
        temperature: row.get(5)?,
        power_on_hours: from_sql_u64(row.get(6)?),
        overall_health: parse_col(7, &overall_health)?,
        predicted_failure: row.get(8)?,
        failure_probability: row.get(9)?,
        percent_used: row.get(10)?,
        remaining_life: row.get(11)?,
        critical_issues: row.get(12)?,
        warning_issues: row.get(13)?,
    })
}

/// Records for `device` since `since`, newest first. `limit` of `None` returns all.
pub fn history(
    conn: &Connection,
    device: &str,
    since: &DateTime<Utc>,
    limit: Option<usize>,
) -> Result<Vec<HistoryRecord>, HistoryError> {
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM health_records
             WHERE device = ?1 AND recorded_at >= ?2
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?3"
        ))
        .map_err(HistoryError::sqlite("prepare history query"))?;
    let rows = stmt
        .query_map(params![device, to_micros(since), limit], row_to_record)
        .map_err(HistoryError::sqlite("query history"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(HistoryError::sqlite("read history row"))
}

pub fn latest(conn: &Connection, device: &str) -> Result<Option<HistoryRecord>, HistoryError> {
    conn.query_row(
        &format!(
            "SELECT {RECORD_COLUMNS} FROM health_records
             WHERE device = ?1
             ORDER BY recorded_at DESC, id DESC
             LIMIT 1"
        ),
        params![device],
        row_to_record,
    )
    .optional()
    .map_err(HistoryError::sqlite("query latest record"))
}

pub fn devices(conn: &Connection) -> Result<Vec<String>, HistoryError> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT device FROM health_records ORDER BY device ASC")
        .map_err(HistoryError::sqlite("prepare device query"))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(HistoryError::sqlite("query devices"))?;
    rows.collect::<rusqlite::Result<Vec<String>>>()
        .map_err(HistoryError::sqlite("read device row"))
}

/// Delete header rows recorded before `cutoff`; child rows cascade.
pub fn delete_before(conn: &Connection, cutoff: &DateTime<Utc>) -> Result<usize, HistoryError> {
    conn.execute(
        "DELETE FROM health_records WHERE recorded_at < ?1",
        params![to_micros(cutoff)],
    )
    .map_err(HistoryError::sqlite("delete old records"))
}

pub fn attributes_for(
    conn: &Connection,
    record_id: i64,
) -> Result<Vec<AttributeReading>, HistoryError> {
    let mut stmt = conn
        .prepare(
            "SELECT attribute_id, name, value, worst, threshold, raw_value, attr_type, when_failed
             FROM attribute_readings WHERE record_id = ?1 ORDER BY id ASC",
        )
        .map_err(HistoryError::sqlite("prepare attribute query"))?;
    let rows = stmt
        .query_map(params![record_id], |row| {
            let attr_type: String = row.get(6)?;
            let when_failed: String = row.get(7)?;
            Ok(AttributeReading {
                id: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
                worst: row.get(3)?,
                threshold: row.get(4)?,
                raw: from_sql_u64(row.get(5)?),
                attr_type: parse_col(6, &attr_type)?,
                when_failed: parse_col(7, &when_failed)?,
            })
        })
        .map_err(HistoryError::sqlite("query attributes"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(HistoryError::sqlite("read attribute row"))
}

pub fn issues_for(conn: &Connection, record_id: i64) -> Result<Vec<Issue>, HistoryError> {
    let mut stmt = conn
        .prepare(
            "SELECT severity, code, description, attribute_id, value
             FROM record_issues WHERE record_id = ?1 ORDER BY id ASC",
        )
        .map_err(HistoryError::sqlite("prepare issue query"))?;
    let rows = stmt
        .query_map(params![record_id], |row| {
            let severity: String = row.get(0)?;
            Ok(Issue {
                severity: parse_col(0, &severity)?,
                code: row.get(1)?,
                description: row.get(2)?,
                attribute_id: row.get(3)?,
                value: row.get(4)?,
            })
        })
        .map_err(HistoryError::sqlite("query issues"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(HistoryError::sqlite("read issue row"))
}

/// Raw values of one attribute for `device`, oldest first.
pub fn attribute_series(
    conn: &Connection,
    device: &str,
    attribute_id: u8,
    since: &DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, u64)>, HistoryError> {
    let mut stmt = conn
        .prepare(
            "SELECT h.recorded_at, a.raw_value
             FROM attribute_readings a
             JOIN health_records h ON h.id = a.record_id
             WHERE h.device = ?1 AND a.attribute_id = ?2 AND h.recorded_at >= ?3
             ORDER BY h.recorded_at ASC, h.id ASC",
        )
        .map_err(HistoryError::sqlite("prepare attribute series query"))?;
    let rows = stmt
        .query_map(params![device, attribute_id, to_micros(since)], |row| {
            Ok((from_micros(0, row.get(0)?)?, from_sql_u64(row.get(1)?)))
        })
        .map_err(HistoryError::sqlite("query attribute series"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(HistoryError::sqlite("read attribute series row"))
}

/// Per-record values the trend calculations need.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSample {
    pub recorded_at: DateTime<Utc>,
    pub temperature: i32,
    pub critical_issues: u32,
    pub warning_issues: u32,
    pub failure_probability: f64,
    pub percent_used: Option<f64>,
}

/// Samples for `device` since `since`, oldest first.
pub fn trend_samples(
    conn: &Connection,
    device: &str,
    since: &DateTime<Utc>,
) -> Result<Vec<TrendSample>, HistoryError> {
    let mut stmt = conn
        .prepare(
            "SELECT recorded_at, temperature, critical_issues, warning_issues,
                    failure_probability, percent_used
             FROM health_records
             WHERE device = ?1 AND recorded_at >= ?2
             ORDER BY recorded_at ASC, id ASC",
        )
        .map_err(HistoryError::sqlite("prepare trend query"))?;
    let rows = stmt
        .query_map(params![device, to_micros(since)], |row| {
            Ok(TrendSample {
                recorded_at: from_micros(0, row.get(0)?)?,
                temperature: row.get(1)?,
                critical_issues: row.get(2)?,
                warning_issues: row.get(3)?,
                failure_probability: row.get(4)?,
                percent_used: row.get(5)?,
            })
        })
        .map_err(HistoryError::sqlite("query trend samples"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(HistoryError::sqlite("read trend sample"))
}
