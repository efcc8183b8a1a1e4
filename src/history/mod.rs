// History store: persists analysis results and computes trends from them

pub mod queries;
pub mod schema;
pub mod trend;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::models::{AnalysisResult, AttributeReading, AttributeSnapshot, HealthStatus, Issue};
pub use trend::{HealthTrend, Trend, TrendReport};

/// One persisted analysis, as stored in the header table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub device: String,
    pub model: String,
    pub serial: String,
    /// When the record was inserted
    pub recorded_at: DateTime<Utc>,
    pub temperature: i32,
    pub power_on_hours: u64,
    pub overall_health: HealthStatus,
    pub predicted_failure: bool,
    pub failure_probability: f64,
    pub percent_used: Option<f64>,
    pub remaining_life: Option<f64>,
    pub critical_issues: u32,
    pub warning_issues: u32,
}

/// SQLite-backed history of analysis results.
///
/// Each call blocks on disk I/O. Writes from several processes to the same
/// file are not coordinated; keep a single writer per database.
pub struct HistoryStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Open (or create) a history database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| HistoryError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut conn = Connection::open(path).map_err(|source| HistoryError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        schema::apply_pragmas(&conn)?;
        schema::run_migrations(&mut conn)?;
        tracing::info!(path = %path.display(), "history store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the database configured in `config`, or the default location.
    pub fn open_configured(config: &HistoryConfig) -> Result<Self, HistoryError> {
        let path = config
            .resolved_path()
            .unwrap_or_else(|| PathBuf::from(crate::config::defaults::HISTORY_FILE_NAME));
        Self::open(&path)
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let mut conn = Connection::open_in_memory().map_err(|source| HistoryError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        schema::apply_memory_pragmas(&conn)?;
        schema::run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::Poisoned)
    }

    /// Persist a snapshot and its analysis, stamped with the current time.
    pub fn record_analysis(
        &self,
        snapshot: &AttributeSnapshot,
        result: &AnalysisResult,
    ) -> Result<i64, HistoryError> {
        self.record_analysis_at(snapshot, result, Utc::now())
    }

    /// Persist a snapshot and its analysis with an explicit timestamp.
    ///
    /// The header row, attribute rows and issue rows are written in one
    /// transaction; on any error nothing is stored.
    pub fn record_analysis_at(
        &self,
        snapshot: &AttributeSnapshot,
        result: &AnalysisResult,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, HistoryError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(HistoryError::sqlite("begin record transaction"))?;
        let record_id = queries::insert_record(&tx, snapshot, result, &recorded_at)?;
        tx.commit()
            .map_err(HistoryError::sqlite("commit record transaction"))?;

        tracing::debug!(
            device = %snapshot.device,
            record_id,
            health = %result.overall_health,
            issues = result.issues.len(),
            "recorded analysis"
        );
        Ok(record_id)
    }

    /// Records for `device` since `since`, newest first, at most `limit` of them.
    pub fn get_history(
        &self,
        device: &str,
        since: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRecord>, HistoryError> {
        let conn = self.conn()?;
        queries::history(&conn, device, &since, limit)
    }

    pub fn latest_record(&self, device: &str) -> Result<Option<HistoryRecord>, HistoryError> {
        let conn = self.conn()?;
        queries::latest(&conn, device)
    }

    /// Distinct devices with stored history, sorted ascending.
    pub fn get_devices(&self) -> Result<Vec<String>, HistoryError> {
        let conn = self.conn()?;
        queries::devices(&conn)
    }

    pub fn record_attributes(
        &self,
        record_id: i64,
    ) -> Result<Vec<AttributeReading>, HistoryError> {
        let conn = self.conn()?;
        queries::attributes_for(&conn, record_id)
    }

    pub fn record_issues(&self, record_id: i64) -> Result<Vec<Issue>, HistoryError> {
        let conn = self.conn()?;
        queries::issues_for(&conn, record_id)
    }

    /// Raw counter of one attribute over time, oldest first.
    pub fn attribute_series(
        &self,
        device: &str,
        attribute_id: u8,
        since: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, u64)>, HistoryError> {
        let conn = self.conn()?;
        queries::attribute_series(&conn, device, attribute_id, &since)
    }

    /// Delete records older than `retention`. Returns the number of header rows removed.
    pub fn clean_old_records(&self, retention: Duration) -> Result<usize, HistoryError> {
        let Some(cutoff) = TimeDelta::from_std(retention)
            .ok()
            .and_then(|delta| Utc::now().checked_sub_signed(delta))
        else {
            return Ok(0);
        };
        let deleted = {
            let conn = self.conn()?;
            queries::delete_before(&conn, &cutoff)?
        };
        tracing::info!(deleted, cutoff = %cutoff, "cleaned old history records");
        Ok(deleted)
    }

    pub fn apply_retention(&self, config: &HistoryConfig) -> Result<usize, HistoryError> {
        self.clean_old_records(config.retention())
    }

    /// Temperature, health and wear trends for `device` since `since`.
    ///
    /// Windows with too few records report stable trends and a zero wear rate.
    pub fn get_trend(
        &self,
        device: &str,
        since: DateTime<Utc>,
    ) -> Result<TrendReport, HistoryError> {
        let samples = {
            let conn = self.conn()?;
            queries::trend_samples(&conn, device, &since)?
        };

        let temperatures: Vec<i32> = samples
            .iter()
            .map(|s| s.temperature)
            .filter(|t| *t > 0)
            .collect();
        let stats = trend::TemperatureStats::from_readings(&temperatures);
        let series: Vec<f64> = temperatures.iter().map(|t| f64::from(*t)).collect();
        let scores: Vec<f64> = samples
            .iter()
            .map(|s| {
                trend::health_score(s.critical_issues, s.warning_issues, s.failure_probability)
            })
            .collect();
        let wear: Vec<(DateTime<Utc>, f64)> = samples
            .iter()
            .filter_map(|s| {
                s.percent_used
                    .filter(|p| *p > 0.0)
                    .map(|p| (s.recorded_at, p))
            })
            .collect();

        let wear_rate_per_day = trend::wear_rate(&wear);
        let estimated_failure_date = match wear.last() {
            Some(&last) if wear_rate_per_day > 0.0 => {
                trend::project_failure_date(last, wear_rate_per_day)
            }
            _ => None,
        };

        Ok(TrendReport {
            device: device.to_string(),
            since,
            until: Utc::now(),
            avg_temperature: stats.avg,
            min_temperature: stats.min,
            max_temperature: stats.max,
            temperature_trend: trend::temperature_trend(&series),
            health_trend: trend::health_trend(&scores),
            wear_rate_per_day,
            estimated_failure_date,
            record_count: samples.len(),
        })
    }
}
