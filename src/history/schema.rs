// Connection pragmas and user_version schema migrations for the history database

use rusqlite::Connection;

use crate::error::HistoryError;

/// Latest schema version this build knows how to create.
pub const SCHEMA_VERSION: u32 = 1;

/// Apply pragmas to a file-backed connection.
pub fn apply_pragmas(conn: &Connection) -> Result<(), HistoryError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(HistoryError::sqlite("apply pragmas"))
}

/// In-memory databases have no WAL; only foreign keys matter there.
pub fn apply_memory_pragmas(conn: &Connection) -> Result<(), HistoryError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(HistoryError::sqlite("apply pragmas"))
}

pub fn current_version(conn: &Connection) -> Result<u32, HistoryError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(HistoryError::sqlite("read schema version"))
}

/// Bring the schema up to [`SCHEMA_VERSION`].
pub fn run_migrations(conn: &mut Connection) -> Result<(), HistoryError> {
    let from = current_version(conn)?;
    if from >= SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .map_err(HistoryError::sqlite("begin migration"))?;
    if from < 1 {
        tx.execute_batch(V001_HISTORY_TABLES)
            .map_err(HistoryError::sqlite("migrate to v1"))?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(HistoryError::sqlite("write schema version"))?;
    tx.commit()
        .map_err(HistoryError::sqlite("commit migration"))?;

    tracing::info!(from, to = SCHEMA_VERSION, "history schema migrated");
    Ok(())
}

const V001_HISTORY_TABLES: &str = "
CREATE TABLE IF NOT EXISTS health_records (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    device              TEXT    NOT NULL,
    model               TEXT    NOT NULL DEFAULT '',
    serial              TEXT    NOT NULL DEFAULT '',
    recorded_at         INTEGER NOT NULL,
    temperature         INTEGER NOT NULL,
    power_on_hours      INTEGER NOT NULL,
    overall_health      TEXT    NOT NULL,
    predicted_failure   INTEGER NOT NULL,
    failure_probability REAL    NOT NULL,
    percent_used        REAL,
    remaining_life      REAL,
    critical_issues     INTEGER NOT NULL,
    warning_issues      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_health_records_device_time
    ON health_records (device, recorded_at);

CREATE TABLE IF NOT EXISTS attribute_readings (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id    INTEGER NOT NULL REFERENCES health_records (id) ON DELETE CASCADE,
    attribute_id INTEGER NOT NULL,
    name         TEXT    NOT NULL,
    value        INTEGER NOT NULL,
    worst        INTEGER NOT NULL,
    threshold    INTEGER NOT NULL,
    raw_value    INTEGER NOT NULL,
    attr_type    TEXT    NOT NULL,
    when_failed  TEXT    NOT NULL,
    status       TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_attribute_readings_record
    ON attribute_readings (record_id);

CREATE TABLE IF NOT EXISTS record_issues (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id    INTEGER NOT NULL REFERENCES health_records (id) ON DELETE CASCADE,
    severity     TEXT    NOT NULL,
    code         TEXT    NOT NULL,
    description  TEXT    NOT NULL,
    attribute_id INTEGER,
    value        TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_record_issues_record
    ON record_issues (record_id);
";
