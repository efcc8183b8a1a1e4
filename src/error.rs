// Error types surfaced by the history store, alert manager and configuration

use std::path::PathBuf;

/// History store failures. `op` names the operation that failed.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to open history database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create history directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history {op} failed: {source}")]
    Sqlite {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("history connection lock poisoned")]
    Poisoned,
}

impl HistoryError {
    pub(crate) fn sqlite(op: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| HistoryError::Sqlite { op, source }
    }
}

/// Webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("failed to build webhook client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to send alert to {url}: {source}")]
    Delivery {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("webhook {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Invalid or unparsable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {message}")]
    Parse { message: String },

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Any error produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
