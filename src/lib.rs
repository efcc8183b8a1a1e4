//! Drive health analytics over SMART attribute snapshots.
//!
//! A snapshot from the acquisition layer goes through [`HealthAnalyzer`] to get an
//! [`AnalysisResult`]. Callers may persist it with [`HistoryStore`], ask
//! [`AlertManager`] to notify about it, and later query the store for a
//! [`TrendReport`] over a time window.

// Health analyzer: scoring heuristics, SMART attribute table, SSD wear
pub mod analyzer;
// Alert manager: cooldown gate and webhook delivery
pub mod alerts;
// Configuration structs and defaults
pub mod config;
// Error types
pub mod error;
// History store: SQLite persistence and trend computation
pub mod history;
// Data models for snapshots, issues and results
pub mod models;

pub use alerts::{Alert, AlertLevel, AlertManager, AlertSink, WebhookSink};
pub use analyzer::HealthAnalyzer;
pub use config::{AlertConfig, AnalyzerConfig, DriveHealthConfig, HistoryConfig};
pub use error::{AlertError, ConfigError, Error, HistoryError, Result};
pub use history::{HealthTrend, HistoryRecord, HistoryStore, Trend, TrendReport};
pub use models::{
    AnalysisResult, AttributeReading, AttributeSnapshot, AttributeStatus, AttributeType,
    HealthStatus, Issue, Severity, SsdWearInfo, WhenFailed,
};
