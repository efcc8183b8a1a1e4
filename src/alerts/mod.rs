// Alert manager: rate-limited notification dispatch for analysis results

pub mod cooldown;
pub mod webhook;

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AlertConfig;
use crate::error::{AlertError, Error};
use crate::models::{AnalysisResult, HealthStatus, Severity};
pub use cooldown::CooldownTracker;
pub use webhook::{AlertSink, WebhookSink};

/// Alert importance, ordered info < warning < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl From<Severity> for AlertLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => AlertLevel::Info,
            Severity::Warning => AlertLevel::Warning,
            Severity::Critical => AlertLevel::Critical,
        }
    }
}

/// A notification about one device. Sent, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub device: String,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form details (scores, issue codes, wear figures)
    pub data: serde_json::Value,
}

/// Decides whether an analysis result warrants alerts and delivers them.
///
/// Each device is either eligible to alert or in cooldown. Generating at
/// least one alert starts the cooldown, before delivery is attempted, so a
/// failed delivery still consumes the window.
pub struct AlertManager {
    config: AlertConfig,
    sink: Box<dyn AlertSink>,
    cooldowns: Mutex<CooldownTracker>,
}

impl AlertManager {
    /// Build a manager that delivers to the configured webhook.
    pub fn new(config: AlertConfig) -> Result<Self, Error> {
        config.validate()?;
        let sink = WebhookSink::new(config.webhook_url.clone(), config.webhook_timeout())?;
        Ok(Self::with_sink(config, Box::new(sink)))
    }

    /// Build a manager around any sink.
    pub fn with_sink(config: AlertConfig, sink: Box<dyn AlertSink>) -> Self {
        let cooldowns = Mutex::new(CooldownTracker::new(config.cooldown()));
        Self {
            config,
            sink,
            cooldowns,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    fn cooldowns(&self) -> MutexGuard<'_, CooldownTracker> {
        // The tracker is a plain map; a panic elsewhere cannot leave it half-updated.
        self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluate `result` and deliver any alerts. Returns the alerts that were sent.
    pub fn check_and_alert(&self, result: &AnalysisResult) -> Result<Vec<Alert>, AlertError> {
        self.check_and_alert_at(result, Utc::now())
    }

    /// Same as [`check_and_alert`](Self::check_and_alert) with an explicit clock.
    ///
    /// # Arguments
    /// * `result` - analysis to evaluate
    /// * `now` - time used for cooldown checks and alert timestamps
    pub fn check_and_alert_at(
        &self,
        result: &AnalysisResult,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, AlertError> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }

        let alerts = {
            let mut cooldowns = self.cooldowns();
            if cooldowns.in_cooldown(&result.device, now) {
                tracing::debug!(device = %result.device, "alerts suppressed by cooldown");
                return Ok(Vec::new());
            }

            let alerts: Vec<Alert> = build_alerts(result, now)
                .into_iter()
                .filter(|alert| alert.level >= self.config.min_level)
                .collect();
            if alerts.is_empty() {
                return Ok(alerts);
            }
            cooldowns.mark_alerted(&result.device, now);
            alerts
        };

        for alert in &alerts {
            if let Err(e) = self.sink.send(alert) {
                tracing::warn!(
                    device = %alert.device,
                    title = %alert.title,
                    error = %e,
                    "alert delivery failed"
                );
                return Err(e);
            }
            tracing::info!(
                device = %alert.device,
                level = ?alert.level,
                title = %alert.title,
                "alert sent"
            );
        }
        Ok(alerts)
    }

    /// Send one info alert regardless of cooldown and level filter.
    pub fn send_test_alert(&self, device: &str) -> Result<Alert, AlertError> {
        let alert = Alert {
            level: AlertLevel::Info,
            device: device.to_string(),
            title: "Test alert".to_string(),
            description: "Webhook delivery is configured correctly.".to_string(),
            timestamp: Utc::now(),
            data: json!({ "test": true }),
        };
        self.sink.send(&alert)?;
        Ok(alert)
    }

    /// Make `device` eligible to alert again.
    pub fn clear_cooldown(&self, device: &str) {
        self.cooldowns().clear(device);
    }

    pub fn last_alert_time(&self, device: &str) -> Option<DateTime<Utc>> {
        self.cooldowns().last_alert(device)
    }
}

/// Candidate alerts for a result, before cooldown and level filtering.
pub fn build_alerts(result: &AnalysisResult, now: DateTime<Utc>) -> Vec<Alert> {
    let alert = |level: AlertLevel,
                 title: &str,
                 description: String,
                 data: serde_json::Value| Alert {
        level,
        device: result.device.clone(),
        title: title.to_string(),
        description,
        timestamp: now,
        data,
    };
    let mut alerts = Vec::new();

    match result.overall_health {
        HealthStatus::Critical | HealthStatus::Failing => alerts.push(alert(
            AlertLevel::Critical,
            "Drive health critical",
            format!("{} is in {} health", result.device, result.overall_health),
            json!({
                "overall_health": result.overall_health,
                "critical_issues": result.count_issues(Severity::Critical),
                "warning_issues": result.count_issues(Severity::Warning),
            }),
        )),
        HealthStatus::Warning => alerts.push(alert(
            AlertLevel::Warning,
            "Drive health warning",
            format!(
                "{} reports {} warning issue(s)",
                result.device,
                result.count_issues(Severity::Warning)
            ),
            json!({
                "overall_health": result.overall_health,
                "warning_issues": result.count_issues(Severity::Warning),
            }),
        )),
        HealthStatus::Good | HealthStatus::Unknown => {}
    }

    if result.predicted_failure {
        alerts.push(alert(
            AlertLevel::Critical,
            "Drive failure predicted",
            format!(
                "{} has a failure score of {:.0}/100",
                result.device, result.failure_probability
            ),
            json!({ "failure_probability": result.failure_probability }),
        ));
    }

    if let Some(wear) = &result.ssd_wear {
        let level = match wear.wear_status {
            HealthStatus::Critical | HealthStatus::Failing => Some(AlertLevel::Critical),
            HealthStatus::Warning => Some(AlertLevel::Warning),
            _ => None,
        };
        if let Some(level) = level {
            alerts.push(alert(
                level,
                "SSD wear high",
                format!(
                    "{} has used {:.0}% of its rated endurance",
                    result.device, wear.percent_used
                ),
                json!({
                    "percent_used": wear.percent_used,
                    "remaining_life": wear.remaining_life,
                }),
            ));
        }
    }

    for issue in result.issues.iter().filter(|i| i.severity == Severity::Critical) {
        alerts.push(alert(
            AlertLevel::from(issue.severity),
            issue.code.as_str(),
            issue.description.clone(),
            json!({
                "code": issue.code,
                "attribute_id": issue.attribute_id,
                "value": issue.value,
            }),
        ));
    }

    alerts
}
