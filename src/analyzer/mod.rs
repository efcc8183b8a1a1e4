// Health analyzer: turns one attribute snapshot into a scored assessment

pub mod attributes;
pub mod scoring;
pub mod wear;

use crate::config::AnalyzerConfig;
use crate::models::{
    AnalysisResult, AttributeReading, AttributeSnapshot, AttributeType, Issue, Severity,
    WhenFailed,
};
use attributes::Interpretation;

/// Issue codes emitted by the analyzer.
pub mod codes {
    pub const HIGH_TEMP_CRITICAL: &str = "HIGH_TEMP_CRITICAL";
    pub const HIGH_TEMP_WARNING: &str = "HIGH_TEMP_WARNING";
    pub const ATTRIBUTE_FAILING: &str = "ATTRIBUTE_FAILING";
    pub const ATTRIBUTE_FAILED_PAST: &str = "ATTRIBUTE_FAILED_PAST";
    pub const ATTRIBUTE_NEAR_THRESHOLD: &str = "ATTRIBUTE_NEAR_THRESHOLD";
    pub const REALLOCATED_SECTORS: &str = "REALLOCATED_SECTORS";
    pub const PENDING_SECTORS: &str = "PENDING_SECTORS";
    pub const UNCORRECTABLE_SECTORS: &str = "UNCORRECTABLE_SECTORS";
}

/// Reallocated sector counts above this are critical rather than a warning.
const REALLOCATED_CRITICAL_ABOVE: u64 = 100;
/// Pre-fail attributes within this many points of their threshold raise a warning.
const NEAR_THRESHOLD_MARGIN: i32 = 10;

/// Stateless analyzer holding its threshold configuration.
/// Safe to share between threads; every call builds a fresh result.
#[derive(Debug, Clone, Default)]
pub struct HealthAnalyzer {
    config: AnalyzerConfig,
}

impl HealthAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes a snapshot.
    ///
    /// A missing snapshot yields an `Unknown` result with no issues; this never fails.
    ///
    /// # Arguments
    /// * `snapshot` - attribute snapshot from the acquisition layer, if one was taken
    pub fn analyze(&self, snapshot: Option<&AttributeSnapshot>) -> AnalysisResult {
        let Some(snapshot) = snapshot else {
            return AnalysisResult::unknown("");
        };

        let mut issues = Vec::new();
        check_temperature(snapshot.temperature, &self.config, &mut issues);
        check_attribute_states(&snapshot.attributes, &mut issues);
        check_sectors(&snapshot.attributes, &mut issues);

        let ssd_wear = wear::assess(snapshot, &self.config);

        let failure_probability = if self.config.enable_prediction {
            let reallocated =
                attributes::find(&snapshot.attributes, Interpretation::ReallocatedSectors)
                    .map_or(0, |r| r.raw);
            scoring::failure_score(&issues, ssd_wear.as_ref(), reallocated)
        } else {
            0.0
        };
        let predicted_failure = failure_probability >= scoring::PREDICTED_FAILURE_SCORE;

        let overall_health = scoring::overall_health(&issues, predicted_failure, ssd_wear.as_ref());
        let recommendations = scoring::recommendations(
            overall_health,
            predicted_failure,
            &issues,
            ssd_wear.as_ref(),
            &snapshot.attributes,
        );

        AnalysisResult {
            device: snapshot.device.clone(),
            overall_health,
            predicted_failure,
            failure_probability,
            time_to_failure: ssd_wear.as_ref().and_then(|w| w.estimated_lifespan),
            issues,
            recommendations,
            ssd_wear,
        }
    }
}

/// Temperatures of zero or below mean the drive did not report one.
fn check_temperature(temperature: i32, config: &AnalyzerConfig, issues: &mut Vec<Issue>) {
    if temperature <= 0 {
        return;
    }
    if temperature >= config.temp_critical {
        issues.push(Issue::new(
            Severity::Critical,
            codes::HIGH_TEMP_CRITICAL,
            format!(
                "Drive temperature is at or above the critical limit of {}°C",
                config.temp_critical
            ),
            None,
            format!("{temperature}°C"),
        ));
    } else if temperature >= config.temp_warning {
        issues.push(Issue::new(
            Severity::Warning,
            codes::HIGH_TEMP_WARNING,
            format!(
                "Drive temperature is at or above the warning limit of {}°C",
                config.temp_warning
            ),
            None,
            format!("{temperature}°C"),
        ));
    }
}

fn check_attribute_states(readings: &[AttributeReading], issues: &mut Vec<Issue>) {
    for reading in readings {
        match reading.when_failed {
            WhenFailed::FailingNow => issues.push(Issue::new(
                Severity::Critical,
                codes::ATTRIBUTE_FAILING,
                format!("Attribute {} ({}) is failing now", reading.name, reading.id),
                Some(reading.id),
                reading.value.to_string(),
            )),
            WhenFailed::InThePast => issues.push(Issue::new(
                Severity::Warning,
                codes::ATTRIBUTE_FAILED_PAST,
                format!("Attribute {} ({}) failed in the past", reading.name, reading.id),
                Some(reading.id),
                reading.worst.to_string(),
            )),
            WhenFailed::Never => {}
        }

        let margin = reading.margin();
        if reading.attr_type == AttributeType::PreFail
            && reading.threshold > 0
            && margin > 0
            && margin <= NEAR_THRESHOLD_MARGIN
        {
            issues.push(Issue::new(
                Severity::Warning,
                codes::ATTRIBUTE_NEAR_THRESHOLD,
                format!(
                    "Pre-fail attribute {} ({}) is {} points above its threshold of {}",
                    reading.name, reading.id, margin, reading.threshold
                ),
                Some(reading.id),
                reading.value.to_string(),
            ));
        }
    }
}

fn check_sectors(readings: &[AttributeReading], issues: &mut Vec<Issue>) {
    if let Some(reading) = attributes::find(readings, Interpretation::ReallocatedSectors) {
        if reading.raw > 0 {
            let severity = if reading.raw > REALLOCATED_CRITICAL_ABOVE {
                Severity::Critical
            } else {
                Severity::Warning
            };
            issues.push(Issue::new(
                severity,
                codes::REALLOCATED_SECTORS,
                "Drive has remapped bad sectors",
                Some(reading.id),
                format!("{} sectors", reading.raw),
            ));
        }
    }

    if let Some(reading) = attributes::find(readings, Interpretation::PendingSectors) {
        if reading.raw > 0 {
            issues.push(Issue::new(
                Severity::Critical,
                codes::PENDING_SECTORS,
                "Sectors are waiting to be remapped after read errors",
                Some(reading.id),
                format!("{} sectors", reading.raw),
            ));
        }
    }

    if let Some(reading) = attributes::find(readings, Interpretation::UncorrectableSectors) {
        if reading.raw > 0 {
            issues.push(Issue::new(
                Severity::Critical,
                codes::UNCORRECTABLE_SECTORS,
                "Drive has sectors that could not be read or corrected",
                Some(reading.id),
                format!("{} sectors", reading.raw),
            ));
        }
    }
}
