// Data models for drive snapshots, SMART attributes and health assessments

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Represents a single SMART attribute from disk diagnostics.
/// Contains the attribute ID, name, normalized values and failure state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeReading {
    /// Attribute identifier number
    pub id: u8,
    /// Human-readable attribute name (e.g., Reallocated_Sector_Ct)
    pub name: String,
    /// Current normalized value
    pub value: u8,
    /// Worst normalized value ever recorded for this attribute
    pub worst: u8,
    /// Failure threshold for this attribute
    pub threshold: u8,
    /// Raw counter as reported by the drive
    pub raw: u64,
    /// Pre-fail or old-age attribute
    pub attr_type: AttributeType,
    /// Whether the attribute has ever crossed its threshold
    pub when_failed: WhenFailed,
}

impl AttributeReading {
    /// Health status based on threshold comparison.
    /// Attributes without a threshold are always considered good.
    pub fn status(&self) -> AttributeStatus {
        let current = u32::from(self.value);
        let threshold = u32::from(self.threshold);
        if threshold > 0 && current <= threshold {
            AttributeStatus::Critical
        } else if threshold > 0 && current <= threshold + 10 {
            AttributeStatus::Warning
        } else {
            AttributeStatus::Good
        }
    }

    /// Distance between the current value and the failure threshold.
    pub fn margin(&self) -> i32 {
        i32::from(self.value) - i32::from(self.threshold)
    }
}

/// Vendor classification of a SMART attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Crossing the threshold predicts imminent failure
    PreFail,
    /// Informational wear/age counter
    OldAge,
}

impl AttributeType {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::PreFail => "pre_fail",
            AttributeType::OldAge => "old_age",
        }
    }
}

impl FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre_fail" => Ok(AttributeType::PreFail),
            "old_age" => Ok(AttributeType::OldAge),
            other => Err(other.to_string()),
        }
    }
}

/// "WHEN_FAILED" column of the SMART attribute table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhenFailed {
    #[default]
    Never,
    InThePast,
    FailingNow,
}

impl WhenFailed {
    pub fn as_str(self) -> &'static str {
        match self {
            WhenFailed::Never => "never",
            WhenFailed::InThePast => "in_the_past",
            WhenFailed::FailingNow => "failing_now",
        }
    }
}

impl FromStr for WhenFailed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(WhenFailed::Never),
            "in_the_past" => Ok(WhenFailed::InThePast),
            "failing_now" => Ok(WhenFailed::FailingNow),
            other => Err(other.to_string()),
        }
    }
}

/// Health status classification for SMART attributes.
/// Determines if an attribute is healthy, approaching failure, or critical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeStatus {
    /// Attribute is within normal operating parameters
    Good,
    /// Attribute is approaching threshold (within 10 units)
    Warning,
    /// Attribute has reached its failure threshold
    Critical,
}

impl AttributeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeStatus::Good => "good",
            AttributeStatus::Warning => "warning",
            AttributeStatus::Critical => "critical",
        }
    }
}

/// One diagnostic snapshot of a drive, produced by the acquisition layer.
/// Aggregates device details, temperature, usage counters and SMART attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    /// Device identifier (e.g., /dev/nvme0n1, /dev/sda); must be stable across runs
    pub device: String,
    /// Manufacturer model name
    pub model: String,
    /// Serial number for unique identification
    pub serial: String,
    /// Firmware version string
    pub firmware: Option<String>,
    /// Raw capacity in bytes
    pub capacity_bytes: u64,
    /// Current temperature in Celsius, 0 when not reported
    pub temperature: i32,
    /// Total hours the drive has been powered on
    pub power_on_hours: u64,
    /// Rotational speed in RPM (0 for SSDs)
    pub rotation_rate: u32,
    /// Number of power on/off cycles
    pub power_cycles: Option<u64>,
    /// Count of unsafe shutdowns (power loss)
    pub unsafe_shutdowns: Option<u64>,
    /// Drive-reported endurance consumption, e.g. NVMe "Percentage Used"
    pub percentage_used: Option<u8>,
    /// SMART attributes in the order the drive reported them
    pub attributes: Vec<AttributeReading>,
}

impl AttributeSnapshot {
    /// Creates an empty snapshot with default values.
    /// Only the device path is required; everything else is zero or empty.
    pub fn empty(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            model: String::new(),
            serial: String::new(),
            firmware: None,
            capacity_bytes: 0,
            temperature: 0,
            power_on_hours: 0,
            rotation_rate: 0,
            power_cycles: None,
            unsafe_shutdowns: None,
            percentage_used: None,
            attributes: vec![],
        }
    }

    pub fn is_ssd(&self) -> bool {
        self.rotation_rate == 0
    }

    pub fn attribute(&self, id: u8) -> Option<&AttributeReading> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

/// Severity of a detected issue, ordered info < warning < critical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall drive health, ordered good < warning < critical < failing < unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Good,
    Warning,
    Critical,
    Failing,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
            HealthStatus::Failing => "failing",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(HealthStatus::Good),
            "warning" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            "failing" => Ok(HealthStatus::Failing),
            "unknown" => Ok(HealthStatus::Unknown),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found while analyzing a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// Short machine-readable code (e.g., HIGH_TEMP_CRITICAL)
    pub code: String,
    pub description: String,
    /// SMART attribute the issue originates from, if any
    pub attribute_id: Option<u8>,
    /// Value shown next to the issue (e.g., "65°C", "12 sectors")
    pub value: String,
}

impl Issue {
    pub fn new(
        severity: Severity,
        code: &str,
        description: impl Into<String>,
        attribute_id: Option<u8>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.to_string(),
            description: description.into(),
            attribute_id,
            value: value.into(),
        }
    }
}

/// Endurance information derived for solid-state drives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SsdWearInfo {
    /// Raw wear-leveling count, when the drive exposes it
    pub wear_leveling_count: Option<u64>,
    /// Average program/erase cycles, when the drive exposes it
    pub program_erase_count: Option<u64>,
    /// Rated endurance consumed, 0-100
    pub percent_used: f64,
    /// 100 - percent_used
    pub remaining_life: f64,
    /// Power-on time left if wear continues at the observed pace
    pub estimated_lifespan: Option<Duration>,
    pub wear_status: HealthStatus,
}

/// Scored health assessment of one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub device: String,
    pub overall_health: HealthStatus,
    pub predicted_failure: bool,
    /// Failure score in [0, 100]
    pub failure_probability: f64,
    pub time_to_failure: Option<Duration>,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
    pub ssd_wear: Option<SsdWearInfo>,
}

impl AnalysisResult {
    /// Result returned when no snapshot was available.
    pub fn unknown(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            overall_health: HealthStatus::Unknown,
            predicted_failure: false,
            failure_probability: 0.0,
            time_to_failure: None,
            issues: vec![],
            recommendations: vec![],
            ssd_wear: None,
        }
    }

    /// Number of issues with exactly the given severity.
    pub fn count_issues(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_issue(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}
