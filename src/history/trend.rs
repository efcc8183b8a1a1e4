// Trend math over time-ordered history samples

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Fewer samples than this are always classified as stable.
pub const MIN_TREND_SAMPLES: usize = 3;
/// Slope (per sample) beyond which temperature is rising or falling.
pub const TEMPERATURE_SLOPE_THRESHOLD: f64 = 0.5;
/// Slope (per sample) of the composite health score beyond which health changes.
pub const HEALTH_SLOPE_THRESHOLD: f64 = 1.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Direction of a metric over the queried window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

/// Direction of drive health over the queried window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTrend {
    Improving,
    Stable,
    Degrading,
}

/// Trend summary for one device over a time window. Computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub device: String,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub avg_temperature: f64,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub temperature_trend: Trend,
    pub health_trend: HealthTrend,
    /// SSD percent-used gained per day
    pub wear_rate_per_day: f64,
    pub estimated_failure_date: Option<DateTime<Utc>>,
    pub record_count: usize,
}

/// Temperature aggregates over one window. All zero when nothing was reported.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureStats {
    pub avg: f64,
    pub min: i32,
    pub max: i32,
}

impl TemperatureStats {
    /// Single pass over reported temperatures.
    pub fn from_readings(temperatures: &[i32]) -> Self {
        let mut iter = temperatures.iter().copied();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let (mut sum, mut min, mut max) = (i64::from(first), first, first);
        for t in iter {
            sum += i64::from(t);
            min = min.min(t);
            max = max.max(t);
        }
        Self {
            avg: sum as f64 / temperatures.len() as f64,
            min,
            max,
        }
    }
}

/// Ordinary least-squares slope of `values` against their index.
/// Returns `None` below [`MIN_TREND_SAMPLES`].
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_TREND_SAMPLES {
        return None;
    }
    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return Some(0.0);
    }
    Some((n * sum_xy - sum_x * sum_y) / denominator)
}

pub fn classify(values: &[f64], threshold: f64) -> Trend {
    match linear_slope(values) {
        Some(slope) if slope > threshold => Trend::Increasing,
        Some(slope) if slope < -threshold => Trend::Decreasing,
        _ => Trend::Stable,
    }
}

pub fn temperature_trend(temperatures: &[f64]) -> Trend {
    classify(temperatures, TEMPERATURE_SLOPE_THRESHOLD)
}

/// Composite score where higher means less healthy.
pub fn health_score(critical_issues: u32, warning_issues: u32, failure_probability: f64) -> f64 {
    10.0 * f64::from(critical_issues) + 3.0 * f64::from(warning_issues) + failure_probability
}

/// A rising composite score means health is degrading.
pub fn health_trend(scores: &[f64]) -> HealthTrend {
    match classify(scores, HEALTH_SLOPE_THRESHOLD) {
        Trend::Increasing => HealthTrend::Degrading,
        Trend::Decreasing => HealthTrend::Improving,
        Trend::Stable => HealthTrend::Stable,
    }
}

/// Percent-used gained per day between the earliest and latest sample.
///
/// `samples` must be time-ordered and only contain readings with percent-used > 0.
pub fn wear_rate(samples: &[(DateTime<Utc>, f64)]) -> f64 {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return 0.0;
    };
    if samples.len() < 2 {
        return 0.0;
    }
    let days = (last.0 - first.0).num_seconds() as f64 / SECONDS_PER_DAY;
    if days <= 0.0 {
        return 0.0;
    }
    (last.1 - first.1) / days
}

/// Date at which percent-used reaches 100 if wear continues at `rate_per_day`.
pub fn project_failure_date(
    last_sample: (DateTime<Utc>, f64),
    rate_per_day: f64,
) -> Option<DateTime<Utc>> {
    if rate_per_day.is_nan() || rate_per_day <= 0.0 {
        return None;
    }
    let (at, percent_used) = last_sample;
    let remaining = (100.0 - percent_used).max(0.0);
    let seconds = remaining / rate_per_day * SECONDS_PER_DAY;
    if !seconds.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_seconds(seconds as i64)?;
    at.checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
    }

    #[test]
    fn temperature_stats_in_one_pass() {
        let stats = TemperatureStats::from_readings(&[40, 45, 50, 55, 60]);
        assert_eq!(stats, TemperatureStats { avg: 50.0, min: 40, max: 60 });
        assert_eq!(TemperatureStats::from_readings(&[]), TemperatureStats::default());
        assert_eq!(TemperatureStats::from_readings(&[37]).avg, 37.0);
    }

    #[test]
    fn rising_temperatures_are_increasing() {
        assert_eq!(temperature_trend(&[40.0, 45.0, 50.0, 55.0, 60.0]), Trend::Increasing);
        assert_eq!(temperature_trend(&[60.0, 55.0, 50.0, 45.0, 40.0]), Trend::Decreasing);
    }

    #[test]
    fn constant_values_are_stable() {
        assert_eq!(linear_slope(&[42.0, 42.0, 42.0]), Some(0.0));
        assert_eq!(temperature_trend(&[42.0, 42.0, 42.0, 42.0]), Trend::Stable);
    }

    #[test]
    fn short_series_is_stable() {
        assert_eq!(linear_slope(&[10.0, 90.0]), None);
        assert_eq!(temperature_trend(&[10.0, 90.0]), Trend::Stable);
        assert_eq!(temperature_trend(&[]), Trend::Stable);
        assert_eq!(health_trend(&[0.0, 100.0]), HealthTrend::Stable);
    }

    #[test]
    fn slope_thresholds_are_exclusive() {
        // slope of exactly 0.5 stays stable
        assert_eq!(temperature_trend(&[40.0, 40.5, 41.0]), Trend::Stable);
        assert_eq!(temperature_trend(&[40.0, 40.6, 41.2]), Trend::Increasing);
    }

    #[test]
    fn rising_score_is_degrading() {
        let scores = [
            health_score(0, 0, 0.0),
            health_score(0, 1, 10.0),
            health_score(1, 1, 40.0),
        ];
        assert_eq!(health_trend(&scores), HealthTrend::Degrading);
        let reversed: Vec<f64> = scores.iter().rev().copied().collect();
        assert_eq!(health_trend(&reversed), HealthTrend::Improving);
    }

    #[test]
    fn wear_rate_uses_endpoints_only() {
        let samples = [(day(0), 10.0), (day(5), 50.0), (day(10), 20.0)];
        assert_eq!(wear_rate(&samples), 1.0);
    }

    #[test]
    fn wear_rate_degrades_to_zero() {
        assert_eq!(wear_rate(&[]), 0.0);
        assert_eq!(wear_rate(&[(day(0), 10.0)]), 0.0);
        assert_eq!(wear_rate(&[(day(0), 10.0), (day(0), 20.0)]), 0.0);
    }

    #[test]
    fn failure_date_projects_remaining_percent() {
        let date = project_failure_date((day(10), 20.0), 2.0).unwrap();
        assert_eq!(date, day(50));
        assert!(project_failure_date((day(10), 20.0), 0.0).is_none());
        assert!(project_failure_date((day(10), 20.0), -1.0).is_none());
        assert_eq!(project_failure_date((day(10), 100.0), 1.0), Some(day(10)));
    }

    #[test]
    fn absurdly_slow_wear_has_no_date() {
        assert!(project_failure_date((day(0), 1.0), 1e-300).is_none());
    }
}
