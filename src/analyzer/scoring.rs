// Failure prediction score, overall health aggregation and recommendations

use super::attributes::{self, Criticality};
use super::codes;
use crate::models::{AttributeReading, HealthStatus, Issue, Severity, SsdWearInfo};

/// Scores at or above this value predict failure.
pub const PREDICTED_FAILURE_SCORE: f64 = 50.0;

const CRITICAL_ISSUE_WEIGHT: f64 = 30.0;
const WARNING_ISSUE_WEIGHT: f64 = 10.0;
const REALLOCATED_BONUS_ABOVE: u64 = 50;
const REALLOCATED_BONUS: f64 = 20.0;

/// Heuristic failure score in [0, 100].
pub fn failure_score(issues: &[Issue], wear: Option<&SsdWearInfo>, reallocated: u64) -> f64 {
    let critical = issues.iter().filter(|i| i.severity == Severity::Critical).count();
    let warning = issues.iter().filter(|i| i.severity == Severity::Warning).count();

    let mut score = CRITICAL_ISSUE_WEIGHT * critical as f64 + WARNING_ISSUE_WEIGHT * warning as f64;
    if let Some(wear) = wear {
        score += wear_bonus(wear.percent_used);
    }
    if reallocated > REALLOCATED_BONUS_ABOVE {
        score += REALLOCATED_BONUS;
    }
    score.clamp(0.0, 100.0)
}

fn wear_bonus(percent_used: f64) -> f64 {
    if percent_used >= 95.0 {
        40.0
    } else if percent_used >= 90.0 {
        25.0
    } else if percent_used >= 80.0 {
        15.0
    } else {
        0.0
    }
}

/// Critical issues win over predicted failure, which wins over warnings.
/// SSD wear can only raise the result.
pub fn overall_health(
    issues: &[Issue],
    predicted_failure: bool,
    wear: Option<&SsdWearInfo>,
) -> HealthStatus {
    let mut health = if issues.iter().any(|i| i.severity == Severity::Critical) {
        HealthStatus::Critical
    } else if predicted_failure {
        HealthStatus::Failing
    } else if issues.iter().any(|i| i.severity == Severity::Warning) {
        HealthStatus::Warning
    } else {
        HealthStatus::Good
    };

    if let Some(wear) = wear {
        if wear.wear_status > health {
            health = wear.wear_status;
        }
    }
    health
}

/// Builds the recommendation list. Order is fixed so identical inputs give identical text.
pub fn recommendations(
    health: HealthStatus,
    predicted_failure: bool,
    issues: &[Issue],
    wear: Option<&SsdWearInfo>,
    readings: &[AttributeReading],
) -> Vec<String> {
    let has = |code: &str| issues.iter().any(|i| i.code == code);
    let mut out = Vec::new();

    if matches!(health, HealthStatus::Critical | HealthStatus::Failing) {
        out.push("Back up all data on this drive immediately.".to_string());
    }
    if predicted_failure {
        out.push(
            "Failure is predicted for this drive; schedule a replacement as soon as possible."
                .to_string(),
        );
    }
    if critical_attribute_failing(readings) {
        out.push("A critical SMART attribute is failing; replace the drive.".to_string());
    }
    if has(codes::HIGH_TEMP_CRITICAL) || has(codes::HIGH_TEMP_WARNING) {
        out.push(
            "Improve cooling and airflow around the drive to lower its temperature.".to_string(),
        );
    }
    if has(codes::REALLOCATED_SECTORS)
        || has(codes::PENDING_SECTORS)
        || has(codes::UNCORRECTABLE_SECTORS)
    {
        out.push(
            "Run an extended self-test and watch whether the bad sector count keeps growing."
                .to_string(),
        );
    }
    if has(codes::ATTRIBUTE_FAILED_PAST) {
        out.push(
            "Review the attributes that failed in the past for recurring problems.".to_string(),
        );
    }
    if has(codes::ATTRIBUTE_NEAR_THRESHOLD) {
        out.push(
            "Monitor attributes close to their failure threshold more frequently.".to_string(),
        );
    }
    if let Some(wear) = wear {
        if wear.wear_status >= HealthStatus::Warning {
            out.push(format!(
                "SSD has used {:.0}% of its rated endurance; consider replacement.",
                wear.percent_used
            ));
        }
    }

    if out.is_empty() && health == HealthStatus::Good {
        out.push("Drive is healthy; continue regular monitoring.".to_string());
    }
    out
}

fn critical_attribute_failing(readings: &[AttributeReading]) -> bool {
    readings.iter().any(|r| {
        r.when_failed == crate::models::WhenFailed::FailingNow
            && attributes::lookup(r).is_some_and(|spec| spec.criticality == Criticality::Critical)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity, code: &str) -> Issue {
        Issue::new(severity, code, "test", None, "")
    }

    fn wear(percent_used: f64, wear_status: HealthStatus) -> SsdWearInfo {
        SsdWearInfo {
            wear_leveling_count: None,
            program_erase_count: None,
            percent_used,
            remaining_life: 100.0 - percent_used,
            estimated_lifespan: None,
            wear_status,
        }
    }

    #[test]
    fn score_weights_issues() {
        let issues = vec![
            issue(Severity::Critical, "A"),
            issue(Severity::Warning, "B"),
            issue(Severity::Info, "C"),
        ];
        assert_eq!(failure_score(&issues, None, 0), 40.0);
    }

    #[test]
    fn score_adds_wear_and_reallocation_bonuses() {
        assert_eq!(failure_score(&[], Some(&wear(96.0, HealthStatus::Critical)), 0), 40.0);
        assert_eq!(failure_score(&[], Some(&wear(91.0, HealthStatus::Critical)), 0), 25.0);
        assert_eq!(failure_score(&[], Some(&wear(85.0, HealthStatus::Warning)), 0), 15.0);
        assert_eq!(failure_score(&[], Some(&wear(50.0, HealthStatus::Good)), 0), 0.0);
        assert_eq!(failure_score(&[], None, 51), 20.0);
        assert_eq!(failure_score(&[], None, 50), 0.0);
    }

    #[test]
    fn wear_tiers_start_at_their_edges() {
        assert_eq!(failure_score(&[], Some(&wear(95.0, HealthStatus::Critical)), 0), 40.0);
        assert_eq!(failure_score(&[], Some(&wear(94.9, HealthStatus::Critical)), 0), 25.0);
        assert_eq!(failure_score(&[], Some(&wear(90.0, HealthStatus::Critical)), 0), 25.0);
        assert_eq!(failure_score(&[], Some(&wear(89.9, HealthStatus::Warning)), 0), 15.0);
        assert_eq!(failure_score(&[], Some(&wear(80.0, HealthStatus::Warning)), 0), 15.0);
        assert_eq!(failure_score(&[], Some(&wear(79.9, HealthStatus::Good)), 0), 0.0);
    }

    #[test]
    fn score_is_clamped() {
        let issues: Vec<Issue> = (0..5).map(|_| issue(Severity::Critical, "X")).collect();
        assert_eq!(failure_score(&issues, None, 1_000), 100.0);
    }

    #[test]
    fn critical_beats_predicted_failure() {
        let issues = vec![issue(Severity::Critical, "X")];
        assert_eq!(overall_health(&issues, true, None), HealthStatus::Critical);
        assert_eq!(overall_health(&[], true, None), HealthStatus::Failing);
        assert_eq!(
            overall_health(&[issue(Severity::Warning, "W")], false, None),
            HealthStatus::Warning
        );
        assert_eq!(overall_health(&[], false, None), HealthStatus::Good);
    }

    #[test]
    fn wear_only_escalates() {
        let critical_wear = wear(92.0, HealthStatus::Critical);
        assert_eq!(overall_health(&[], false, Some(&critical_wear)), HealthStatus::Critical);

        let good_wear = wear(10.0, HealthStatus::Good);
        let issues = vec![issue(Severity::Warning, "W")];
        assert_eq!(overall_health(&issues, false, Some(&good_wear)), HealthStatus::Warning);
        assert_eq!(overall_health(&[], true, Some(&critical_wear)), HealthStatus::Failing);
    }

    #[test]
    fn healthy_drive_gets_single_recommendation() {
        let recs = recommendations(HealthStatus::Good, false, &[], None, &[]);
        assert_eq!(recs, vec!["Drive is healthy; continue regular monitoring.".to_string()]);
    }

    #[test]
    fn hot_critical_drive_recommends_backup_and_cooling() {
        let issues = vec![issue(Severity::Critical, codes::HIGH_TEMP_CRITICAL)];
        let recs = recommendations(HealthStatus::Critical, false, &issues, None, &[]);
        assert!(recs[0].contains("Back up"));
        assert!(recs.iter().any(|r| r.contains("cooling")));
        assert!(!recs.iter().any(|r| r.contains("continue regular monitoring")));
    }
}
