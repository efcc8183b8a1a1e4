// SSD endurance derivation from wear-indicator attributes

use std::time::Duration;

use super::attributes::{self, Interpretation, WEAR_INDICATORS};
use crate::config::AnalyzerConfig;
use crate::models::{AttributeSnapshot, HealthStatus, SsdWearInfo};

/// Derives wear information for a solid-state drive.
///
/// Returns `None` for rotational drives and for SSDs that expose neither a
/// wear-indicator attribute nor a drive-reported percentage used.
pub fn assess(snapshot: &AttributeSnapshot, config: &AnalyzerConfig) -> Option<SsdWearInfo> {
    if !snapshot.is_ssd() {
        return None;
    }

    let percent_used = percent_used_from_attributes(snapshot)
        .or_else(|| snapshot.percentage_used.map(f64::from))?
        .clamp(0.0, 100.0);

    let wear_leveling_count =
        attributes::find(&snapshot.attributes, Interpretation::WearLevelingCount).map(|r| r.raw);
    let program_erase_count =
        attributes::find(&snapshot.attributes, Interpretation::ProgramEraseCount).map(|r| r.raw);

    Some(SsdWearInfo {
        wear_leveling_count,
        program_erase_count,
        percent_used,
        remaining_life: 100.0 - percent_used,
        estimated_lifespan: estimate_lifespan(snapshot.power_on_hours, percent_used),
        wear_status: wear_status(percent_used, config),
    })
}

fn percent_used_from_attributes(snapshot: &AttributeSnapshot) -> Option<f64> {
    WEAR_INDICATORS.iter().find_map(|&interpretation| {
        let reading = attributes::find(&snapshot.attributes, interpretation)?;
        let used = match interpretation {
            Interpretation::LifetimeUsed => reading.raw as f64,
            _ => 100.0 - f64::from(reading.value),
        };
        Some(used)
    })
}

/// Power-on time left if the drive keeps wearing at its lifetime average pace.
fn estimate_lifespan(power_on_hours: u64, percent_used: f64) -> Option<Duration> {
    if power_on_hours == 0 || percent_used <= 0.0 {
        return None;
    }
    let hours_left = power_on_hours as f64 * (100.0 - percent_used) / percent_used;
    Duration::try_from_secs_f64(hours_left * 3600.0).ok()
}

pub fn wear_status(percent_used: f64, config: &AnalyzerConfig) -> HealthStatus {
    if percent_used >= config.wear_critical {
        HealthStatus::Critical
    } else if percent_used >= config.wear_warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Good
    }
}
