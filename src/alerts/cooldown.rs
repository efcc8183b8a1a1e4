// Per-device alert cooldown tracking

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Remembers when each device last alerted so repeated alerts inside the
/// cooldown window can be suppressed.
#[derive(Debug)]
pub struct CooldownTracker {
    cooldown: TimeDelta,
    last_alert: HashMap<String, DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
            last_alert: HashMap::new(),
        }
    }

    /// True while `device` is still inside the window opened by its last alert.
    pub fn in_cooldown(&self, device: &str, now: DateTime<Utc>) -> bool {
        self.last_alert
            .get(device)
            .is_some_and(|last| now.signed_duration_since(*last) < self.cooldown)
    }

    pub fn mark_alerted(&mut self, device: &str, now: DateTime<Utc>) {
        self.last_alert.insert(device.to_string(), now);
    }

    pub fn clear(&mut self, device: &str) -> bool {
        self.last_alert.remove(device).is_some()
    }

    pub fn last_alert(&self, device: &str) -> Option<DateTime<Utc>> {
        self.last_alert.get(device).copied()
    }
}
