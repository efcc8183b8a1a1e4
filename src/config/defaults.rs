// Default thresholds and settings shared by the configuration structs

/// Temperature (°C) at which a warning issue is raised.
pub const DEFAULT_TEMP_WARNING: i32 = 50;
/// Temperature (°C) at which a critical issue is raised.
pub const DEFAULT_TEMP_CRITICAL: i32 = 60;
/// SSD percent-used at which wear becomes a warning.
pub const DEFAULT_WEAR_WARNING: f64 = 80.0;
/// SSD percent-used at which wear becomes critical.
pub const DEFAULT_WEAR_CRITICAL: f64 = 90.0;

/// History rows older than this are removed by retention cleanup.
pub const DEFAULT_RETENTION_DAYS: u64 = 90;
/// Directory created under the user config dir.
pub const APP_DIR_NAME: &str = "drive-health";
pub const HISTORY_FILE_NAME: &str = "history.db";

pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_COOLDOWN_MINUTES: u64 = 60;
