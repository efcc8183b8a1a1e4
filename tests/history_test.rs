//! History store integration tests: ordering, filtering, trends and
//! file-backed persistence.

use chrono::{DateTime, SubsecRound, TimeDelta, TimeZone, Utc};

use drive_health::{
    AnalysisResult, AnalyzerConfig, AttributeReading, AttributeSnapshot, AttributeType,
    HealthAnalyzer, HealthStatus, HealthTrend, HistoryStore, Severity, Trend, WhenFailed,
};

fn attr(id: u8, name: &str, value: u8, threshold: u8, raw: u64) -> AttributeReading {
    AttributeReading {
        id,
        name: name.to_string(),
        value,
        worst: value,
        threshold,
        raw,
        attr_type: AttributeType::PreFail,
        when_failed: WhenFailed::Never,
    }
}

fn hdd(device: &str, temperature: i32) -> AttributeSnapshot {
    let mut snap = AttributeSnapshot::empty(device);
    snap.model = "ST4000DM004".to_string();
    snap.serial = "ZFN0ABCD".to_string();
    snap.rotation_rate = 5900;
    snap.power_on_hours = 12_000;
    snap.temperature = temperature;
    snap.attributes = vec![
        attr(5, "Reallocated_Sector_Ct", 100, 10, 0),
        attr(9, "Power_On_Hours", 86, 0, 12_000),
    ];
    snap
}

fn ssd(device: &str, life_left: u8) -> AttributeSnapshot {
    let mut snap = AttributeSnapshot::empty(device);
    snap.temperature = 35;
    snap.power_on_hours = 5_000;
    snap.attributes = vec![attr(231, "SSD_Life_Left", life_left, 0, 0)];
    snap
}

fn analyze(snap: &AttributeSnapshot) -> AnalysisResult {
    HealthAnalyzer::new(AnalyzerConfig::default()).analyze(Some(snap))
}

fn base() -> DateTime<Utc> {
    (Utc::now() - TimeDelta::days(10)).trunc_subsecs(0)
}

fn month_ago() -> DateTime<Utc> {
    Utc::now() - TimeDelta::days(30)
}

/// Records one HDD snapshot per hour starting ten days ago; returns the first timestamp.
fn record_temperatures(store: &HistoryStore, device: &str, temps: &[i32]) -> DateTime<Utc> {
    let start = base();
    for (i, temp) in temps.iter().enumerate() {
        let snap = hdd(device, *temp);
        store
            .record_analysis_at(&snap, &analyze(&snap), start + TimeDelta::hours(i as i64))
            .unwrap();
    }
    start
}

#[test]
fn history_returns_all_records_newest_first() {
    let store = HistoryStore::open_in_memory().unwrap();
    record_temperatures(&store, "/dev/sda", &[30, 31, 32, 33, 34, 35, 36]);

    let records = store.get_history("/dev/sda", month_ago(), None).unwrap();
    assert_eq!(records.len(), 7);
    for pair in records.windows(2) {
        assert!(pair[0].recorded_at > pair[1].recorded_at);
    }
    assert_eq!(records[0].temperature, 36);
    assert_eq!(records[6].temperature, 30);
}

#[test]
fn history_respects_limit_and_since() {
    let store = HistoryStore::open_in_memory().unwrap();
    let start = record_temperatures(&store, "/dev/sda", &[30, 31, 32, 33, 34]);

    let limited = store.get_history("/dev/sda", month_ago(), Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].temperature, 34);

    let since = start + TimeDelta::hours(3);
    let recent = store.get_history("/dev/sda", since, None).unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|r| r.recorded_at >= since));

    assert!(store.get_history("/dev/sdz", month_ago(), None).unwrap().is_empty());
}

#[test]
fn devices_are_distinct_and_sorted() {
    let store = HistoryStore::open_in_memory().unwrap();
    record_temperatures(&store, "/dev/sdb", &[30, 31]);
    record_temperatures(&store, "/dev/nvme0n1", &[40]);
    record_temperatures(&store, "/dev/sda", &[35]);

    assert_eq!(
        store.get_devices().unwrap(),
        vec!["/dev/nvme0n1", "/dev/sda", "/dev/sdb"]
    );
}

#[test]
fn recorded_issue_counts_match_result() {
    let store = HistoryStore::open_in_memory().unwrap();
    let mut snap = hdd("/dev/sda", 65);
    snap.attributes = vec![
        attr(5, "Reallocated_Sector_Ct", 90, 10, 20),
        attr(197, "Current_Pending_Sector", 100, 0, 4),
        attr(1, "Raw_Read_Error_Rate", 55, 50, 0),
    ];
    let result = analyze(&snap);
    let id = store.record_analysis(&snap, &result).unwrap();

    let record = store.latest_record("/dev/sda").unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(
        record.critical_issues as usize,
        result.count_issues(Severity::Critical)
    );
    assert_eq!(
        record.warning_issues as usize,
        result.count_issues(Severity::Warning)
    );
    assert_eq!(record.critical_issues, 2);
    assert_eq!(record.warning_issues, 2);
    assert_eq!(record.overall_health, result.overall_health);
    assert_eq!(record.failure_probability, result.failure_probability);
    assert_eq!(record.model, "ST4000DM004");

    assert_eq!(store.record_attributes(id).unwrap(), snap.attributes);
    assert_eq!(store.record_issues(id).unwrap(), result.issues);
}

#[test]
fn ssd_wear_columns_are_stored() {
    let store = HistoryStore::open_in_memory().unwrap();
    let snap = ssd("/dev/nvme0n1", 15);
    let result = analyze(&snap);
    store.record_analysis(&snap, &result).unwrap();

    let record = store.latest_record("/dev/nvme0n1").unwrap().unwrap();
    assert_eq!(record.percent_used, Some(85.0));
    assert_eq!(record.remaining_life, Some(15.0));
    assert_eq!(record.overall_health, HealthStatus::Warning);
}

#[test]
fn rising_temperatures_trend_upwards() {
    let store = HistoryStore::open_in_memory().unwrap();
    record_temperatures(&store, "/dev/sda", &[40, 45, 50, 55, 60]);

    let report = store.get_trend("/dev/sda", month_ago()).unwrap();
    assert_eq!(report.device, "/dev/sda");
    assert_eq!(report.temperature_trend, Trend::Increasing);
    assert_eq!(report.min_temperature, 40);
    assert_eq!(report.max_temperature, 60);
    assert_eq!(report.avg_temperature, 50.0);
    assert_eq!(report.record_count, 5);
}

#[test]
fn constant_or_short_series_is_stable() {
    let store = HistoryStore::open_in_memory().unwrap();
    record_temperatures(&store, "/dev/sda", &[42, 42, 42, 42]);
    record_temperatures(&store, "/dev/sdb", &[20, 45]);

    let constant = store.get_trend("/dev/sda", month_ago()).unwrap();
    assert_eq!(constant.temperature_trend, Trend::Stable);
    assert_eq!(constant.health_trend, HealthTrend::Stable);

    let short = store.get_trend("/dev/sdb", month_ago()).unwrap();
    assert_eq!(short.temperature_trend, Trend::Stable);
    assert_eq!(short.record_count, 2);
}

#[test]
fn empty_window_is_neutral() {
    let store = HistoryStore::open_in_memory().unwrap();
    let report = store.get_trend("/dev/sda", month_ago()).unwrap();
    assert_eq!(report.record_count, 0);
    assert_eq!(report.avg_temperature, 0.0);
    assert_eq!(report.temperature_trend, Trend::Stable);
    assert_eq!(report.health_trend, HealthTrend::Stable);
    assert_eq!(report.wear_rate_per_day, 0.0);
    assert!(report.estimated_failure_date.is_none());
}

#[test]
fn worsening_results_trend_degrading() {
    let store = HistoryStore::open_in_memory().unwrap();
    let start = base();
    for (i, raw) in [0u64, 10, 60, 150].iter().enumerate() {
        let mut snap = hdd("/dev/sda", 35);
        snap.attributes = vec![attr(5, "Reallocated_Sector_Ct", 100, 10, *raw)];
        store
            .record_analysis_at(&snap, &analyze(&snap), start + TimeDelta::days(i as i64))
            .unwrap();
    }

    let report = store.get_trend("/dev/sda", month_ago()).unwrap();
    assert_eq!(report.health_trend, HealthTrend::Degrading);
}

#[test]
fn wear_rate_and_failure_projection() {
    let store = HistoryStore::open_in_memory().unwrap();
    let start = base();
    // 80% -> 70% -> 60% life left over 8 days: 2.5 percent used per day
    for (day, life_left) in [(0i64, 80u8), (4, 70), (8, 60)] {
        let snap = ssd("/dev/nvme0n1", life_left);
        store
            .record_analysis_at(&snap, &analyze(&snap), start + TimeDelta::days(day))
            .unwrap();
    }

    let report = store.get_trend("/dev/nvme0n1", month_ago()).unwrap();
    assert!((report.wear_rate_per_day - 2.5).abs() < 1e-9);
    // 60% left at 2.5%/day is 24 days after the last sample
    let expected = start + TimeDelta::days(8) + TimeDelta::days(24);
    let projected = report.estimated_failure_date.unwrap();
    assert!((projected - expected).num_seconds().abs() <= 1);
}

#[test]
fn single_wear_sample_has_no_rate() {
    let store = HistoryStore::open_in_memory().unwrap();
    let snap = ssd("/dev/nvme0n1", 50);
    store.record_analysis(&snap, &analyze(&snap)).unwrap();

    let report = store.get_trend("/dev/nvme0n1", month_ago()).unwrap();
    assert_eq!(report.wear_rate_per_day, 0.0);
    assert!(report.estimated_failure_date.is_none());
}

#[test]
fn attribute_series_tracks_raw_growth() {
    let store = HistoryStore::open_in_memory().unwrap();
    let start = base();
    for (i, raw) in [1u64, 4, 9].iter().enumerate() {
        let mut snap = hdd("/dev/sda", 35);
        snap.attributes = vec![attr(5, "Reallocated_Sector_Ct", 100, 10, *raw)];
        store
            .record_analysis_at(&snap, &analyze(&snap), start + TimeDelta::hours(i as i64))
            .unwrap();
    }

    let series = store.attribute_series("/dev/sda", 5, month_ago()).unwrap();
    let raws: Vec<u64> = series.iter().map(|(_, raw)| *raw).collect();
    assert_eq!(raws, vec![1, 4, 9]);
    assert!(store.attribute_series("/dev/sda", 197, month_ago()).unwrap().is_empty());
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.db");

    {
        let store = HistoryStore::open(&path).unwrap();
        record_temperatures(&store, "/dev/sda", &[30, 31, 32]);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    let store = HistoryStore::open(&path).unwrap();
    assert_eq!(store.get_history("/dev/sda", month_ago(), None).unwrap().len(), 3);
    assert_eq!(store.get_devices().unwrap(), vec!["/dev/sda"]);
}

#[test]
fn retention_from_config() {
    let store = HistoryStore::open_in_memory().unwrap();
    let snap = hdd("/dev/sda", 30);
    let result = analyze(&snap);
    store
        .record_analysis_at(&snap, &result, Utc::now() - TimeDelta::days(120))
        .unwrap();
    store.record_analysis(&snap, &result).unwrap();

    let removed = store
        .apply_retention(&drive_health::HistoryConfig::default())
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.get_history("/dev/sda", month_ago(), None).unwrap().len(), 1);
}

#[test]
fn windows_past_year_9999_compare_by_time() {
    let store = HistoryStore::open_in_memory().unwrap();
    let snap = hdd("/dev/sda", 40);
    let result = analyze(&snap);
    store.record_analysis(&snap, &result).unwrap();

    let far_future = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    assert!(store.get_history("/dev/sda", far_future, None).unwrap().is_empty());
    assert_eq!(store.get_trend("/dev/sda", far_future).unwrap().record_count, 0);
    assert!(store.attribute_series("/dev/sda", 5, far_future).unwrap().is_empty());

    let later = Utc.with_ymd_and_hms(10001, 6, 1, 0, 0, 0).unwrap();
    store.record_analysis_at(&snap, &result, later).unwrap();
    let records = store.get_history("/dev/sda", month_ago(), None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].recorded_at, later);
    assert_eq!(store.get_history("/dev/sda", far_future, None).unwrap().len(), 1);
}
