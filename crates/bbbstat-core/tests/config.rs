use std::collections::HashMap;

use bbbstat_core::config::{DisplayConfig, StoreConfig, DEFAULT_REGION, DEFAULT_TABLE};
use bbbstat_core::normalize::{NormalizeConfig, TimeShift};
use bbbstat_core::{Column, DashboardError};
use chrono::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn store_config_requires_both_credentials() {
    let err = StoreConfig::from_lookup(lookup(&[("SECRET_KEY", "s")])).expect_err("missing key");
    assert!(matches!(err, DashboardError::MissingEnv("ACCESS_KEY")));

    let err = StoreConfig::from_lookup(lookup(&[("ACCESS_KEY", "a"), ("SECRET_KEY", "")]))
        .expect_err("empty secret");
    assert!(matches!(err, DashboardError::MissingEnv("SECRET_KEY")));
}

#[test]
fn store_config_defaults_and_hides_secrets() {
    let config = StoreConfig::from_lookup(lookup(&[("ACCESS_KEY", "AKIA123"), ("SECRET_KEY", "hunter2")]))
        .expect("config");
    assert_eq!(config.table, DEFAULT_TABLE);
    assert_eq!(config.region, DEFAULT_REGION);
    assert_eq!(config.endpoint, None);

    let debug = format!("{config:?}");
    assert!(!debug.contains("AKIA123"));
    assert!(!debug.contains("hunter2"));

    let local = StoreConfig::from_lookup(lookup(&[
        ("ACCESS_KEY", "a"),
        ("SECRET_KEY", "s"),
        ("BBBSTAT_TABLE", "bbb_stat_test"),
        ("BBBSTAT_DYNAMODB_ENDPOINT", "http://localhost:8000"),
    ]))
    .expect("config");
    assert_eq!(local.table, "bbb_stat_test");
    assert_eq!(local.endpoint.as_deref(), Some("http://localhost:8000"));
}

#[test]
fn normalize_config_reads_shift_and_interval() {
    let defaults = NormalizeConfig::from_lookup(lookup(&[])).expect("defaults");
    assert_eq!(defaults, NormalizeConfig::default());
    assert_eq!(defaults.shift, TimeShift::Fixed(Duration::hours(2)));
    assert_eq!(defaults.round_to, Duration::minutes(15));

    let custom = NormalizeConfig::from_lookup(lookup(&[
        ("BBBSTAT_UTC_OFFSET_HOURS", "1"),
        ("BBBSTAT_ROUND_MINUTES", "30"),
    ]))
    .expect("custom");
    assert_eq!(custom.shift, TimeShift::Fixed(Duration::hours(1)));
    assert_eq!(custom.round_to, Duration::minutes(30));

    let zoned = NormalizeConfig::from_lookup(lookup(&[
        ("BBBSTAT_UTC_OFFSET_HOURS", "1"),
        ("BBBSTAT_TIMEZONE", "Europe/Berlin"),
    ]))
    .expect("zoned");
    assert_eq!(zoned.shift, TimeShift::Zone(chrono_tz::Europe::Berlin));
}

#[test]
fn normalize_config_rejects_bad_values() {
    for pairs in [
        [("BBBSTAT_ROUND_MINUTES", "0")],
        [("BBBSTAT_ROUND_MINUTES", "quarter")],
        [("BBBSTAT_UTC_OFFSET_HOURS", "2.5")],
        [("BBBSTAT_TIMEZONE", "Mars/Olympus")],
        [("BBBSTAT_UTC_OFFSET_HOURS", "9223372036854775807")],
        [("BBBSTAT_ROUND_MINUTES", "9223372036854775807")],
    ] {
        let err = NormalizeConfig::from_lookup(lookup(&pairs)).expect_err("invalid");
        assert!(matches!(err, DashboardError::Config(_)), "{pairs:?}");
    }
}

#[test]
fn display_config_merges_toml_over_defaults() {
    let config = DisplayConfig::from_toml_str(
        r#"
        page_size = 25

        [labels]
        meetingCount = "Konferenzen"
        "#,
    )
    .expect("toml");

    assert_eq!(config.page_size, 25);
    assert_eq!(config.default_month, 3);
    assert_eq!(config.month_marks.len(), 5);
    assert_eq!(config.label(Column::MeetingCount), "Konferenzen");
    assert_eq!(config.label(Column::VoiceParticipantCount), "Sprecher");

    let marks = DisplayConfig::from_toml_str(
        r#"
        default_month = 9

        [[month_marks]]
        month = 9
        label = "September"
        "#,
    )
    .expect("toml");
    assert_eq!(marks.month_marks.len(), 1);
    assert_eq!(marks.month_marks[0].label, "September");
}

#[test]
fn display_config_validation() {
    for contents in [
        "page_size = 0",
        "default_month = 13",
        "[[month_marks]]\nmonth = 0\nlabel = \"Null\"",
        "[labels]\nroomCount = \"Räume\"",
    ] {
        let err = DisplayConfig::from_toml_str(contents).expect_err(contents);
        assert!(matches!(err, DashboardError::Config(_)), "{contents}");
    }

    let err = DisplayConfig::from_toml_str("page_size = \"ten\"").expect_err("type");
    assert!(matches!(err, DashboardError::Toml(_)));
}

#[test]
fn display_config_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("bbbstat-display-{}.toml", std::process::id()));
    std::fs::write(&path, "page_size = 5\n").expect("write");
    let loaded = DisplayConfig::load(&path);
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.expect("load").page_size, 5);

    let missing = DisplayConfig::load(std::path::Path::new("/nonexistent/bbbstat.toml"));
    assert!(matches!(missing, Err(DashboardError::Io(_))));
}
