use std::env;
use std::fs;

use poker_core::config::{
    load, load_with_sources, ConfigError, TableConfig, ValueSource, CONFIG_PATH_ENV,
};
use serial_test::serial;

const KEYS: [&str; 5] = [
    CONFIG_PATH_ENV,
    "POKER_CORE_SMALL_BLIND",
    "POKER_CORE_BIG_BLIND",
    "POKER_CORE_SEAT_MAX",
    "POKER_CORE_RAKE_BPS",
];

fn clear_env() {
    for k in KEYS {
        env::remove_var(k);
    }
}

#[test]
#[serial]
fn defaults_without_file_or_env() {
    clear_env();
    let resolved = load_with_sources().unwrap();
    assert_eq!(resolved.config, TableConfig::default());
    assert_eq!(resolved.sources.big_blind, ValueSource::Default);
}

#[test]
#[serial]
fn file_then_env_precedence() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.toml");
    fs::write(
        &path,
        "small_blind = 25\nbig_blind = 50\nbuy_in_min = 1000\nrake_bps = 250\n\n[protocol]\nreveal_timeout_ms = 5000\n",
    )
    .unwrap();
    env::set_var(CONFIG_PATH_ENV, &path);
    env::set_var("POKER_CORE_BIG_BLIND", "60");

    let resolved = load_with_sources().unwrap();
    clear_env();

    assert_eq!(resolved.config.small_blind, 25);
    assert_eq!(resolved.sources.small_blind, ValueSource::File);
    assert_eq!(resolved.config.big_blind, 60);
    assert_eq!(resolved.sources.big_blind, ValueSource::Env);
    assert_eq!(resolved.config.rake_bps, 250);
    assert_eq!(resolved.config.buy_in_min, 1000);
    assert_eq!(resolved.config.protocol.reveal_timeout_ms, 5000);
    assert_eq!(resolved.config.protocol.commit_timeout_ms, 10_000);
    assert_eq!(resolved.sources.seat_max, ValueSource::Default);
}

#[test]
#[serial]
fn load_returns_resolved_config() {
    clear_env();
    env::set_var("POKER_CORE_RAKE_BPS", "300");
    let cfg = load().unwrap();
    clear_env();
    assert_eq!(cfg.rake_bps, 300);
    assert_eq!(cfg.big_blind, TableConfig::default().big_blind);
}

#[test]
#[serial]
fn unparsable_env_value_is_rejected() {
    clear_env();
    env::set_var("POKER_CORE_SEAT_MAX", "lots");
    let err = load_with_sources().unwrap_err();
    clear_env();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
#[serial]
fn env_override_is_validated() {
    clear_env();
    env::set_var("POKER_CORE_SMALL_BLIND", "500");
    let err = load_with_sources().unwrap_err();
    clear_env();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
#[serial]
fn missing_file_is_io_error() {
    clear_env();
    env::set_var(CONFIG_PATH_ENV, "/nonexistent/poker-core/table.toml");
    let err = load_with_sources().unwrap_err();
    clear_env();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn malformed_toml_is_parse_error() {
    assert!(matches!(
        TableConfig::from_toml_str("small_blind = \"fifty\""),
        Err(ConfigError::Parse(_))
    ));
}
