//! Configuration resolution from the process environment.

mod support;

use std::io::Write;

use cycle_predictor::config::{AppConfig, ConfigError};
use support::with_scoped_env;

const CLEARED: &[(&str, Option<&str>)] = &[
    ("CYCLE_CONFIG", None),
    ("HOST", None),
    ("PORT", None),
    ("REPOSITORY_TYPE", None),
    ("DATABASE_PATH", None),
    ("SQLITE_POOL_MAX", None),
    ("SQLITE_BUSY_TIMEOUT_MS", None),
    ("PREDICTION_STALE_HOURS", None),
    ("OPENAI_API_KEY", None),
    ("OPENAI_MODEL", None),
    ("OPENAI_BASE_URL", None),
    ("NARRATIVE_TIMEOUT_SECS", None),
];

fn env_with(overrides: &[(&'static str, Option<&'static str>)]) -> Vec<(&'static str, Option<&'static str>)> {
    let mut changes: Vec<_> = CLEARED
        .iter()
        .filter(|(k, _)| !overrides.iter().any(|(o, _)| o == k))
        .copied()
        .collect();
    changes.extend_from_slice(overrides);
    changes
}

#[test]
fn test_from_env_without_variables_uses_defaults() {
    let config = with_scoped_env(&env_with(&[]), AppConfig::from_env).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_from_env_reads_overrides() {
    let config = with_scoped_env(
        &env_with(&[
            ("REPOSITORY_TYPE", Some("local")),
            ("PORT", Some("3002")),
            ("PREDICTION_STALE_HOURS", Some("6")),
            ("OPENAI_API_KEY", Some("sk-test")),
        ]),
        AppConfig::from_env,
    )
    .unwrap();

    assert_eq!(config.storage.repository.repo_type, "local");
    assert_eq!(config.server.port, 3002);
    assert_eq!(config.prediction.stale_threshold_hours, 6);
    assert_eq!(config.narrative.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn test_env_overrides_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[sqlite]\ndatabase_path = \"/var/lib/cycles.db\"\n\n[prediction]\nstale_threshold_hours = 12\n"
    )
    .unwrap();
    let path = file.path().to_string_lossy().into_owned();
    let path: &'static str = Box::leak(path.into_boxed_str());

    let config = with_scoped_env(
        &env_with(&[
            ("CYCLE_CONFIG", Some(path)),
            ("PREDICTION_STALE_HOURS", Some("48")),
        ]),
        AppConfig::from_env,
    )
    .unwrap();

    assert_eq!(config.storage.sqlite.database_path, "/var/lib/cycles.db");
    assert_eq!(config.prediction.stale_threshold_hours, 48);
}

#[test]
fn test_invalid_port_is_reported() {
    let err = with_scoped_env(&env_with(&[("PORT", Some("eighty"))]), AppConfig::from_env)
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
}
