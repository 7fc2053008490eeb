//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be properly loaded,
//! validated, and processed with path expansion.

use eduguide_engine::config::Config;
use sdk::errors::AppError;
use std::path::PathBuf;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[core]
log_level = "debug"
data_dir = "~/.eduguide"

[dataset]
path = "/srv/eduguide/data.json"

[pages]
template_dir = "/srv/eduguide/templates"
output_dir = "/srv/eduguide/public"
marker = "// %%UNIVERSITY_DATA%%"

[results]
dir = "/srv/eduguide/public/data"
base_url = "https://pages.example/data"
top_n = 3

[wizard]
loading_delay_ms = 0

[wizard.budget]
min = 100
max = 3000
default = 800

[wizard.proficiency]
min = 1
max = 10
default = 5

[estimator]
scholarship_percent = 50
monthly_living = 250
years = 3
max_years = 6

[host]
bot_username = "edu_bot"
pages_base_url = "https://pages.example"

[bot]
token_env = "EDU_BOT_TOKEN"
allowed_users = [111, 222]

[server]
bind = "0.0.0.0:9000"
"#;

#[test]
fn test_full_config_parsing() {
    let config = Config::from_toml_str(FULL_CONFIG).expect("Failed to parse config");

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.dataset.path, PathBuf::from("/srv/eduguide/data.json"));
    assert_eq!(config.results.top_n, 3);
    assert_eq!(
        config.results.base_url.as_deref(),
        Some("https://pages.example/data")
    );
    assert_eq!(config.wizard.budget.default, 800);
    assert_eq!(config.wizard.loading_delay_ms, 0);
    assert_eq!(config.estimator.max_years, 6);
    assert_eq!(config.host.bot_username, "edu_bot");
    assert_eq!(config.bot.allowed_users, vec![111, 222]);
    assert_eq!(config.server.bind, "0.0.0.0:9000");

    // ~ is expanded during validation
    let home = dirs::home_dir().unwrap();
    assert_eq!(config.core.data_dir, home.join(".eduguide"));
}

#[test]
fn test_minimal_config_with_defaults() {
    let config = Config::from_toml_str("[core]\n").expect("Failed to parse minimal config");

    assert_eq!(config.core.log_level, "info");
    assert_eq!(config.wizard.loading_delay_ms, 1500);
    assert_eq!(config.estimator.years, 4);
    assert_eq!(config.estimator.monthly_living, 200);
    assert_eq!(config.pages.marker, "// %%UNIVERSITY_DATA%%");
    assert_eq!(config.bot.token_env, "TELEGRAM_BOT_TOKEN");
    assert!(config.bot.allowed_users.is_empty());
}

#[test]
fn test_load_from_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.server.bind, "0.0.0.0:9000");
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_from_path(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases = [
        "[core]\nlog_level = \"verbose\"\n",
        "[core]\n[estimator]\nscholarship_percent = 120\n",
        "[core]\n[estimator]\nyears = 9\nmax_years = 7\n",
        "[core]\n[estimator]\nyears = 0\n",
        "[core]\n[results]\ntop_n = 0\n",
        "[core]\n[pages]\nmarker = \"  \"\n",
        "[core]\n[wizard.proficiency]\nmin = 1\nmax = 10\ndefault = 11\n",
    ];

    for toml in cases {
        assert!(
            matches!(Config::from_toml_str(toml), Err(AppError::Config(_))),
            "expected rejection for {:?}",
            toml
        );
    }
}

#[test]
fn test_config_round_trip() {
    let config = Config::from_toml_str(FULL_CONFIG).unwrap();
    let serialized = toml::to_string_pretty(&config).unwrap();
    let reparsed = Config::from_toml_str(&serialized).unwrap();

    assert_eq!(reparsed.estimator.scholarship_percent, 50);
    assert_eq!(reparsed.wizard.budget, config.wizard.budget);
    assert_eq!(reparsed.host.pages_base_url, config.host.pages_base_url);
}
