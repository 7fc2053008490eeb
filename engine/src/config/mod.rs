//! Configuration management
//!
//! This module handles loading, validation, and management of the EduGuide
//! configuration. Configuration is stored in TOML format at
//! ~/.eduguide/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory
//! - **dataset**: Institution dataset location
//! - **pages**: Page templates, build output and injection marker
//! - **results**: Result document directory, remote base URL, list length
//! - **wizard**: Loading delay and slider ranges of the intake wizard
//! - **estimator**: Default inputs of the cost estimator
//! - **host**: Bot username and public base URL of the pages
//! - **bot**: Telegram bot token source and allowed users
//! - **server**: HTTP bind address
//!
//! # Examples
//!
//! ```no_run
//! use eduguide_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Dataset: {:?}", config.dataset.path);
//! # Ok(())
//! # }
//! ```

use sdk::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub pages: PagesConfig,

    #[serde(default)]
    pub results: ResultsConfig,

    #[serde(default)]
    pub wizard: WizardConfig,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// JSON array of institution records (supports ~ expansion)
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

/// Page build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    /// Directory holding `<page>/index.template.html`
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Directory receiving `<page>/index.html`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Line replaced by the dataset declaration
    #[serde(default = "default_marker")]
    pub marker: String,
}

/// Result document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Directory of `result_{id}.json` documents (supports ~ expansion)
    #[serde(default = "default_results_dir")]
    pub dir: PathBuf,

    /// Remote base URL; when set the results page fetches over HTTP
    #[serde(default)]
    pub base_url: Option<String>,

    /// Number of recommendations kept per result
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// Numeric slider range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl SliderRange {
    /// Clamp a raw slider value into the configured range
    ///
    /// Bounds are ordered first, so an unvalidated range never panics.
    pub fn clamp(&self, value: u32) -> u32 {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(low, high)
    }
}

/// Intake wizard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Cosmetic delay between the loading view and the completion payload
    #[serde(default = "default_loading_delay_ms")]
    pub loading_delay_ms: u64,

    #[serde(default = "default_budget_range")]
    pub budget: SliderRange,

    #[serde(default = "default_proficiency_range")]
    pub proficiency: SliderRange,
}

impl WizardConfig {
    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.loading_delay_ms)
    }
}

/// Cost estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Initial scholarship percentage (0-100)
    #[serde(default)]
    pub scholarship_percent: u8,

    /// Initial monthly living cost
    #[serde(default = "default_monthly_living")]
    pub monthly_living: u32,

    /// Initial duration in years
    #[serde(default = "default_years")]
    pub years: u8,

    /// Longest selectable duration
    #[serde(default = "default_max_years")]
    pub max_years: u8,
}

/// Host application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Bot username substituted into return links
    #[serde(default = "default_bot_username")]
    pub bot_username: String,

    /// Public base URL where the built pages are served
    #[serde(default = "default_pages_base_url")]
    pub pages_base_url: String,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Environment variable holding the bot token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// User ids allowed to talk to the bot; empty allows everyone
    #[serde(default)]
    pub allowed_users: Vec<i64>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.eduguide")
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/data.json")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_marker() -> String {
    "// %%UNIVERSITY_DATA%%".to_string()
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("static/data")
}

fn default_top_n() -> usize {
    5
}

fn default_loading_delay_ms() -> u64 {
    1500
}

fn default_budget_range() -> SliderRange {
    SliderRange {
        min: 0,
        max: 5000,
        default: 1000,
    }
}

fn default_proficiency_range() -> SliderRange {
    SliderRange {
        min: 1,
        max: 10,
        default: 5,
    }
}

fn default_monthly_living() -> u32 {
    200
}

fn default_years() -> u8 {
    4
}

fn default_max_years() -> u8 {
    7
}

fn default_bot_username() -> String {
    "your_bot_username".to_string()
}

fn default_pages_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            output_dir: default_output_dir(),
            marker: default_marker(),
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            dir: default_results_dir(),
            base_url: None,
            top_n: default_top_n(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            loading_delay_ms: default_loading_delay_ms(),
            budget: default_budget_range(),
            proficiency: default_proficiency_range(),
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            scholarship_percent: 0,
            monthly_living: default_monthly_living(),
            years: default_years(),
            max_years: default_max_years(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bot_username: default_bot_username(),
            pages_base_url: default_pages_base_url(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            allowed_users: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.eduguide/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, AppError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, AppError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.eduguide/config.toml)
    fn default_config_path() -> Result<PathBuf, AppError> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".eduguide").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
                data_dir: default_data_dir(),
            },
            dataset: DatasetConfig::default(),
            pages: PagesConfig::default(),
            results: ResultsConfig::default(),
            wizard: WizardConfig::default(),
            estimator: EstimatorConfig::default(),
            host: HostConfig::default(),
            bot: BotConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Validate and process configuration
    ///
    /// Checks value ranges and expands ~ in every path. Directories are not
    /// created here; the commands that write files create them on demand.
    fn validate_and_process(&mut self) -> Result<(), AppError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        for (name, range) in [
            ("wizard.budget", &self.wizard.budget),
            ("wizard.proficiency", &self.wizard.proficiency),
        ] {
            if range.min > range.max || range.default < range.min || range.default > range.max {
                return Err(AppError::Config(format!(
                    "{} must satisfy min <= default <= max",
                    name
                )));
            }
        }

        if self.wizard.proficiency.max > u8::MAX as u32 {
            return Err(AppError::Config(
                "wizard.proficiency.max must fit in 0-255".to_string(),
            ));
        }

        if self.estimator.scholarship_percent > 100 {
            return Err(AppError::Config(
                "estimator.scholarship_percent must be between 0 and 100".to_string(),
            ));
        }

        if self.estimator.max_years == 0
            || self.estimator.years == 0
            || self.estimator.years > self.estimator.max_years
        {
            return Err(AppError::Config(
                "estimator.years must be between 1 and estimator.max_years".to_string(),
            ));
        }

        if self.results.top_n == 0 {
            return Err(AppError::Config(
                "results.top_n must be at least 1".to_string(),
            ));
        }

        if self.pages.marker.trim().is_empty() {
            return Err(AppError::Config("pages.marker must not be empty".to_string()));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        self.dataset.path = expand_path(&self.dataset.path)?;
        self.pages.template_dir = expand_path(&self.pages.template_dir)?;
        self.pages.output_dir = expand_path(&self.pages.output_dir)?;
        self.results.dir = expand_path(&self.results.dir)?;

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, AppError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| AppError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| AppError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.wizard.loading_delay_ms, 1500);
        assert_eq!(config.wizard.budget.default, 1000);
        assert_eq!(config.wizard.proficiency.default, 5);
        assert_eq!(config.results.top_n, 5);
        assert_eq!(config.host.bot_username, "your_bot_username");
        assert_eq!(config.pages.marker, "// %%UNIVERSITY_DATA%%");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = Config::from_toml_str("[core]\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(config.core.log_level, "debug");
        assert_eq!(config.estimator.years, 4);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(config.results.base_url.is_none());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Config::from_toml_str("[core]\nlog_level = \"loud\"\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_slider_range_rejected() {
        let toml = r#"
[core]
[wizard.budget]
min = 100
max = 50
default = 75
"#;
        assert!(matches!(
            Config::from_toml_str(toml),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_slider_clamp() {
        let range = default_budget_range();
        assert_eq!(range.clamp(9000), 5000);
        assert_eq!(range.clamp(1200), 1200);

        let inverted = SliderRange {
            min: 10,
            max: 1,
            default: 5,
        };
        assert_eq!(inverted.clamp(0), 1);
        assert_eq!(inverted.clamp(50), 10);
        assert_eq!(inverted.clamp(7), 7);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.wizard.budget, deserialized.wizard.budget);
    }
}
