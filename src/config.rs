//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.stratintel.toml` files.

use crate::models::CompanyContext;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".stratintel.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Default company context attached to every question.
    #[serde(default)]
    pub context: ContextConfig,

    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of analyses in flight during batch runs.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

impl GeneralConfig {
    /// Log level for the run. `quiet` wins over a verbose config file.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn default_concurrency() -> usize {
    2
}

/// Analysis backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis service.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of retries on transport failure or 5xx.
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Base delay between retries in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Use the built-in offline analyzer instead of the backend.
    #[serde(default)]
    pub offline: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            offline: false,
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30 // AI processing can take a while
}

fn default_retries() -> usize {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

/// Company context defaults. Attached only when every field is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub runway: Option<String>,
    #[serde(default)]
    pub constraint: Option<String>,
}

impl ContextConfig {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.industry.is_none()
            && self.stage.is_none()
            && self.team_size.is_none()
            && self.runway.is_none()
            && self.constraint.is_none()
    }

    /// Names of the fields still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("industry", &self.industry),
            ("stage", &self.stage),
            ("team_size", &self.team_size),
            ("runway", &self.runway),
            ("constraint", &self.constraint),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Builds the company context.
    ///
    /// `Ok(None)` when nothing is set; an error when only some fields are.
    pub fn to_context(&self) -> Result<Option<CompanyContext>> {
        if self.is_empty() {
            return Ok(None);
        }

        match (
            &self.industry,
            &self.stage,
            &self.team_size,
            &self.runway,
            &self.constraint,
        ) {
            (Some(industry), Some(stage), Some(team_size), Some(runway), Some(constraint)) => {
                Ok(Some(CompanyContext {
                    industry: industry.clone(),
                    stage: stage.clone(),
                    team_size: team_size.clone(),
                    runway: runway.clone(),
                    constraint: constraint.clone(),
                }))
            }
            _ => Err(anyhow::anyhow!(
                "Incomplete company context, missing: {}",
                self.missing_fields().join(", ")
            )),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Framework id used when none is given on the command line.
    #[serde(default)]
    pub default_framework: Option<String>,

    /// Confidence below which the run exits with code 2.
    #[serde(default)]
    pub min_confidence: Option<f64>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.stratintel.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check settings that may have come from the file rather than the CLI.
    pub fn validate(&self) -> Result<()> {
        let url = &self.backend.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!(
                "Backend URL must start with 'http://' or 'https://', got '{}'",
                url
            );
        }

        if self.backend.timeout_seconds == 0 {
            anyhow::bail!("Backend timeout must be at least 1 second");
        }

        if self.general.concurrency == 0 {
            anyhow::bail!("Concurrency must be at least 1");
        }

        if let Some(min) = self.session.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                anyhow::bail!("Minimum confidence must be between 0.0 and 1.0, got {}", min);
            }
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.backend_url {
            self.backend.url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.backend.timeout_seconds = timeout;
        }
        if let Some(retries) = args.retries {
            self.backend.retries = retries;
        }
        if args.offline {
            self.backend.offline = true;
        }

        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        // Context fields override one by one, so a config file can hold the
        // stable parts and the CLI the rest.
        let overrides = [
            (&mut self.context.industry, &args.industry),
            (&mut self.context.stage, &args.stage),
            (&mut self.context.team_size, &args.team_size),
            (&mut self.context.runway, &args.runway),
            (&mut self.context.constraint, &args.constraint),
        ];
        for (slot, value) in overrides {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        if let Some(ref framework) = args.framework {
            self.session.default_framework = Some(framework.clone());
        }
        if let Some(min) = args.min_confidence {
            self.session.min_confidence = Some(min);
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://127.0.0.1:8000");
        assert_eq!(config.backend.timeout_seconds, 30);
        assert!(!config.backend.offline);
        assert!(config.context.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
concurrency = 4

[backend]
url = "https://analysis.internal:8443"
retries = 0

[context]
industry = "B2B SaaS"
stage = "Series A"
team_size = "11-50"
runway = "18 months"
constraint = "Engineering capacity"

[session]
default_framework = "RICE"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.backend.url, "https://analysis.internal:8443");
        assert_eq!(config.backend.retries, 0);
        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.session.default_framework.as_deref(), Some("RICE"));

        let context = config.context.to_context().unwrap().unwrap();
        assert_eq!(context.team_size, "11-50");
    }

    #[test]
    fn test_partial_context_is_an_error() {
        let context = ContextConfig {
            industry: Some("Retail".to_string()),
            runway: Some("6 months".to_string()),
            ..ContextConfig::default()
        };

        let err = context.to_context().unwrap_err().to_string();
        assert!(err.contains("stage"));
        assert!(err.contains("team_size"));
        assert!(err.contains("constraint"));
        assert!(!err.contains("industry"));
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).unwrap().is_none());

        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[backend]\noffline = true\n",
        )
        .unwrap();
        let config = Config::load_from_dir(temp_dir.path()).unwrap().unwrap();
        assert!(config.backend.offline);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[backend\nurl = 3").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_file_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let cases = [
            ("[backend]\nurl = \"localhost:8000\"\n", "http://"),
            ("[backend]\ntimeout_seconds = 0\n", "timeout"),
            ("[general]\nconcurrency = 0\n", "Concurrency"),
            ("[session]\nmin_confidence = 1.5\n", "between 0.0 and 1.0"),
        ];
        for (content, expected) in cases {
            std::fs::write(&path, content).unwrap();
            let config = Config::load(&path).unwrap();
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains(expected), "{:?} -> {}", content, err);
        }
    }

    #[test]
    fn test_log_level_from_config() {
        let mut general = GeneralConfig::default();
        assert_eq!(general.log_level(false), tracing::Level::INFO);

        general.verbose = true;
        assert_eq!(general.log_level(false), tracing::Level::DEBUG);
        assert_eq!(general.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_verbose_from_file_survives_merge() {
        use clap::Parser;

        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = crate::cli::Args::parse_from(["stratintel"]);
        config.merge_with_args(&args);

        assert!(config.general.verbose);
        assert_eq!(config.general.log_level(args.quiet), tracing::Level::DEBUG);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("timeout_seconds = 30"));
    }
}
