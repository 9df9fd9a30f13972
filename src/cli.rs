//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::catalog::FrameworkCatalog;
use clap::Parser;
use std::path::PathBuf;

/// stratintel - strategic analysis from the command line
///
/// Ask strategic questions, optionally with company context and a chosen
/// framework, and get structured analysis with action items and metrics.
///
/// Examples:
///   stratintel --ask "How do we respond to a competitor price cut?"
///   stratintel --ask "Where should the budget go?" --framework rice
///   stratintel --batch questions.txt --format json --output session.json
///   stratintel --offline
///   stratintel --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Ask a single question and exit
    #[arg(short, long, value_name = "QUESTION", conflicts_with = "batch")]
    pub ask: Option<String>,

    /// Ask every non-empty line of FILE as a question
    #[arg(long, value_name = "FILE")]
    pub batch: Option<PathBuf>,

    /// Framework to analyze with (ICE, RICE, Porter, SWOT, OKR, JTBD)
    ///
    /// If not specified, the analyzer chooses.
    #[arg(short, long, value_name = "ID")]
    pub framework: Option<String>,

    /// Company industry
    #[arg(long)]
    pub industry: Option<String>,

    /// Company stage (e.g. "Seed", "Series A")
    #[arg(long)]
    pub stage: Option<String>,

    /// Team size bucket (e.g. "11-50")
    #[arg(long)]
    pub team_size: Option<String>,

    /// Runway horizon (e.g. "12-18 months")
    #[arg(long)]
    pub runway: Option<String>,

    /// Primary constraint (e.g. "Budget")
    #[arg(long)]
    pub constraint: Option<String>,

    /// Analysis backend base URL
    #[arg(long, value_name = "URL", env = "STRATINTEL_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Use the built-in offline analyzer instead of the backend
    #[arg(long)]
    pub offline: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries on transport failure or 5xx responses
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<usize>,

    /// Number of analyses in flight during --batch
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Transcript format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the session transcript to FILE
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .stratintel.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 if any analysis is less confident than this (0.0 - 1.0)
    #[arg(long, value_name = "SCORE")]
    pub min_confidence: Option<f64>,

    /// List available frameworks and exit
    #[arg(long)]
    pub list_frameworks: bool,

    /// Show suggested questions and exit
    #[arg(long)]
    pub suggestions: bool,

    /// Check the analysis backend health and exit
    #[arg(long, conflicts_with = "offline")]
    pub health: bool,

    /// Generate a default .stratintel.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// What the run should do, derived from the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    InitConfig,
    ListFrameworks,
    Suggestions,
    Health,
    Ask(String),
    Batch(PathBuf),
    Interactive,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the run mode. Informational flags win over question modes.
    pub fn mode(&self) -> Mode {
        if self.init_config {
            Mode::InitConfig
        } else if self.list_frameworks {
            Mode::ListFrameworks
        } else if self.suggestions {
            Mode::Suggestions
        } else if self.health {
            Mode::Health
        } else if let Some(ref question) = self.ask {
            Mode::Ask(question.clone())
        } else if let Some(ref path) = self.batch {
            Mode::Batch(path.clone())
        } else {
            Mode::Interactive
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self, catalog: &FrameworkCatalog) -> Result<(), String> {
        if let Some(ref question) = self.ask {
            if question.trim().is_empty() {
                return Err("Question must not be empty".to_string());
            }
        }

        if let Some(ref framework) = self.framework {
            if catalog.find(framework).is_none() {
                return Err(format!(
                    "Unknown framework '{}'. Available: {}",
                    framework,
                    catalog.ids()
                ));
            }
        }

        if let Some(ref url) = self.backend_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Backend URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(min) = self.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err("Minimum confidence must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref path) = self.batch {
            if !path.is_file() {
                return Err(format!("Batch file does not exist: {}", path.display()));
            }
        }

        Ok(())
    }
}
