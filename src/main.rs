//! stratintel - strategic analysis sessions
//!
//! A CLI tool that sends strategic questions, with optional company context
//! and framework choice, to an analysis backend and keeps the conversation
//! as an append-only session log.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, failed analysis, etc.)
//!   2 - An analysis came back below the --min-confidence threshold

mod analysis;
mod analyzer;
mod catalog;
mod cli;
mod config;
mod error;
mod exchange;
mod models;
mod report;

use analyzer::{Analyzer, HttpAnalyzer, HttpAnalyzerConfig, LocalAnalyzer};
use anyhow::{Context, Result};
use catalog::FrameworkCatalog;
use chrono::Utc;
use cli::{Args, Mode, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use exchange::SessionLog;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use models::{CompanyContext, Message};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();
    let catalog = FrameworkCatalog::builtin();

    // Validate arguments
    if let Err(e) = args.validate(&catalog) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Informational modes need no logging or backend
    match args.mode() {
        Mode::InitConfig => return handle_init_config(),
        Mode::ListFrameworks => {
            print_frameworks(&catalog);
            return Ok(());
        }
        Mode::Suggestions => {
            print_suggestions();
            return Ok(());
        }
        _ => {}
    }

    // Config comes first: its verbosity decides the log level
    let (config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.general.log_level(args.quiet));

    info!("stratintel v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", source);
    debug!("Arguments: {:?}", args);

    match run(args, config, catalog).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Session failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .stratintel.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the backend URL, company context, and default framework.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn print_frameworks(catalog: &FrameworkCatalog) {
    println!("Available frameworks:\n");
    for framework in catalog.all() {
        println!(
            "  {:<6} {:<22} {}",
            framework.id, framework.name, framework.description
        );
    }
}

fn print_suggestions() {
    for group in catalog::suggested_questions() {
        println!("\n[{}] {}", group.icon, group.category);
        for question in &group.questions {
            println!("  • {}", question);
        }
    }
}

/// Load configuration from file or use defaults, merged with the CLI.
///
/// Runs before logging is set up, so it returns a description of where the
/// settings came from instead of logging it.
fn load_config(args: &Args) -> Result<(Config, String)> {
    let (mut config, source) = match args.config {
        Some(ref config_path) => (
            Config::load(config_path)?,
            config_path.display().to_string(),
        ),
        None => match Config::load_default()? {
            Some(config) => (config, CONFIG_FILE_NAME.to_string()),
            None => (Config::default(), "built-in defaults".to_string()),
        },
    };

    config.merge_with_args(args);
    config
        .validate()
        .with_context(|| format!("Invalid configuration ({})", source))?;

    Ok((config, source))
}

/// One conversation: the log, the analyzer it talks to, and the current
/// question settings. Only this struct appends to the log.
struct Session {
    log: SessionLog,
    analyzer: Box<dyn Analyzer>,
    catalog: FrameworkCatalog,
    context: Option<CompanyContext>,
    framework: Option<String>,
    show_progress: bool,
}

impl Session {
    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    /// Submit one question, wait for the analyzer, fold the result in.
    async fn ask(&mut self, question: &str) -> Result<&Message> {
        let request = self
            .log
            .submit(question, self.context.clone(), self.framework.clone())?;
        info!(
            "Analyzing with {} (framework: {})",
            self.analyzer.name(),
            request.framework().unwrap_or("auto")
        );

        let spinner = self.spinner("Analyzing...");
        let result = self.analyzer.analyze(&request).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let message = self.log.receive(result?)?;
        Ok(message)
    }

    /// Submit every question, then dispatch up to `concurrency` at once.
    ///
    /// Results are folded in submission order. Returns the number of
    /// questions whose analysis failed.
    async fn ask_batch(&mut self, questions: &[String], concurrency: usize) -> Result<usize> {
        let mut requests = Vec::with_capacity(questions.len());
        for question in questions {
            match self
                .log
                .submit(question, self.context.clone(), self.framework.clone())
            {
                Ok(request) => requests.push(request),
                Err(e) => warn!("Skipping question: {}", e),
            }
        }
        info!(
            "Dispatching {} questions ({} at a time)",
            requests.len(),
            concurrency
        );

        let progress = if self.show_progress {
            let pb = ProgressBar::new(requests.len() as u64);
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let analyzer = self.analyzer.as_ref();
        let mut results = stream::iter(requests.iter())
            .map(|request| analyzer.analyze(request))
            .buffered(concurrency.max(1));

        let mut failures = 0;
        while let Some(result) = results.next().await {
            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            let received = result.and_then(|response| {
                self.log
                    .receive(response)
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            });
            if let Err(e) = received {
                failures += 1;
                error!("Analysis failed: {:#}", e);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(failures)
    }
}

/// Run the session for the selected mode. Returns the exit code.
async fn run(args: Args, config: Config, catalog: FrameworkCatalog) -> Result<i32> {
    let backend = HttpAnalyzerConfig::from(&config.backend);
    let mode = args.mode();

    if mode == Mode::Health {
        return check_health(backend).await;
    }

    let context = config.context.to_context()?;
    let framework = match config.session.default_framework {
        Some(ref id) => Some(
            catalog
                .find(id)
                .map(|f| f.id.clone())
                .ok_or_else(|| anyhow::anyhow!("Unknown framework in config: {}", id))?,
        ),
        None => None,
    };

    let analyzer: Box<dyn Analyzer> = if config.backend.offline {
        info!("Using offline analyzer");
        Box::new(LocalAnalyzer::new(catalog.clone()))
    } else {
        Box::new(HttpAnalyzer::new(backend)?)
    };

    let mut session = Session {
        log: SessionLog::new(),
        analyzer,
        catalog,
        context,
        framework,
        show_progress: !args.quiet,
    };

    // JSON to stdout replaces the per-message rendering.
    let json_to_stdout = args.format == OutputFormat::Json && args.output.is_none();
    let mut exit_code = 0;

    match mode {
        Mode::Ask(question) => {
            let message = session.ask(&question).await?;
            if !json_to_stdout {
                print!("{}", report::render_message(message));
            }
        }
        Mode::Batch(path) => {
            let questions = read_batch_file(&path)?;
            let failures = session
                .ask_batch(&questions, config.general.concurrency)
                .await?;

            if !json_to_stdout {
                for message in session.log.messages() {
                    print!("{}", report::render_message(message));
                }
            }
            if failures > 0 {
                eprintln!("\n⚠️  {} of {} analyses failed.", failures, questions.len());
                exit_code = 1;
            }
        }
        Mode::Interactive => run_interactive(&mut session).await?,
        _ => {}
    }

    write_transcript(&session, args.format, args.output.as_deref())?;

    if exit_code == 0 {
        if let Some(min) = config.session.min_confidence {
            if below_confidence(&session.log, min) {
                eprintln!(
                    "\n⛔ Analysis confidence below {:.0}%. Failing (exit code 2).",
                    min * 100.0
                );
                exit_code = 2;
            }
        }
    }

    Ok(exit_code)
}

/// Handle --health: query the backend health endpoint.
async fn check_health(backend: HttpAnalyzerConfig) -> Result<i32> {
    let url = backend.base_url.clone();
    let analyzer = HttpAnalyzer::new(backend)?;
    let health = analyzer.health().await?;

    println!("✅ Backend at {} is up: {}", url, health.status);
    if let Some(timestamp) = health.timestamp {
        println!("   Reported at {}", timestamp);
    }
    Ok(0)
}

/// Read questions from a file, one per non-empty line.
fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// True when any analysis in the log is less confident than `min`.
fn below_confidence(log: &SessionLog, min: f64) -> bool {
    log.messages()
        .iter()
        .filter_map(Message::confidence)
        .any(|confidence| confidence < min)
}

/// Render the transcript to the output file, or JSON to stdout.
fn write_transcript(session: &Session, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let transcript = report::Transcript::new(&session.log, session.analyzer.name(), Utc::now());

    match output {
        Some(path) => {
            let content = match format {
                OutputFormat::Json => report::generate_json_transcript(&transcript)?,
                OutputFormat::Markdown => report::generate_markdown_transcript(&transcript),
            };
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
            println!("\n📝 Transcript saved to: {}", path.display());
        }
        None if format == OutputFormat::Json => {
            println!("{}", report::generate_json_transcript(&transcript)?);
        }
        None => {}
    }

    Ok(())
}

/// Interactive loop: read questions and commands from stdin until EOF or /quit.
async fn run_interactive(session: &mut Session) -> Result<()> {
    println!("🧭 Strategic analysis session ({})", session.analyzer.name());
    println!("   Ask a question, or type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n❓ ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(session, command) {
                break;
            }
            continue;
        }

        match session.ask(line).await {
            Ok(message) => print!("\n{}", report::render_message(message)),
            Err(e) => {
                error!("Analysis failed: {:#}", e);
                eprintln!("❌ {:#}", e);
            }
        }
    }

    println!("\n👋 Session ended with {} messages.", session.log.len());
    Ok(())
}

/// Handle a slash command. Returns false when the session should end.
fn handle_command(session: &mut Session, command: &str) -> bool {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let argument = parts.collect::<Vec<_>>().join(" ");

    match name {
        "quit" | "exit" => return false,
        "help" => {
            println!("Commands:");
            println!("  /frameworks        list frameworks");
            println!("  /framework ID|auto choose a framework for the next questions");
            println!("  /context           show the company context");
            println!("  /history           list recent analyses");
            println!("  /suggest           show suggested questions");
            println!("  /quit              end the session");
        }
        "frameworks" => print_frameworks(&session.catalog),
        "framework" => {
            if argument.is_empty() || argument.eq_ignore_ascii_case("auto") {
                session.framework = None;
                println!("Framework: chosen by the analyzer");
            } else if let Some(framework) = session.catalog.find(&argument) {
                println!("Framework: {}", framework.name);
                session.framework = Some(framework.id.clone());
            } else {
                println!(
                    "Unknown framework '{}'. Available: {}",
                    argument,
                    session.catalog.ids()
                );
            }
        }
        "context" => match session.context {
            Some(ref context) => println!("Context: {}", context),
            None => println!("No company context set."),
        },
        "history" => {
            let recent = analysis::recent_analyses(&session.log, Utc::now(), 10);
            if recent.is_empty() {
                println!("No analyses yet.");
            }
            for item in recent {
                println!(
                    "  {} · {} · {} · {}%",
                    item.title,
                    item.framework,
                    item.time,
                    item.confidence_percent()
                );
            }
        }
        "suggest" => print_suggestions(),
        other => println!("Unknown command '/{}'. Type /help for commands.", other),
    }

    true
}
