//! Session transcript generation.
//!
//! Renders a session log as Markdown or JSON. This is a one-way export; the
//! output is never read back into a session.

use crate::analysis::{recent_analyses, SessionStats};
use crate::exchange::SessionLog;
use crate::models::{percent, Message, RecentAnalysis, Role};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How many analyses the "Recent Analyses" table lists.
const RECENT_LIMIT: usize = 10;

/// Metadata about the rendered session.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptMetadata {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub analyzer: String,
    pub message_count: usize,
}

/// Everything a transcript shows, in serializable form.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript<'a> {
    pub metadata: TranscriptMetadata,
    pub messages: &'a [Message],
    pub recent: Vec<RecentAnalysis>,
    pub stats: SessionStats,
}

impl<'a> Transcript<'a> {
    pub fn new(log: &'a SessionLog, analyzer: &str, now: DateTime<Utc>) -> Self {
        Self {
            metadata: TranscriptMetadata {
                session_id: log.id().to_string(),
                started_at: log.started_at(),
                generated_at: now,
                analyzer: analyzer.to_string(),
                message_count: log.len(),
            },
            messages: log.messages(),
            recent: recent_analyses(log, now, RECENT_LIMIT),
            stats: SessionStats::from_log(log),
        }
    }
}

/// Generate a complete Markdown transcript.
pub fn generate_markdown_transcript(transcript: &Transcript<'_>) -> String {
    let mut output = String::new();

    output.push_str("# Strategic Analysis Session\n\n");
    output.push_str(&generate_metadata_section(&transcript.metadata));
    output.push_str(&generate_conversation_section(transcript.messages));
    output.push_str(&generate_recent_section(&transcript.recent));
    output.push_str(&generate_stats_section(&transcript.stats));
    output.push_str(&generate_footer());

    output
}

/// Generate a pretty-printed JSON transcript.
pub fn generate_json_transcript(transcript: &Transcript<'_>) -> Result<String> {
    serde_json::to_string_pretty(transcript).map_err(Into::into)
}

fn generate_metadata_section(metadata: &TranscriptMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Session:** `{}`\n", metadata.session_id));
    section.push_str(&format!(
        "- **Started:** {}\n",
        metadata.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Analyzer:** {}\n", metadata.analyzer));
    section.push_str(&format!("- **Messages:** {}\n", metadata.message_count));
    section.push('\n');

    section
}

fn generate_conversation_section(messages: &[Message]) -> String {
    let mut section = String::new();

    section.push_str("## Conversation\n\n");

    if messages.is_empty() {
        section.push_str("No questions were asked in this session.\n\n");
        return section;
    }

    for message in messages {
        section.push_str(&render_message(message));
    }

    section
}

/// Render one message as a Markdown block.
pub fn render_message(message: &Message) -> String {
    let mut block = String::new();

    let who = match message.role() {
        Role::User => "You",
        Role::Assistant => "Analyst",
    };
    block.push_str(&format!(
        "### {} {} · {}\n\n",
        message.role().emoji(),
        who,
        message.timestamp().format("%H:%M:%S")
    ));

    if let (Some(framework), Some(confidence)) = (message.framework(), message.confidence()) {
        block.push_str(&format!(
            "*Framework: {} | Confidence: {}%*\n\n",
            framework,
            percent(confidence)
        ));
    }

    block.push_str(message.content());
    block.push_str("\n\n");

    if let Some(tasks) = message.tasks().filter(|t| !t.is_empty()) {
        block.push_str("#### Action Items\n\n");
        for (i, task) in tasks.iter().enumerate() {
            block.push_str(&format!("{}. {}\n", i + 1, task));
        }
        block.push('\n');
    }

    if let Some(metrics) = message.metrics().filter(|m| !m.is_empty()) {
        block.push_str("#### Metrics\n\n");
        block.push_str("| Metric | Value |\n");
        block.push_str("|:---|:---|\n");
        for (name, value) in metrics {
            block.push_str(&format!("| {} | {} |\n", name, value));
        }
        block.push('\n');
    }

    if message.is_analysis() {
        block.push_str("---\n\n");
    }

    block
}

fn generate_recent_section(recent: &[RecentAnalysis]) -> String {
    if recent.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Recent Analyses\n\n");
    section.push_str("| Title | Framework | When | Confidence |\n");
    section.push_str("|:---|:---|:---|:---:|\n");
    for item in recent {
        section.push_str(&format!(
            "| {} | {} | {} | {}% |\n",
            item.title.replace('|', "\\|"),
            item.framework,
            item.time,
            item.confidence_percent()
        ));
    }
    section.push('\n');

    section
}

fn generate_stats_section(stats: &SessionStats) -> String {
    if stats.analyses == 0 {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!("- **Questions:** {}\n", stats.questions));
    section.push_str(&format!("- **Analyses:** {}\n", stats.analyses));
    if let Some(avg) = stats.average_confidence {
        section.push_str(&format!("- **Average confidence:** {}%\n", percent(avg)));
    }
    section.push_str(&format!("- **Action items:** {}\n\n", stats.action_items));

    section.push_str("| Framework | Uses |\n");
    section.push_str("|:---|:---:|\n");
    for (framework, count) in stats.frameworks_by_usage() {
        section.push_str(&format!("| {} | {} |\n", framework, count));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Transcript generated by stratintel*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResponse, MetricValue, Metrics};

    fn sample_log() -> SessionLog {
        let mut metrics = Metrics::new();
        metrics.insert("reach".to_string(), MetricValue::Number(1200.0));

        let mut log = SessionLog::new();
        log.submit("How should we split the budget?", None, None)
            .unwrap();
        log.receive(AnalysisResponse {
            analysis: "Lean into retention.".to_string(),
            framework: "RICE Framework".to_string(),
            confidence: 0.88,
            tasks: vec!["Cut paid ads".to_string()],
            metrics,
        })
        .unwrap();
        log
    }

    #[test]
    fn test_generate_markdown_transcript() {
        let log = sample_log();
        let transcript = Transcript::new(&log, "offline", Utc::now());
        let markdown = generate_markdown_transcript(&transcript);

        assert!(markdown.contains("# Strategic Analysis Session"));
        assert!(markdown.contains("## Conversation"));
        assert!(markdown.contains("How should we split the budget?"));
        assert!(markdown.contains("Framework: RICE Framework | Confidence: 88%"));
        assert!(markdown.contains("1. Cut paid ads"));
        assert!(markdown.contains("| reach | 1200 |"));
        assert!(markdown.contains("## Recent Analyses"));
        assert!(markdown.contains("**Analyzer:** offline"));
    }

    #[test]
    fn test_empty_session_markdown() {
        let log = SessionLog::new();
        let transcript = Transcript::new(&log, "backend", Utc::now());
        let markdown = generate_markdown_transcript(&transcript);

        assert!(markdown.contains("No questions were asked"));
        assert!(!markdown.contains("## Recent Analyses"));
        assert!(!markdown.contains("## Summary"));
    }

    #[test]
    fn test_render_user_message_has_no_analysis_block() {
        let log = sample_log();
        let block = render_message(&log.messages()[0]);
        assert!(block.contains("You"));
        assert!(!block.contains("Framework:"));
        assert!(!block.contains("Action Items"));
    }

    #[test]
    fn test_generate_json_transcript() {
        let log = sample_log();
        let transcript = Transcript::new(&log, "offline", Utc::now());
        let json = generate_json_transcript(&transcript).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["message_count"], 2);
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value["messages"][0]["framework"].is_null());
        assert_eq!(value["messages"][1]["framework"], "RICE Framework");
        assert_eq!(value["recent"][0]["framework"], "RICE Framework");
    }
}
