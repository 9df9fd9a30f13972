//! Session history and statistics.
//!
//! Everything here is derived from the session log after the fact; nothing
//! writes back to it.

use crate::exchange::{response_of, summarize, SessionLog};
use crate::models::{RecentAnalysis, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

const MAX_TITLE_CHARS: usize = 60;

/// Human-readable age of a timestamp relative to `now`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);

    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }

    let hours = elapsed.num_hours();
    if hours < 1 {
        return plural(minutes, "minute");
    }

    let days = elapsed.num_days();
    if days < 1 {
        return plural(hours, "hour");
    }

    plural(days, "day")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Shorten a question to a list title.
pub fn title_for(question: &str) -> String {
    let question = question.trim();
    if question.chars().count() <= MAX_TITLE_CHARS {
        return question.to_string();
    }

    let cut: String = question.chars().take(MAX_TITLE_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

/// Summaries of the analyses in a log, newest first.
///
/// Each summary is titled with the closest user question before it.
pub fn recent_analyses(log: &SessionLog, now: DateTime<Utc>, limit: usize) -> Vec<RecentAnalysis> {
    let mut last_question: Option<&str> = None;
    let mut recent = Vec::new();

    for message in log.messages() {
        if message.role() == Role::User {
            last_question = Some(message.content());
            continue;
        }

        let Some(response) = response_of(message) else {
            continue;
        };
        let title = last_question
            .map(title_for)
            .unwrap_or_else(|| "Untitled analysis".to_string());
        let time = relative_time(message.timestamp(), now);

        // Responses in the log already passed validation.
        if let Ok(summary) = summarize(&response, &title, &time) {
            recent.push(summary);
        }
    }

    recent.reverse();
    recent.truncate(limit);
    recent
}

/// Aggregate numbers for one session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub questions: usize,
    pub analyses: usize,
    pub average_confidence: Option<f64>,
    pub lowest_confidence: Option<f64>,
    pub framework_usage: HashMap<String, usize>,
    pub action_items: usize,
}

impl SessionStats {
    pub fn from_log(log: &SessionLog) -> Self {
        let mut stats = Self::default();
        let mut confidence_total = 0.0;

        for message in log.messages() {
            match message.role() {
                Role::User => stats.questions += 1,
                Role::Assistant => {
                    stats.analyses += 1;

                    if let Some(framework) = message.framework() {
                        *stats
                            .framework_usage
                            .entry(framework.to_string())
                            .or_default() += 1;
                    }
                    if let Some(confidence) = message.confidence() {
                        confidence_total += confidence;
                        stats.lowest_confidence = Some(
                            stats
                                .lowest_confidence
                                .map_or(confidence, |low| low.min(confidence)),
                        );
                    }
                    stats.action_items += message.tasks().map_or(0, <[String]>::len);
                }
            }
        }

        if stats.analyses > 0 {
            stats.average_confidence = Some(confidence_total / stats.analyses as f64);
        }

        stats
    }

    /// Frameworks by usage, most used first; ties by name.
    pub fn frameworks_by_usage(&self) -> Vec<(&str, usize)> {
        let mut usage: Vec<_> = self
            .framework_usage
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        usage.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResponse, Metrics};
    use chrono::Duration;

    fn response(framework: &str, confidence: f64, tasks: usize) -> AnalysisResponse {
        AnalysisResponse {
            analysis: format!("Using {}", framework),
            framework: framework.to_string(),
            confidence,
            tasks: (0..tasks).map(|i| format!("Task {}", i)).collect(),
            metrics: Metrics::new(),
        }
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(
            relative_time(now - Duration::minutes(45), now),
            "45 minutes ago"
        );
        assert_eq!(relative_time(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(relative_time(now - Duration::hours(24), now), "1 day ago");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
    }

    #[test]
    fn test_relative_time_future_is_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn test_title_for_truncates_long_questions() {
        assert_eq!(title_for("  Short one  "), "Short one");

        let long = "word ".repeat(30);
        let title = title_for(&long);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= MAX_TITLE_CHARS);
    }

    #[test]
    fn test_recent_analyses_titles_and_order() {
        let mut log = SessionLog::new();
        log.submit("Pricing question", None, None).unwrap();
        log.receive(response("ICE Framework", 0.8, 1)).unwrap();
        log.submit("Competitor question", None, None).unwrap();
        log.receive(response("Porter's Five Forces", 0.9, 2)).unwrap();

        let recent = recent_analyses(&log, Utc::now(), 10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "Competitor question");
        assert_eq!(recent[0].framework, "Porter's Five Forces");
        assert_eq!(recent[1].title, "Pricing question");
        assert_eq!(recent[1].time, "just now");
    }

    #[test]
    fn test_recent_analyses_untitled_and_limit() {
        let mut log = SessionLog::new();
        log.receive(response("OKR Framework", 0.7, 0)).unwrap();
        log.receive(response("SWOT Analysis", 0.6, 0)).unwrap();

        let recent = recent_analyses(&log, Utc::now(), 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "Untitled analysis");
        assert_eq!(recent[0].framework, "SWOT Analysis");
    }

    #[test]
    fn test_session_stats() {
        let mut log = SessionLog::new();
        log.submit("a", None, None).unwrap();
        log.receive(response("ICE Framework", 0.8, 3)).unwrap();
        log.submit("b", None, None).unwrap();
        log.receive(response("ICE Framework", 0.6, 1)).unwrap();
        log.submit("c", None, None).unwrap();
        log.receive(response("RICE Framework", 1.0, 0)).unwrap();

        let stats = SessionStats::from_log(&log);
        assert_eq!(stats.questions, 3);
        assert_eq!(stats.analyses, 3);
        assert_eq!(stats.action_items, 4);
        assert_eq!(stats.lowest_confidence, Some(0.6));
        assert!((stats.average_confidence.unwrap() - 0.8).abs() < 1e-9);
        assert_eq!(
            stats.frameworks_by_usage(),
            vec![("ICE Framework", 2), ("RICE Framework", 1)]
        );
    }

    #[test]
    fn test_session_stats_empty_log() {
        let stats = SessionStats::from_log(&SessionLog::new());
        assert_eq!(stats.analyses, 0);
        assert!(stats.average_confidence.is_none());
    }
}
