//! Data models for strategic analysis sessions.
//!
//! This module contains the records exchanged with the analysis service
//! and the messages that make up a session log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Author of a message in the session log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A question typed by the person asking.
    User,
    /// A result returned by the analyzer.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl Role {
    /// Returns an emoji representation of the role.
    pub fn emoji(&self) -> &'static str {
        match self {
            Role::User => "🧑",
            Role::Assistant => "🧠",
        }
    }
}

/// A metric value reported by the analyzer: either a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

/// Metrics keyed by name. Ordered so rendering is deterministic.
pub type Metrics = BTreeMap<String, MetricValue>;

/// One turn in a conversation.
///
/// Messages are only built by the session log and never change afterwards,
/// so fields are exposed through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
    framework: Option<String>,
    confidence: Option<f64>,
    tasks: Option<Vec<String>>,
    metrics: Option<Metrics>,
}

impl Message {
    /// Creates a user turn. Carries no analysis fields.
    pub(crate) fn user(content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content,
            timestamp: Utc::now(),
            framework: None,
            confidence: None,
            tasks: None,
            metrics: None,
        }
    }

    /// Creates an assistant turn from an already-validated response.
    pub(crate) fn assistant(response: AnalysisResponse) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: response.analysis,
            timestamp: Utc::now(),
            framework: Some(response.framework),
            confidence: Some(response.confidence),
            tasks: Some(response.tasks),
            metrics: Some(response.metrics),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn framework(&self) -> Option<&str> {
        self.framework.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn tasks(&self) -> Option<&[String]> {
        self.tasks.as_deref()
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// True for assistant turns.
    pub fn is_analysis(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Snapshot of the asking organization's situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyContext {
    /// Industry, e.g. "B2B SaaS".
    pub industry: String,
    /// Company stage, e.g. "Series A".
    pub stage: String,
    /// Team size bucket, e.g. "11-50".
    pub team_size: String,
    /// Runway horizon, e.g. "12-18 months".
    pub runway: String,
    /// The primary constraint the company operates under.
    pub constraint: String,
}

impl fmt::Display for CompanyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} company, team {}, runway {}, constrained by {}",
            self.stage, self.industry, self.team_size, self.runway, self.constraint
        )
    }
}

/// A named reasoning lens selectable to bias analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Input to the analysis operation.
///
/// Built by [`crate::exchange::SessionLog::submit`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    question: String,
    context: Option<CompanyContext>,
    framework: Option<String>,
}

impl AnalysisRequest {
    pub(crate) fn new(
        question: String,
        context: Option<CompanyContext>,
        framework: Option<String>,
    ) -> Self {
        Self {
            question,
            context,
            framework,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn context(&self) -> Option<&CompanyContext> {
        self.context.as_ref()
    }

    /// Requested framework id. `None` lets the analyzer choose.
    pub fn framework(&self) -> Option<&str> {
        self.framework.as_deref()
    }
}

/// Output of the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Narrative analysis text.
    pub analysis: String,
    /// Framework actually used. Always resolved by the analyzer.
    pub framework: String,
    /// Confidence score in [0, 1].
    pub confidence: f64,
    /// Ordered action items.
    #[serde(default)]
    pub tasks: Vec<String>,
    /// Derived metrics.
    #[serde(default)]
    pub metrics: Metrics,
}

/// Seed data for the question picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedQuestion {
    pub category: String,
    pub icon: String,
    pub questions: Vec<String>,
}

/// Summary record used to list past analyses.
///
/// Only produced by [`crate::exchange::summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentAnalysis {
    pub title: String,
    pub framework: String,
    pub time: String,
    pub confidence: f64,
}

impl RecentAnalysis {
    /// Confidence as a whole percentage.
    pub fn confidence_percent(&self) -> u32 {
        percent(self.confidence)
    }
}

/// A confidence in [0,1] as a whole percentage.
pub fn percent(confidence: f64) -> u32 {
    (confidence * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context() -> CompanyContext {
        CompanyContext {
            industry: "B2B SaaS".to_string(),
            stage: "Seed".to_string(),
            team_size: "1-10".to_string(),
            runway: "6-12 months".to_string(),
            constraint: "Budget".to_string(),
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_request_serializes_explicit_nulls() {
        let request = AnalysisRequest::new("Should we raise?".to_string(), None, None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["question"], "Should we raise?");
        assert!(json.get("context").unwrap().is_null());
        assert!(json.get("framework").unwrap().is_null());
    }

    #[test]
    fn test_context_uses_camel_case() {
        let request = AnalysisRequest::new(
            "q".to_string(),
            Some(sample_context()),
            Some("RICE".to_string()),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["context"]["teamSize"], "1-10");
        assert_eq!(json["framework"], "RICE");
    }

    #[test]
    fn test_response_metrics_number_or_text() {
        let body = r#"{
            "analysis": "Focus on retention.",
            "framework": "ICE",
            "confidence": 0.8,
            "tasks": ["Interview churned users"],
            "metrics": {"impact": 8, "owner": "Product"}
        }"#;
        let response: AnalysisResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.metrics["impact"], MetricValue::Number(8.0));
        assert_eq!(response.metrics["owner"], MetricValue::from("Product"));
    }

    #[test]
    fn test_response_defaults_missing_lists() {
        let body = r#"{"analysis": "a", "framework": "SWOT", "confidence": 0.5}"#;
        let response: AnalysisResponse = serde_json::from_str(body).unwrap();
        assert!(response.tasks.is_empty());
        assert!(response.metrics.is_empty());
    }

    #[test]
    fn test_user_message_has_no_analysis_fields() {
        let message = Message::user("Hello".to_string());
        assert_eq!(message.role(), Role::User);
        assert!(message.framework().is_none());
        assert!(message.confidence().is_none());
        assert!(message.tasks().is_none());
        assert!(message.metrics().is_none());
        assert!(!message.is_analysis());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("a".to_string());
        let b = Message::user("a".to_string());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_recent_analysis_percent() {
        let recent = RecentAnalysis {
            title: "T".to_string(),
            framework: "ICE".to_string(),
            time: "just now".to_string(),
            confidence: 0.876,
        };
        assert_eq!(recent.confidence_percent(), 88);
        assert_eq!(percent(recent.confidence), recent.confidence_percent());
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(1.0), 100);
    }
}
