//! The analysis exchange model.
//!
//! A [`SessionLog`] is the append-only record of one conversation. Questions
//! enter through [`SessionLog::submit`], analyzer results through
//! [`SessionLog::receive`]. Both validate before appending, so a failed call
//! leaves the log exactly as it was.

use crate::error::ExchangeError;
use crate::models::{AnalysisRequest, AnalysisResponse, CompanyContext, Message, RecentAnalysis};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Ordered, append-only sequence of messages forming one conversation.
#[derive(Debug, Clone)]
pub struct SessionLog {
    id: String,
    started_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLog {
    /// Creates an empty session log.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Records a user question and builds the request to dispatch.
    ///
    /// The question is trimmed; an empty result is rejected. `context` and
    /// `framework` pass through untouched.
    pub fn submit(
        &mut self,
        question: &str,
        context: Option<CompanyContext>,
        framework: Option<String>,
    ) -> Result<AnalysisRequest, ExchangeError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ExchangeError::InvalidRequest(
                "question must not be empty".to_string(),
            ));
        }

        self.messages.push(Message::user(question.to_string()));
        debug!(
            "Session {}: appended user message ({} total)",
            self.id,
            self.messages.len()
        );

        Ok(AnalysisRequest::new(question.to_string(), context, framework))
    }

    /// Folds an analyzer response into the log as an assistant turn.
    ///
    /// Alternation with user turns is not enforced.
    pub fn receive(&mut self, response: AnalysisResponse) -> Result<&Message, ExchangeError> {
        validate_response(&response)?;

        self.messages.push(Message::assistant(response));
        debug!(
            "Session {}: appended assistant message ({} total)",
            self.id,
            self.messages.len()
        );

        // Just pushed, so the log is non-empty.
        Ok(&self.messages[self.messages.len() - 1])
    }
}

/// Checks the response rules shared by `receive` and `summarize`.
pub fn validate_response(response: &AnalysisResponse) -> Result<(), ExchangeError> {
    if !response.confidence.is_finite() || !(0.0..=1.0).contains(&response.confidence) {
        return Err(ExchangeError::InvalidResponse(format!(
            "confidence {} is outside [0, 1]",
            response.confidence
        )));
    }

    if response.framework.trim().is_empty() {
        return Err(ExchangeError::InvalidResponse(
            "framework must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Projects a response into a summary record. Never touches a log.
pub fn summarize(
    response: &AnalysisResponse,
    title: &str,
    relative_time: &str,
) -> Result<RecentAnalysis, ExchangeError> {
    validate_response(response)?;

    Ok(RecentAnalysis {
        title: title.to_string(),
        framework: response.framework.clone(),
        time: relative_time.to_string(),
        confidence: response.confidence,
    })
}

/// Reconstructs the response an assistant message was folded from.
///
/// Returns `None` for user messages.
pub fn response_of(message: &Message) -> Option<AnalysisResponse> {
    if !message.is_analysis() {
        return None;
    }

    Some(AnalysisResponse {
        analysis: message.content().to_string(),
        framework: message.framework()?.to_string(),
        confidence: message.confidence()?,
        tasks: message.tasks().map(<[String]>::to_vec).unwrap_or_default(),
        metrics: message.metrics().cloned().unwrap_or_default(),
    })
}
