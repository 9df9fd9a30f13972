//! Offline analyzer.
//!
//! Picks a framework from the request (or from keywords in the question)
//! and answers with canned recommendations. Used with `--offline` and when
//! no backend is reachable during demos.

use crate::analyzer::Analyzer;
use crate::catalog::FrameworkCatalog;
use crate::models::{AnalysisRequest, AnalysisResponse, MetricValue, Metrics};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Framework choice plus the canned material that goes with it.
struct Playbook {
    framework: &'static str,
    confidence: f64,
    lead: &'static str,
    recommendations: [&'static str; 3],
}

static COMPETITION: Playbook = Playbook {
    framework: "Porter's Five Forces",
    confidence: 0.90,
    lead: "With limited resources, differentiate rather than compete head-on.",
    recommendations: [
        "Focus on unique capabilities competitors lack",
        "Target underserved market segments",
        "Build strategic partnerships to compete with larger players",
    ],
};

static RESOURCES: Playbook = Playbook {
    framework: "RICE Framework",
    confidence: 0.88,
    lead: "Prioritize high-reach, high-impact initiatives within the current budget.",
    recommendations: [
        "Allocate 70% to product development and 30% to marketing",
        "Focus on beta user conversion over new acquisition",
        "Leverage organic and content marketing over paid ads",
    ],
};

static MARKET: Playbook = Playbook {
    framework: "Jobs-to-be-Done",
    confidence: 0.82,
    lead: "Identify the core job users hire the product to accomplish.",
    recommendations: [
        "Interview current users about their core needs",
        "Identify the primary job-to-be-done the product solves",
        "Position features around job completion outcomes",
    ],
};

static DEFAULT: Playbook = Playbook {
    framework: "ICE Framework",
    confidence: 0.85,
    lead: "Score candidate initiatives on impact, confidence and ease.",
    recommendations: [
        "Prioritize high-impact, low-effort initiatives",
        "Conduct competitive analysis for market positioning",
        "Implement a user feedback collection system",
    ],
};

fn playbook_for(question: &str) -> &'static Playbook {
    let q = question.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| q.contains(w));

    if mentions(&["competitor", "competition"]) {
        &COMPETITION
    } else if mentions(&["resource", "budget"]) {
        &RESOURCES
    } else if mentions(&["market", "growth"]) {
        &MARKET
    } else {
        &DEFAULT
    }
}

/// Keyword-driven analyzer that needs no network.
#[derive(Debug, Clone, Default)]
pub struct LocalAnalyzer {
    catalog: FrameworkCatalog,
}

impl LocalAnalyzer {
    pub fn new(catalog: FrameworkCatalog) -> Self {
        Self { catalog }
    }

    fn build_response(&self, request: &AnalysisRequest) -> AnalysisResponse {
        let playbook = playbook_for(request.question());

        // A requested framework wins over keyword matching.
        let requested = request
            .framework()
            .and_then(|id| self.catalog.resolve_name(id));
        let (framework, selection) = match requested {
            Some(name) => (name.to_string(), "requested"),
            None => (playbook.framework.to_string(), "keyword"),
        };

        let mut analysis = format!(
            "Strategic analysis using {}:\n\n{}\n\n{}",
            framework,
            request.question(),
            playbook.lead
        );
        if let Some(context) = request.context() {
            analysis.push_str(&format!("\n\nContext considered: {}.", context));
        }

        let tasks: Vec<String> = playbook
            .recommendations
            .iter()
            .map(|r| r.to_string())
            .collect();

        let mut metrics = Metrics::new();
        metrics.insert(
            "action_items".to_string(),
            MetricValue::Number(tasks.len() as f64),
        );
        metrics.insert("framework_selection".to_string(), selection.into());
        let context_state = if request.context().is_some() {
            "provided"
        } else {
            "none"
        };
        metrics.insert("context".to_string(), context_state.into());

        AnalysisResponse {
            analysis,
            framework,
            confidence: playbook.confidence,
            tasks,
            metrics,
        }
    }
}

#[async_trait]
impl Analyzer for LocalAnalyzer {
    fn name(&self) -> &str {
        "offline"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        let response = self.build_response(request);
        debug!(
            "Offline analysis resolved {} ({:.2})",
            response.framework, response.confidence
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{validate_response, SessionLog};
    use crate::models::CompanyContext;

    fn analyze(log: &mut SessionLog, question: &str, framework: Option<&str>) -> AnalysisResponse {
        let request = log
            .submit(question, None, framework.map(String::from))
            .unwrap();
        tokio_test::block_on(LocalAnalyzer::default().analyze(&request)).unwrap()
    }

    #[test]
    fn test_keyword_selection() {
        let mut log = SessionLog::new();
        assert_eq!(
            analyze(&mut log, "How do we beat our competitor?", None).framework,
            "Porter's Five Forces"
        );
        assert_eq!(
            analyze(&mut log, "Where should the budget go?", None).framework,
            "RICE Framework"
        );
        assert_eq!(
            analyze(&mut log, "What drives Growth now?", None).framework,
            "Jobs-to-be-Done"
        );
        assert_eq!(
            analyze(&mut log, "What should we build next?", None).framework,
            "ICE Framework"
        );
    }

    #[test]
    fn test_requested_framework_wins() {
        let mut log = SessionLog::new();
        let response = analyze(&mut log, "How do we beat our competitor?", Some("swot"));
        assert_eq!(response.framework, "SWOT Analysis");
        assert_eq!(
            response.metrics["framework_selection"],
            MetricValue::from("requested")
        );
    }

    #[test]
    fn test_unknown_requested_framework_falls_back_to_keywords() {
        let mut log = SessionLog::new();
        let response = analyze(&mut log, "Budget split?", Some("BCG"));
        assert_eq!(response.framework, "RICE Framework");
    }

    #[test]
    fn test_responses_are_valid_and_foldable() {
        let mut log = SessionLog::new();
        let response = analyze(&mut log, "Anything", None);
        assert!(validate_response(&response).is_ok());
        assert_eq!(response.tasks.len(), 3);

        log.receive(response).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_context_mentioned_in_analysis() {
        let mut log = SessionLog::new();
        let context = CompanyContext {
            industry: "Healthtech".to_string(),
            stage: "Seed".to_string(),
            team_size: "1-10".to_string(),
            runway: "9 months".to_string(),
            constraint: "Regulation".to_string(),
        };
        let request = log.submit("Next step?", Some(context), None).unwrap();
        let response = LocalAnalyzer::default().analyze(&request).await.unwrap();

        assert!(response.analysis.contains("Healthtech"));
        assert_eq!(response.metrics["context"], MetricValue::from("provided"));
    }
}
