//! Analysis backends.
//!
//! An [`Analyzer`] turns an [`AnalysisRequest`] into an [`AnalysisResponse`].
//! The session log never calls an analyzer itself; the owning loop does,
//! between `submit` and `receive`.

pub mod http;
pub mod local;

use crate::models::{AnalysisRequest, AnalysisResponse};
use anyhow::Result;
use async_trait::async_trait;

pub use http::{HttpAnalyzer, HttpAnalyzerConfig};
pub use local::LocalAnalyzer;

/// Produces an analysis for a request.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short name shown in logs and transcripts.
    fn name(&self) -> &str;

    /// Analyze a request. Implementations always resolve a framework.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse>;
}
