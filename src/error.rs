//! Error taxonomy for the briefing pipeline.
//!
//! Every failure inside a category run collapses into the same "skip this
//! category" behavior in the orchestrator. The variants exist so logs can say
//! *why* a category was skipped.

use thiserror::Error;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The feed could not be downloaded or parsed.
    #[error("feed fetch failed: {0}")]
    Fetch(String),

    /// The model endpoint reported an exhausted quota.
    #[error("model quota exceeded: {0}")]
    RateLimited(String),

    /// Any other failure talking to the model endpoint.
    #[error("model call failed: {0}")]
    Model(String),

    /// The model answered with something that is not the expected JSON array.
    #[error("could not decode model response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Short, stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::RateLimited(_) => "rate_limited",
            PipelineError::Model(_) => "model",
            PipelineError::Parse(_) => "parse",
            PipelineError::Io(_) => "io",
            PipelineError::Config(_) => "config",
        }
    }

    /// Whether the model rejected the call for quota reasons.
    ///
    /// # Returns
    ///
    /// `true` only for [`PipelineError::RateLimited`], i.e. an HTTP 429 or a
    /// `RESOURCE_EXHAUSTED` error body.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PipelineError::RateLimited(_))
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Model(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(PipelineError::Fetch("x".into()).kind(), "fetch");
        assert_eq!(PipelineError::RateLimited("x".into()).kind(), "rate_limited");
        assert_eq!(PipelineError::Model("x".into()).kind(), "model");
        assert_eq!(PipelineError::Config("x".into()).kind(), "config");

        let json_err = serde_json::from_str::<Vec<String>>("nope").unwrap_err();
        assert_eq!(PipelineError::from(json_err).kind(), "parse");
    }

    #[test]
    fn test_only_rate_limit_is_rate_limited() {
        assert!(PipelineError::RateLimited("429".into()).is_rate_limited());
        assert!(!PipelineError::Model("500".into()).is_rate_limited());
    }
}
