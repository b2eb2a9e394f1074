//! Data models shared by the pipeline stages.
//!
//! - [`Candidate`]: a feed entry under consideration during one run
//! - [`ModelSummary`]: one element of the array the model answers with
//! - [`SummaryRecord`]: the persisted, stamped summary
//! - [`Store`]: the whole persisted snapshot

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A feed entry considered for summarization. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Zero-based position in the feed.
    pub index: usize,
    pub title: String,
    pub link: String,
}

/// The shape the model is asked to produce for each selected story.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelSummary {
    pub title: String,
    pub points: Vec<String>,
    pub link: String,
}

/// A model-produced summary scoped to one category and one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SummaryRecord {
    /// Title in the configured output language.
    pub title: String,
    /// Explanatory bullets, most important first.
    pub points: Vec<String>,
    /// Verbatim link of the source candidate.
    pub link: String,
    pub category: String,
    /// ISO-8601 generation timestamp.
    pub published: String,
}

impl SummaryRecord {
    pub fn from_model(summary: ModelSummary, category: &str, published: &str) -> Self {
        Self {
            title: summary.title,
            points: summary.points,
            link: summary.link,
            category: category.to_string(),
            published: published.to_string(),
        }
    }

    /// `YYYY-MM-DD` part of the timestamp.
    pub fn published_date(&self) -> &str {
        self.published.get(..10).unwrap_or(&self.published)
    }
}

/// Category name → ranked records. The only persisted artifact.
///
/// Keys keep insertion order, so the document lists categories in the order
/// they are configured.
pub type Store = IndexMap<String, Vec<SummaryRecord>>;
