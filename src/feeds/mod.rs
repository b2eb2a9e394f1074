//! Feed sources that turn a category into summarization candidates.
//!
//! A [`FeedSource`] is asked once per category per run. Implementations do
//! not retry: an error here means the category is skipped for this run.
//!
//! # Sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | RSS / Atom over HTTP | [`rss`] | Parsed with `feed-rs`; limit applied after parsing |

pub mod rss;

use crate::config::Category;
use crate::error::PipelineError;
use crate::models::Candidate;

/// Something that can list the current candidates for a category.
pub trait FeedSource {
    /// Return at most `limit` candidates for `category`, in feed order.
    async fn candidates(
        &self,
        category: &Category,
        limit: usize,
    ) -> Result<Vec<Candidate>, PipelineError>;
}
