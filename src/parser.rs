//! Turning raw model output into [`SummaryRecord`]s.
//!
//! The model is asked for bare JSON but sometimes wraps it in a Markdown code
//! fence anyway. That is the only deviation normalized here; anything else
//! (trailing prose, truncated arrays) fails to decode.

use crate::error::PipelineError;
use crate::models::{Candidate, ModelSummary, SummaryRecord};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

static OPENING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```(?:json)?").unwrap());
static CLOSING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```$").unwrap());

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }
    let start = OPENING_FENCE.find(text).map_or(0, |m| m.end());
    let inner = &text[start..];
    let end = CLOSING_FENCE.find(inner).map_or(inner.len(), |m| m.start());
    inner[..end].trim()
}

/// Decode the model's answer into summaries, without any stamping.
pub fn decode_summaries(raw: &str) -> Result<Vec<ModelSummary>, PipelineError> {
    let summaries = serde_json::from_str::<Vec<ModelSummary>>(strip_code_fences(raw))?;
    Ok(summaries)
}

/// Decode, clean up and stamp the model's answer for `category`.
///
/// Records with a blank title or no points are dropped, repeated links keep
/// their first occurrence, and at most `top_k` records survive. Links that do
/// not match any candidate are reported but kept.
pub fn parse_response(
    raw: &str,
    category: &str,
    candidates: &[Candidate],
    top_k: usize,
    published: &str,
) -> Result<Vec<SummaryRecord>, PipelineError> {
    let decoded = decode_summaries(raw)?;
    let returned = decoded.len();

    let known_links: HashSet<&str> = candidates.iter().map(|c| c.link.as_str()).collect();

    let records: Vec<SummaryRecord> = decoded
        .into_iter()
        .filter(|s| {
            let usable = !s.title.trim().is_empty() && s.points.iter().any(|p| !p.trim().is_empty());
            if !usable {
                warn!(%category, link = %s.link, "Dropping summary without title or points");
            }
            usable
        })
        .unique_by(|s| s.link.clone())
        .take(top_k)
        .inspect(|s| {
            if !known_links.contains(s.link.as_str()) {
                warn!(%category, link = %s.link, "Summary link does not match any candidate");
            }
        })
        .map(|s| SummaryRecord::from_model(s, category, published))
        .collect();

    debug!(%category, returned, kept = records.len(), "Parsed model response");
    Ok(records)
}
