//! Category-by-category orchestration.
//!
//! For each configured category, in order:
//! 1. **Fetch**: ask the [`FeedSource`] for up to N candidates
//! 2. **Prompt**: render the category-specific prompt
//! 3. **Summarize**: one model call through the [`Summarizer`]
//! 4. **Parse**: strip fences, decode, stamp
//!
//! Any failure inside a category yields an empty result for it; the run
//! moves on. After every category that produced output the orchestrator
//! sleeps for the configured delay. The store is written once at the end,
//! and only if at least one category produced records.

use crate::api::Summarizer;
use crate::config::{Category, Config};
use crate::error::PipelineError;
use crate::feeds::FeedSource;
use crate::models::{Store, SummaryRecord};
use crate::outputs::json;
use crate::parser::parse_response;
use crate::prompts::build_prompt;
use crate::utils::{looks_truncated, now_timestamp, truncate_for_log};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// What a run did, for the final log line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub categories_with_results: usize,
    pub categories_skipped: usize,
    pub records: usize,
    pub store_written: bool,
}

/// Wires the stages together for one run.
#[derive(Debug)]
pub struct Pipeline<'a, F, S> {
    config: &'a Config,
    feeds: &'a F,
    /// `None` when no API credential is configured; every category then yields nothing.
    summarizer: Option<&'a S>,
}

impl<'a, F, S> Pipeline<'a, F, S>
where
    F: FeedSource,
    S: Summarizer,
{
    pub fn new(config: &'a Config, feeds: &'a F, summarizer: Option<&'a S>) -> Self {
        Self {
            config,
            feeds,
            summarizer,
        }
    }

    /// Process every category and publish the store if anything came back.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut store = Store::new();
        let mut report = RunReport::default();

        if self.summarizer.is_none() {
            warn!("No model API key configured; summarization is disabled for this run");
        }

        for category in &self.config.categories {
            let records = self.process_category(category).await;
            if records.is_empty() {
                report.categories_skipped += 1;
                continue;
            }

            report.categories_with_results += 1;
            report.records += records.len();
            store.insert(category.name.clone(), records);

            let delay = self.config.category_delay();
            if !delay.is_zero() {
                debug!(?delay, "Pausing before next category");
                sleep(delay).await;
            }
        }

        if store.is_empty() {
            warn!("No category produced results; keeping the previous snapshot");
            return Ok(report);
        }

        json::write_store(&store, &self.config.store_path).await?;
        report.store_written = true;
        Ok(report)
    }

    /// Run one category end to end. Never fails; problems yield an empty list.
    #[instrument(level = "info", skip_all, fields(category = %category.name))]
    pub async fn process_category(&self, category: &Category) -> Vec<SummaryRecord> {
        let t0 = Instant::now();
        match self.try_process_category(category).await {
            Ok(records) => {
                info!(
                    count = records.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u128,
                    "Category processed"
                );
                records
            }
            Err(e) if e.is_rate_limited() => {
                warn!(error = %e, "Quota exceeded (429); skipping this category until the next run");
                Vec::new()
            }
            Err(PipelineError::Parse(e)) => {
                error!(
                    kind = "parse",
                    error = %e,
                    truncated = looks_truncated(&e),
                    "Model returned non-conforming JSON; skipping category"
                );
                Vec::new()
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Category failed; skipping");
                Vec::new()
            }
        }
    }

    async fn try_process_category(
        &self,
        category: &Category,
    ) -> Result<Vec<SummaryRecord>, PipelineError> {
        let limit = self.config.limit_for(category);
        info!(limit, primary = category.is_primary(), "Collecting candidates");

        let candidates = self.feeds.candidates(category, limit).await?;
        if candidates.is_empty() {
            info!("Feed returned no entries");
            return Ok(Vec::new());
        }

        let Some(summarizer) = self.summarizer else {
            return Ok(Vec::new());
        };

        let prompt = build_prompt(
            category,
            &candidates,
            self.config.top_k,
            &self.config.output_language,
        );
        debug!(candidates = candidates.len(), prompt_bytes = prompt.len(), "Requesting summary");

        let raw = summarizer.summarize(&prompt).await?;
        debug!(response_preview = %truncate_for_log(&raw, 300), "Model answered");

        parse_response(
            &raw,
            &category.name,
            &candidates,
            self.config.top_k,
            &now_timestamp(),
        )
    }
}
