//! Runtime configuration.
//!
//! Configuration is loaded once in `main` from an optional YAML file and
//! passed down explicitly. Every field has a default, so an empty file (or no
//! file at all) yields the stock four-category briefing.
//!
//! ```yaml
//! top_k: 5
//! output_language: Korean
//! store_path: data/news_data.json
//! model:
//!   name: gemini-2.5-flash
//!   temperature: 0.3
//! categories:
//!   - name: AI_Tech
//!     label: "🧬 AI Tech"
//!     feed_url: https://news.google.com/rss/search?q=LLM&hl=en-US&gl=US&ceid=US:en
//!     variant: global_tech
//! ```

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Which prompt flavour a category gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    /// Foreign-language technology feed: translate, favour research over business.
    GlobalTech,
    /// Local-language general feed: favour cross-outlet significance.
    Regional,
}

/// A topical bucket with its own feed and prompt variant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Category {
    /// Key used in the persisted store.
    pub name: String,
    /// Human-facing heading used by the Markdown digest.
    #[serde(default)]
    pub label: Option<String>,
    pub feed_url: String,
    pub variant: PromptVariant,
    /// Explicit candidate limit; falls back to the global search count.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Category {
    pub fn new(name: &str, label: &str, feed_url: &str, variant: PromptVariant) -> Self {
        Self {
            name: name.to_string(),
            label: Some(label.to_string()),
            feed_url: feed_url.to_string(),
            variant,
            limit: None,
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn is_primary(&self) -> bool {
        self.variant == PromptVariant::GlobalTech
    }
}

/// Language-model endpoint settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Generative Language REST API.
    pub endpoint: String,
    pub name: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            name: "gemini-2.5-flash".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

/// Settings for the Markdown digest.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DigestConfig {
    pub items_per_category: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self { items_per_category: 3 }
    }
}

impl DigestConfig {
    /// Items shown per category, clamped to 1..=5.
    pub fn items(&self) -> usize {
        self.items_per_category.clamp(1, 5)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Feed entries considered per regional category.
    pub search_count: usize,
    /// Extra entries fetched for the global-tech category.
    pub primary_extra: usize,
    /// Records kept per category.
    pub top_k: usize,
    pub output_language: String,
    pub store_path: PathBuf,
    /// Pause after every category that produced output.
    pub category_delay_secs: u64,
    pub model: ModelConfig,
    pub digest: DigestConfig,
    pub categories: Vec<Category>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_count: 15,
            primary_extra: 5,
            top_k: 5,
            output_language: "Korean".to_string(),
            store_path: PathBuf::from("data/news_data.json"),
            category_delay_secs: 5,
            model: ModelConfig::default(),
            digest: DigestConfig::default(),
            categories: default_categories(),
        }
    }
}

fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "AI_Tech",
            "🧬 AI Tech",
            "https://news.google.com/rss/search?q=AI+Tech+OR+LLM+OR+Generative+AI+OR+Deep+Learning+when:2d&hl=en-US&gl=US&ceid=US:en",
            PromptVariant::GlobalTech,
        ),
        Category::new(
            "IT_Biz",
            "🏢 IT Biz",
            "https://news.google.com/rss/headlines/section/topic/TECHNOLOGY?hl=ko&gl=KR&ceid=KR:ko",
            PromptVariant::Regional,
        ),
        Category::new(
            "Economy",
            "💰 Economy",
            "https://news.google.com/rss/headlines/section/topic/BUSINESS?hl=ko&gl=KR&ceid=KR:ko",
            PromptVariant::Regional,
        ),
        Category::new(
            "World",
            "🌍 World",
            "https://news.google.com/rss/headlines/section/topic/WORLD?hl=ko&gl=KR&ceid=KR:ko",
            PromptVariant::Regional,
        ),
    ]
}

impl Config {
    /// Load configuration from `path`, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    PipelineError::Config(format!("cannot read {}: {}", p.display(), e))
                })?;
                let parsed = Self::from_yaml(&raw)?;
                info!(path = %p.display(), "Loaded configuration file");
                parsed
            }
            None => {
                info!("No configuration file given; using built-in defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration document.
    ///
    /// # Arguments
    ///
    /// * `raw` - YAML text; omitted keys take their defaults
    ///
    /// # Returns
    ///
    /// The parsed configuration (the defaults for an empty document), or
    /// `PipelineError::Config` when the YAML is malformed. The result is not
    /// validated; call [`Config::validate`] for that.
    pub fn from_yaml(raw: &str) -> Result<Self, PipelineError> {
        // An empty document deserializes as unit, not as a defaulted struct.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Check the invariants a run relies on.
    ///
    /// # Returns
    ///
    /// `Ok(())` when there is at least one category, `top_k` is positive, the
    /// temperature lies in `0..=2`, category names are unique and every feed
    /// URL parses. Otherwise `PipelineError::Config` naming the first problem.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.categories.is_empty() {
            return Err(PipelineError::Config("at least one category is required".into()));
        }
        if self.top_k == 0 {
            return Err(PipelineError::Config("top_k must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(PipelineError::Config(format!(
                "temperature {} is outside 0..=2",
                self.model.temperature
            )));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate category name `{}`",
                    category.name
                )));
            }
            Url::parse(&category.feed_url).map_err(|e| {
                PipelineError::Config(format!(
                    "category `{}` has an invalid feed_url: {}",
                    category.name, e
                ))
            })?;
        }
        Ok(())
    }

    /// Number of feed entries to consider for `category`.
    pub fn limit_for(&self, category: &Category) -> usize {
        match (category.limit, category.variant) {
            (Some(limit), _) => limit,
            (None, PromptVariant::GlobalTech) => self.search_count + self.primary_extra,
            (None, PromptVariant::Regional) => self.search_count,
        }
    }

    /// Pause taken after each category that produced records.
    ///
    /// # Returns
    ///
    /// `category_delay_secs` as a [`Duration`]; zero disables the pause.
    pub fn category_delay(&self) -> Duration {
        Duration::from_secs(self.category_delay_secs)
    }
}
