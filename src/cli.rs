//! Command-line interface definitions.
//!
//! Everything has a default, so a bare invocation runs the stock briefing
//! and writes `data/news_data.json`. The API key is normally picked up from
//! `GEMINI_API_KEY` (a `.env` file in the working directory works too).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Stock configuration, key from the environment
/// deep_tech_briefing
///
/// # Custom categories and a Markdown digest next to the JSON
/// deep_tech_briefing -c briefing.yaml -m data/digest.md
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the path of the JSON store
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also render the published store as Markdown to this file
    #[arg(short, long)]
    pub markdown_output: Option<PathBuf>,

    /// Gemini API key; summarization is disabled without one
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}
