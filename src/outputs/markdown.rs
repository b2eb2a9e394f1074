//! Markdown digest of a published snapshot.
//!
//! Renders the same layout the card viewer uses: one section per category
//! in configured order, the newest update date, numbered stories, then a link
//! to the original. A missing, empty or unreadable snapshot, or an empty
//! category, renders a notice instead of failing.

use crate::config::{Category, PromptVariant};
use crate::error::PipelineError;
use crate::models::{Store, SummaryRecord};
use crate::outputs::json::read_store;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub const NOT_READY: &str = "_Data is still being collected. Please check back shortly._";
pub const NO_NEWS: &str = "_No recent news._";

/// Read the snapshot at `store_path` and write its digest to `out`.
///
/// # Arguments
///
/// * `store_path` - Path of the JSON snapshot written by the pipeline
/// * `categories` - Configured categories, in display order
/// * `per_category` - Maximum number of stories shown per category
/// * `out` - Destination of the Markdown file
///
/// # Returns
///
/// `Ok(())` once the digest is written. A snapshot that cannot be read or
/// decoded is logged and rendered as "not ready"; only a failure to write
/// `out` is returned as an error.
#[instrument(level = "info", skip_all, fields(store = %store_path.display(), out = %out.display()))]
pub async fn write_digest(
    store_path: &Path,
    categories: &[Category],
    per_category: usize,
    out: &Path,
) -> Result<(), PipelineError> {
    let store = match read_store(store_path).await {
        Ok(store) => store,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Snapshot unreadable; digest shows it as not ready");
            None
        }
    };

    let md = store_to_markdown(store.as_ref(), categories, per_category);
    fs::write(out, md).await?;
    info!("Wrote Markdown digest");
    Ok(())
}

/// Render `store` (or its absence) as a Markdown document.
///
/// An absent or empty store renders the "not ready" notice; a category that
/// is missing or has no records renders the "no news" notice.
pub fn store_to_markdown(store: Option<&Store>, categories: &[Category], per_category: usize) -> String {
    let mut md = String::new();
    writeln!(md, "# 🧬 Deep Tech & Trends\n").unwrap();

    let Some(store) = store.filter(|s| !s.is_empty()) else {
        writeln!(md, "{NOT_READY}").unwrap();
        return md;
    };

    for category in categories {
        writeln!(md, "## {}\n", category.display_label()).unwrap();

        match store.get(&category.name).filter(|records| !records.is_empty()) {
            Some(records) => {
                writeln!(md, "Update: {}\n", records[0].published_date()).unwrap();
                for (i, record) in records.iter().take(per_category).enumerate() {
                    write_record(&mut md, i + 1, record, category.variant);
                }
            }
            None => writeln!(md, "{NO_NEWS}\n").unwrap(),
        }
    }
    md
}

fn write_record(md: &mut String, rank: usize, record: &SummaryRecord, variant: PromptVariant) {
    writeln!(md, "### {}. {}\n", rank, record.title).unwrap();
    match variant {
        PromptVariant::GlobalTech => {
            writeln!(md, "> 💡 **Key Tech:** {}\n", record.points.join(" ")).unwrap();
        }
        PromptVariant::Regional => {
            for point in &record.points {
                writeln!(md, "- {point}").unwrap();
            }
            md.push('\n');
        }
    }
    writeln!(md, "[🔗 Read the original]({})\n", record.link).unwrap();
    writeln!(md, "---\n").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_empty_store_is_not_ready() {
        let md = store_to_markdown(Some(&Store::new()), &Config::default().categories, 3);
        assert!(md.contains(NOT_READY));
        assert!(!md.contains(NO_NEWS));
    }

    #[tokio::test]
    async fn test_digest_of_corrupt_snapshot_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("news_data.json");
        let out = dir.path().join("digest.md");
        tokio::fs::write(&store_path, b"{\"AI_Tech\": [").await.unwrap();

        write_digest(&store_path, &Config::default().categories, 3, &out)
            .await
            .unwrap();
        let md = tokio::fs::read_to_string(&out).await.unwrap();
        assert!(md.contains(NOT_READY));
    }

    #[tokio::test]
    async fn test_digest_of_missing_snapshot_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("digest.md");

        write_digest(&dir.path().join("absent.json"), &Config::default().categories, 3, &out)
            .await
            .unwrap();
        let md = tokio::fs::read_to_string(&out).await.unwrap();
        assert!(md.contains(NOT_READY));
    }

    #[tokio::test]
    async fn test_digest_write_failure_is_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("no_such_dir").join("digest.md");
        let err = write_digest(&dir.path().join("absent.json"), &Config::default().categories, 3, &out)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    fn record(category: &str, title: &str) -> SummaryRecord {
        SummaryRecord {
            title: title.to_string(),
            points: vec!["first".to_string(), "second".to_string()],
            link: format!("https://news.example.com/{title}"),
            category: category.to_string(),
            published: "2025-05-06T09:00:00+09:00".to_string(),
        }
    }

    #[test]
    fn test_missing_store_is_not_ready() {
        let md = store_to_markdown(None, &Config::default().categories, 3);
        assert!(md.contains(NOT_READY));
        assert!(!md.contains("## "));
    }

    #[test]
    fn test_missing_and_empty_categories_show_no_news() {
        let mut store = Store::new();
        store.insert("Economy".to_string(), vec![]);
        let md = store_to_markdown(Some(&store), &Config::default().categories, 3);
        assert_eq!(md.matches(NO_NEWS).count(), 4);
    }

    #[test]
    fn test_layout_per_variant() {
        let mut store = Store::new();
        store.insert("AI_Tech".to_string(), vec![record("AI_Tech", "model")]);
        store.insert("World".to_string(), vec![record("World", "summit")]);
        let md = store_to_markdown(Some(&store), &Config::default().categories, 3);

        assert!(md.contains("## 🧬 AI Tech"));
        assert!(md.contains("Update: 2025-05-06"));
        assert!(md.contains("### 1. model"));
        assert!(md.contains("> 💡 **Key Tech:** first second"));
        assert!(md.contains("- first\n- second"));
        assert!(md.contains("[🔗 Read the original](https://news.example.com/summit)"));

        let ai = md.find("## 🧬 AI Tech").unwrap();
        let world = md.find("## 🌍 World").unwrap();
        assert!(ai < world);
    }

    #[test]
    fn test_per_category_limit() {
        let mut store = Store::new();
        store.insert(
            "IT_Biz".to_string(),
            (0..5).map(|i| record("IT_Biz", &format!("s{i}"))).collect(),
        );
        let md = store_to_markdown(Some(&store), &Config::default().categories, 2);
        assert!(md.contains("### 2. s1"));
        assert!(!md.contains("### 3. s2"));
    }
}
