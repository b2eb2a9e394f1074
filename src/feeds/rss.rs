//! RSS / Atom feed adapter.
//!
//! Downloads the category's feed URL with the shared HTTP client and hands the
//! bytes to `feed-rs`, which understands RSS 0.9x/1.0/2.0, Atom and JSON Feed.
//! Only the first `limit` entries are kept.

use super::FeedSource;
use crate::config::Category;
use crate::error::PipelineError;
use crate::models::Candidate;
use reqwest::Client;
use tracing::{debug, info, instrument};

/// Fetches candidates from a category's `feed_url` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Create a feed source that downloads through `client`.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every feed request
    ///
    /// # Returns
    ///
    /// A source that fetches and parses feeds on demand. The client is shared with the model client, so its timeout and user
    /// agent apply to feed requests too.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(format!("{url} answered HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip_all, fields(category = %category.name))]
    async fn candidates(
        &self,
        category: &Category,
        limit: usize,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let body = self.download(&category.feed_url).await?;
        debug!(bytes = body.len(), "Downloaded feed");

        let candidates = candidates_from_feed(&body, limit)?;
        info!(count = candidates.len(), limit, "Collected feed candidates");
        Ok(candidates)
    }
}

/// Parse a raw feed document and keep its first `limit` entries.
///
/// Entries missing a title or link keep their slot with an empty string so
/// ordinals always match feed positions.
pub fn candidates_from_feed(body: &[u8], limit: usize) -> Result<Vec<Candidate>, PipelineError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| PipelineError::Fetch(e.to_string()))?;

    let candidates = feed
        .entries
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| Candidate {
            index,
            link: entry_link(&entry),
            title: entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default(),
        })
        .collect();

    Ok(candidates)
}

/// The article link of an entry.
///
/// Atom entries can carry several links (`replies`, `self`, `enclosure`); the
/// article is the first non-blank link with no `rel` or `rel="alternate"`.
/// Otherwise the first non-blank href is used.
fn entry_link(entry: &feed_rs::model::Entry) -> String {
    let non_blank = || entry.links.iter().filter(|l| !l.href.trim().is_empty());

    non_blank()
        .find(|l| {
            let rel = l.rel.as_deref().unwrap_or("");
            rel.is_empty() || rel.eq_ignore_ascii_case("alternate")
        })
        .or_else(|| non_blank().next())
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptVariant;
    use mockito::Server;

    fn rss_with(n: usize) -> String {
        let items: String = (0..n)
            .map(|i| {
                format!(
                    "<item><title>Story {i}</title><link>https://news.example.com/{i}</link></item>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test</title><link>https://news.example.com</link><description>d</description>{items}</channel></rss>"#
        )
    }

    fn category(url: String) -> Category {
        Category {
            name: "World".to_string(),
            label: None,
            feed_url: url,
            variant: PromptVariant::Regional,
            limit: None,
        }
    }

    #[test]
    fn test_limit_applies() {
        let candidates = candidates_from_feed(rss_with(10).as_bytes(), 4).unwrap();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].index, 0);
        assert_eq!(candidates[3].index, 3);
        assert_eq!(candidates[3].title, "Story 3");
        assert_eq!(candidates[3].link, "https://news.example.com/3");
    }

    #[test]
    fn test_short_feed_yields_entry_count() {
        let candidates = candidates_from_feed(rss_with(3).as_bytes(), 15).unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_empty_feed_yields_nothing() {
        let candidates = candidates_from_feed(rss_with(0).as_bytes(), 15).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_atom_feed() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <id>urn:uuid:feed</id>
  <updated>2025-05-06T10:00:00Z</updated>
  <entry>
    <title>Open weights released</title>
    <link href="https://lab.example.org/post"/>
    <id>urn:uuid:1</id>
    <updated>2025-05-06T10:00:00Z</updated>
  </entry>
</feed>"#;
        let candidates = candidates_from_feed(atom.as_bytes(), 5).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Open weights released");
        assert_eq!(candidates[0].link, "https://lab.example.org/post");
    }

    #[test]
    fn test_atom_entry_prefers_alternate_link() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <id>urn:uuid:feed</id>
  <updated>2025-05-06T10:00:00Z</updated>
  <entry>
    <title>Open weights released</title>
    <link rel="replies" href="https://lab.example.org/post/comments"/>
    <link rel="alternate" href="https://lab.example.org/post"/>
    <id>urn:uuid:1</id>
    <updated>2025-05-06T10:00:00Z</updated>
  </entry>
  <entry>
    <title>Only a self link</title>
    <link rel="self" href="https://lab.example.org/entries/2"/>
    <id>urn:uuid:2</id>
    <updated>2025-05-06T10:00:00Z</updated>
  </entry>
</feed>"#;
        let candidates = candidates_from_feed(atom.as_bytes(), 5).unwrap();
        assert_eq!(candidates[0].link, "https://lab.example.org/post");
        assert_eq!(candidates[1].link, "https://lab.example.org/entries/2");
    }

    #[test]
    fn test_garbage_is_fetch_error() {
        let err = candidates_from_feed(b"<html>not a feed", 5).unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }

    #[tokio::test]
    async fn test_http_source_reads_feed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/world.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(rss_with(5))
            .create_async()
            .await;

        let source = HttpFeedSource::new(Client::new());
        let cat = category(format!("{}/world.xml", server.url()));
        let candidates = source.candidates(&cat, 2).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].title, "Story 1");
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/down.xml")
            .with_status(503)
            .create_async()
            .await;

        let source = HttpFeedSource::new(Client::new());
        let cat = category(format!("{}/down.xml", server.url()));
        let err = source.candidates(&cat, 5).await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }
}
