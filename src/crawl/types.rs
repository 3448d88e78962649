// src/crawl/types.rs
use anyhow::Result;

/// Raw article as fetched from a news API, pre-cleaning.
///
/// Immutable once created; staged verbatim. `url` is the identity key used
/// for deduplication at catalog-build time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawArticle {
    pub source_api: String,   // e.g., "alpaca"
    pub ticker: String,       // e.g., "AAPL"
    pub title: String,
    pub content: String,      // full body if available, else snippet
    pub url: String,
    pub published_at: String, // ISO 8601
    pub source_name: String,  // e.g., "Benzinga"
}

#[async_trait::async_trait]
pub trait Crawler: Send + Sync {
    /// Fetch articles for one ticker over a lookback window of `days_back` days.
    async fn fetch(&self, ticker: &str, days_back: u32) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}
