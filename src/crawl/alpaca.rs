//! Alpaca historical news client.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::config::HoldupConfig;
use crate::crawl::types::{Crawler, RawArticle};

const NEWS_URL: &str = "https://data.alpaca.markets/v1beta1/news";
/// Max articles per request.
const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    headline: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    created_at: Option<String>,
    source: Option<String>,
}

pub struct AlpacaCrawler {
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
}

impl AlpacaCrawler {
    /// Missing credentials fail construction with a setup hint.
    pub fn new(config: &HoldupConfig) -> Result<Self> {
        let (api_key, api_secret) = config.alpaca_credentials();
        if api_key.is_empty() || api_secret.is_empty() {
            bail!("Alpaca API credentials not found. Run 'holdup setup' first.");
        }
        let http = reqwest::Client::builder()
            .user_agent("holdup/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key,
            api_secret,
        })
    }

    /// Project one API page into raw articles for `ticker`.
    ///
    /// `content` prefers the summary; an empty summary falls back to the
    /// headline. Timestamps stay the strings the API returned.
    fn articles_from_response(ticker: &str, resp: NewsResponse) -> Vec<RawArticle> {
        let ticker = ticker.to_uppercase();
        let mut out = Vec::with_capacity(resp.news.len());
        for item in resp.news {
            let headline = item.headline.unwrap_or_default();
            let summary = item
                .summary
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string();
            let content = if summary.is_empty() {
                headline.clone()
            } else {
                summary
            };
            out.push(RawArticle {
                source_api: "alpaca".to_string(),
                ticker: ticker.clone(),
                title: headline,
                content,
                url: item.url.unwrap_or_default(),
                published_at: item.created_at.unwrap_or_default(),
                source_name: item.source.unwrap_or_default(),
            });
        }
        out
    }
}

#[async_trait]
impl Crawler for AlpacaCrawler {
    async fn fetch(&self, ticker: &str, days_back: u32) -> Result<Vec<RawArticle>> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(days_back));

        let resp = self
            .http
            .get(NEWS_URL)
            .header("Apca-Api-Key-Id", &self.api_key)
            .header("Apca-Api-Secret-Key", &self.api_secret)
            .query(&[
                ("symbols", ticker.to_uppercase()),
                ("start", start.to_rfc3339()),
                ("end", end.to_rfc3339()),
                ("limit", PAGE_LIMIT.to_string()),
            ])
            .send()
            .await
            .context("alpaca news get()")?;
        if !resp.status().is_success() {
            bail!("alpaca news returned {}", resp.status());
        }
        let body: NewsResponse = resp.json().await.context("decoding alpaca news body")?;
        Ok(Self::articles_from_response(ticker, body))
    }

    fn name(&self) -> &'static str {
        "alpaca"
    }
}
