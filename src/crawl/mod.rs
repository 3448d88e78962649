// src/crawl/mod.rs
pub mod alpaca;
pub mod types;

use std::time::Duration;

use crate::crawl::types::{Crawler, RawArticle};

/// Rate limiting: pause between per-ticker requests.
const TICKER_PAUSE: Duration = Duration::from_millis(300);

/// Fetch news for every ticker with one crawler, accumulating all articles.
///
/// A failed ticker is logged and skipped; the rest of the batch still runs.
pub async fn crawl_all(
    crawler: &dyn Crawler,
    tickers: &[String],
    days_back: u32,
) -> Vec<RawArticle> {
    let mut all = Vec::new();
    for (i, ticker) in tickers.iter().enumerate() {
        println!("  Fetching news for {ticker}...");
        match crawler.fetch(ticker, days_back).await {
            Ok(mut articles) => {
                println!("    Found {} articles", articles.len());
                all.append(&mut articles);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = crawler.name(), %ticker, "crawler error");
                println!("    Warning: failed to fetch news for {ticker}");
            }
        }
        if i < tickers.len() - 1 {
            tokio::time::sleep(TICKER_PAUSE).await;
        }
    }
    all
}
