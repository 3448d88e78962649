//! Plain-English digests via the OpenAI chat completions API.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogArticle};
use crate::config::HoldupConfig;
use crate::consume::Consumer;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a financial news assistant for casual retail investors. Analyze news for the given stock ticker using this format:

**Sentiment:** [Bullish / Bearish / Neutral]

**Credibility:** [Is this confirmed news or speculation? Are sources reliable?]

**Short term:** [What might happen in the next days/weeks?]

**Long term:** [What might this mean over months/years?]

**Pros:** [Reasons this news is good for holders]
**Cons:** [Reasons to be concerned]

Rules:
- If no articles are directly about this stock (just passing mentions), say \"No direct news\" and skip the analysis
- Be concise - one sentence per field
- Do NOT add info not in the articles
- Do NOT give buy/sell advice";

/// Consumer that writes one markdown digest per date, one section per
/// ticker, with the model's analysis as the section body.
pub struct SummaryConsumer {
    http: reqwest::Client,
    api_key: String,
    output_dir: PathBuf,
}

impl SummaryConsumer {
    /// Missing API key fails construction with a setup hint.
    pub fn new(config: &HoldupConfig) -> Result<Self> {
        let api_key = config.openai_api_key();
        if api_key.is_empty() {
            bail!("OpenAI API key not found. Run 'holdup setup' first.");
        }
        let http = reqwest::Client::builder()
            .user_agent("holdup/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key,
            output_dir: config.output_dir(),
        })
    }

    async fn summarize_ticker(
        &self,
        ticker: &str,
        articles: &[CatalogArticle],
    ) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            temperature: f32,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: Option<String>,
        }

        let user_prompt = build_user_prompt(ticker, articles);
        let req = Req {
            model: MODEL,
            temperature: 0.3,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("chat completions post()")?;
        if !resp.status().is_success() {
            bail!("chat completions returned {}", resp.status());
        }
        let body: Resp = resp.json().await.context("decoding chat completions body")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            Ok("No summary generated.".to_string())
        } else {
            Ok(content)
        }
    }
}

/// Article context block fed to the model, one numbered section per article.
fn build_user_prompt(ticker: &str, articles: &[CatalogArticle]) -> String {
    let mut text = String::new();
    for (i, article) in articles.iter().enumerate() {
        text.push_str(&format!("\n--- Article {} ---\n", i + 1));
        text.push_str(&format!("Title: {}\n", article.title));
        text.push_str(&format!("Source: {}\n", article.source_name));
        text.push_str(&format!("Published: {}\n", article.published_at));
        text.push_str(&format!("Content: {}\n", article.content));
    }
    format!("Ticker: {ticker}\n\nRecent news articles:{text}")
}

/// Assemble the markdown digest from per-ticker sections.
fn render_digest(date_str: &str, sections: &[(String, String)]) -> String {
    let mut out = format!("# Stock News Summary - {date_str}\n\n");
    let body: Vec<String> = sections
        .iter()
        .map(|(ticker, summary)| format!("## {ticker}\n\n{summary}\n"))
        .collect();
    out.push_str(&body.join("\n"));
    out
}

#[async_trait]
impl Consumer for SummaryConsumer {
    async fn consume(&self, catalog: &Catalog, date_str: &str) -> Result<()> {
        if catalog.is_empty() {
            println!("No articles to summarize.");
            return Ok(());
        }

        println!("\nGenerating summaries for {} tickers...", catalog.len());

        let mut sections: Vec<(String, String)> = Vec::new();
        for (ticker, articles) in catalog {
            println!("  Summarizing {ticker} ({} articles)...", articles.len());
            // One bad ticker must not sink the rest; its error text becomes
            // the section body.
            let summary = match self.summarize_ticker(ticker, articles).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = ?e, %ticker, "summary failed");
                    format!("Error generating summary: {e:#}")
                }
            };

            println!("\n{}", "=".repeat(50));
            println!("  {ticker}");
            println!("{}", "=".repeat(50));
            println!("{summary}\n");

            sections.push((ticker.clone(), summary));
        }

        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;
        let output_file = self.output_dir.join(format!("summary_{date_str}.md"));
        fs::write(&output_file, render_digest(date_str, &sections))
            .with_context(|| format!("writing {}", output_file.display()))?;

        println!("\nSummary saved to: {}", output_file.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "summary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> CatalogArticle {
        CatalogArticle {
            ticker: "AAPL".into(),
            title: title.into(),
            content: format!("{title} content"),
            url: "https://example.com/a".into(),
            published_at: "2024-05-01T12:00:00Z".into(),
            source_name: "Benzinga".into(),
        }
    }

    #[test]
    fn user_prompt_lists_numbered_articles() {
        let articles = vec![article("First"), article("Second")];
        let prompt = build_user_prompt("AAPL", &articles);
        assert!(prompt.starts_with("Ticker: AAPL\n"));
        assert!(prompt.contains("--- Article 1 ---"));
        assert!(prompt.contains("--- Article 2 ---"));
        assert!(prompt.contains("Title: First\n"));
        assert!(prompt.contains("Source: Benzinga\n"));
        assert!(prompt.contains("Published: 2024-05-01T12:00:00Z\n"));
    }

    #[test]
    fn digest_has_header_and_one_section_per_ticker() {
        let sections = vec![
            ("AAPL".to_string(), "Looks fine.".to_string()),
            ("MSFT".to_string(), "Also fine.".to_string()),
        ];
        let md = render_digest("2024-05-01", &sections);
        assert!(md.starts_with("# Stock News Summary - 2024-05-01\n"));
        assert!(md.contains("## AAPL\n\nLooks fine.\n"));
        assert!(md.contains("## MSFT\n\nAlso fine.\n"));
    }
}
