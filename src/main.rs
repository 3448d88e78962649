//! holdup: Binary Entrypoint
//! Stock news for casual investors, explained in plain English.
//!
//! Pipeline stages: crawl, stage, catalog, summary.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use holdup::catalog::{process_catalog, CatalogStore};
use holdup::config::HoldupConfig;
use holdup::consume::summary::SummaryConsumer;
use holdup::consume::Consumer;
use holdup::crawl::alpaca::AlpacaCrawler;
use holdup::crawl::crawl_all;
use holdup::staging::StagingStore;

/// Lookback window for crawling, in days.
const DAYS_BACK: u32 = 1;

#[derive(Parser)]
#[command(
    name = "holdup",
    version,
    about = "Stock news for casual investors, explained in plain English."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive setup for API keys.
    Setup,
    /// Add tickers to your watchlist.
    Add {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// Remove a ticker from your watchlist.
    Remove { ticker: String },
    /// Show your watchlist.
    List,
    /// Full pipeline: crawl, stage, catalog, summary.
    Check { tickers: Vec<String> },
    /// Run stages 1-2 only (crawl and stage).
    Crawl { tickers: Vec<String> },
    /// Run stage 3 only (build catalog from today's staging).
    Catalog,
    /// Run stage 4 only (re-run summary on existing catalog).
    Resummarize,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holdup=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = HoldupConfig::from_home()?;

    match cli.command {
        Command::Setup => cmd_setup(&config),
        Command::Add { tickers } => cmd_add(&config, &tickers),
        Command::Remove { ticker } => cmd_remove(&config, &ticker),
        Command::List => cmd_list(&config),
        Command::Check { tickers } => cmd_check(&config, tickers).await,
        Command::Crawl { tickers } => cmd_crawl(&config, tickers).await,
        Command::Catalog => cmd_catalog(&config),
        Command::Resummarize => cmd_resummarize(&config).await,
    }
}

/// Prompt on stdin, offering the masked existing value as the default.
fn prompt_key(label: &str, existing: &str) -> Result<String> {
    if existing.is_empty() {
        print!("{label}: ");
    } else {
        let head: String = existing.chars().take(8).collect();
        print!("{label} [{head}...]: ");
    }
    io::stdout().flush().context("flushing stdout")?;

    let mut line = String::new();
    io::stdin().read_line(&mut line).context("reading stdin")?;
    let entered = line.trim();
    if entered.is_empty() {
        Ok(existing.to_string())
    } else {
        Ok(entered.to_string())
    }
}

fn cmd_setup(config: &HoldupConfig) -> Result<()> {
    println!("Welcome to holdup setup!\n");
    println!("You'll need API keys from:");
    println!("  - Alpaca (https://alpaca.markets/) - for stock news");
    println!("  - OpenAI (https://platform.openai.com/) - for summaries\n");

    let (existing_key, existing_secret) = config.alpaca_credentials();
    let existing_openai = config.openai_api_key();

    let alpaca_key = prompt_key("Alpaca API Key", &existing_key)?;
    let alpaca_secret = prompt_key("Alpaca API Secret", &existing_secret)?;
    let openai_key = prompt_key("OpenAI API Key", &existing_openai)?;

    config.save_env(&alpaca_key, &alpaca_secret, &openai_key)?;
    config.ensure_directories()?;

    println!(
        "\nConfiguration saved to {}",
        config.env_path().display()
    );
    println!("Run 'holdup add AAPL MSFT' to add tickers to your watchlist.");
    Ok(())
}

fn cmd_add(config: &HoldupConfig, tickers: &[String]) -> Result<()> {
    let updated = config.add_tickers(tickers)?;
    let added: Vec<String> = tickers.iter().map(|t| t.to_uppercase()).collect();
    println!("Added: {}", added.join(", "));
    println!("Watchlist: {}", updated.join(", "));
    Ok(())
}

fn cmd_remove(config: &HoldupConfig, ticker: &str) -> Result<()> {
    if config.remove_ticker(ticker)? {
        println!("Removed: {}", ticker.to_uppercase());
        let remaining = config.load_watchlist()?;
        if remaining.is_empty() {
            println!("Watchlist is now empty.");
        } else {
            println!("Watchlist: {}", remaining.join(", "));
        }
    } else {
        println!("Ticker {} not in watchlist.", ticker.to_uppercase());
    }
    Ok(())
}

fn cmd_list(config: &HoldupConfig) -> Result<()> {
    let watchlist = config.load_watchlist()?;
    if watchlist.is_empty() {
        println!("Watchlist is empty. Run 'holdup add AAPL MSFT' to add tickers.");
    } else {
        println!("Watchlist ({} tickers):", watchlist.len());
        for ticker in watchlist {
            println!("  {ticker}");
        }
    }
    Ok(())
}

/// Tickers from the command line, falling back to the watchlist.
fn resolve_tickers(config: &HoldupConfig, args: Vec<String>) -> Result<Vec<String>> {
    if args.is_empty() {
        config.load_watchlist()
    } else {
        Ok(args.iter().map(|t| t.to_uppercase()).collect())
    }
}

/// Stages 1-2: crawl the tickers and append everything to staging.
async fn crawl_and_stage(
    config: &HoldupConfig,
    tickers: &[String],
    today: NaiveDate,
) -> Result<()> {
    let crawler = match AlpacaCrawler::new(config) {
        Ok(c) => c,
        Err(e) => {
            println!("Error: {e:#}");
            return Ok(());
        }
    };

    let articles = crawl_all(&crawler, tickers, DAYS_BACK).await;
    if articles.is_empty() {
        println!("\nNo new articles found.");
        return Ok(());
    }

    let staging = StagingStore::new(config.staging_dir());
    let total = staging.append(&articles, today)?;
    println!(
        "\nStaged {} new articles (total in staging: {total})",
        articles.len()
    );
    Ok(())
}

async fn cmd_check(config: &HoldupConfig, tickers: Vec<String>) -> Result<()> {
    let ticker_list = resolve_tickers(config, tickers)?;
    if ticker_list.is_empty() {
        println!("No tickers specified and watchlist is empty.");
        println!("Run 'holdup add AAPL MSFT' to add tickers, or specify them directly.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    println!(
        "Checking {} tickers: {}",
        ticker_list.len(),
        ticker_list.join(", ")
    );
    println!("Date: {today}\n");

    println!("Stage 1-2: Fetching news...");
    crawl_and_stage(config, &ticker_list, today).await?;

    println!("\nStage 3: Building catalog...");
    let staging = StagingStore::new(config.staging_dir());
    let catalog_store = CatalogStore::new(config.catalog_dir());
    let catalog = process_catalog(&staging, &catalog_store, today)?;

    if catalog.is_empty() {
        println!("No articles to catalog.");
        return Ok(());
    }
    let total_articles: usize = catalog.values().map(Vec::len).sum();
    println!(
        "Catalog: {} tickers, {total_articles} unique articles",
        catalog.len()
    );

    println!("\nStage 4: Generating summaries...");
    match SummaryConsumer::new(config) {
        Ok(consumer) => consumer.consume(&catalog, &today.to_string()).await?,
        Err(e) => println!("Error: {e:#}"),
    }
    Ok(())
}

async fn cmd_crawl(config: &HoldupConfig, tickers: Vec<String>) -> Result<()> {
    let ticker_list = resolve_tickers(config, tickers)?;
    if ticker_list.is_empty() {
        println!("No tickers specified and watchlist is empty.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    println!(
        "Crawling {} tickers: {}\n",
        ticker_list.len(),
        ticker_list.join(", ")
    );
    crawl_and_stage(config, &ticker_list, today).await
}

fn cmd_catalog(config: &HoldupConfig) -> Result<()> {
    let today = Local::now().date_naive();
    println!("Building catalog for {today}...\n");

    let staging = StagingStore::new(config.staging_dir());
    let catalog_store = CatalogStore::new(config.catalog_dir());
    let catalog = process_catalog(&staging, &catalog_store, today)?;

    if catalog.is_empty() {
        println!("No articles to catalog. Run 'holdup crawl' first.");
        return Ok(());
    }

    let total_articles: usize = catalog.values().map(Vec::len).sum();
    println!(
        "Catalog: {} tickers, {total_articles} unique articles",
        catalog.len()
    );
    for (ticker, articles) in &catalog {
        println!("  {ticker}: {} articles", articles.len());
    }
    Ok(())
}

async fn cmd_resummarize(config: &HoldupConfig) -> Result<()> {
    let today = Local::now().date_naive();
    println!("Loading catalog for {today}...");

    let catalog_store = CatalogStore::new(config.catalog_dir());
    let catalog = catalog_store.load(today)?;

    if catalog.is_empty() {
        println!("No catalog found. Run 'holdup check' or 'holdup catalog' first.");
        return Ok(());
    }

    match SummaryConsumer::new(config) {
        Ok(consumer) => consumer.consume(&catalog, &today.to_string()).await?,
        Err(e) => println!("Error: {e:#}"),
    }
    Ok(())
}
