// src/catalog.rs
//! Catalog build: dedup staged articles by URL, group by ticker, sort by
//! recency, and persist the result as the day's catalog artifact.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::crawl::types::RawArticle;
use crate::staging::StagingStore;
use crate::store::{self, StorageError};

/// Cleaned article ready for consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogArticle {
    pub ticker: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_at: String, // ISO 8601, compared as a string
    pub source_name: String,
}

impl From<&RawArticle> for CatalogArticle {
    fn from(raw: &RawArticle) -> Self {
        Self {
            ticker: raw.ticker.clone(),
            title: raw.title.clone(),
            content: raw.content.clone(),
            url: raw.url.clone(),
            published_at: raw.published_at.clone(),
            source_name: raw.source_name.clone(),
        }
    }
}

/// Ticker symbol → that ticker's articles, most recent first.
///
/// Only tickers with at least one surviving article appear as keys, and no
/// URL appears twice anywhere in the map.
pub type Catalog = BTreeMap<String, Vec<CatalogArticle>>;

/// Dedup, group, and sort already-loaded staging records.
///
/// The first staged copy of a URL wins: when two crawl runs staged the same
/// article and the later copy carries edited fields, the earlier copy's
/// fields are kept.
fn assemble(raw_articles: Vec<RawArticle>) -> Catalog {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut catalog = Catalog::new();

    for raw in &raw_articles {
        if !seen_urls.insert(raw.url.clone()) {
            continue;
        }
        catalog
            .entry(raw.ticker.clone())
            .or_default()
            .push(CatalogArticle::from(raw));
    }

    for articles in catalog.values_mut() {
        // Stable sort: equal timestamps keep their staged order. Lexicographic
        // descending on ISO 8601 strings is chronological descending, and
        // empty timestamps land last.
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }

    catalog
}

/// Build the day's catalog from staging. An empty staging day yields an
/// empty catalog without touching any file.
pub fn build_catalog(
    staging: &StagingStore,
    for_date: NaiveDate,
) -> Result<Catalog, StorageError> {
    let raw = staging.load(for_date)?;
    if raw.is_empty() {
        return Ok(Catalog::new());
    }
    Ok(assemble(raw))
}

/// Build and save the catalog for a date. An empty build is returned as-is
/// and nothing is written, so any prior catalog file for the date survives.
pub fn process_catalog(
    staging: &StagingStore,
    catalog_store: &CatalogStore,
    for_date: NaiveDate,
) -> Result<Catalog, StorageError> {
    let catalog = build_catalog(staging, for_date)?;
    if !catalog.is_empty() {
        catalog_store.save(&catalog, for_date)?;
    }
    Ok(catalog)
}

/// Whole-file persistence of a built catalog, one JSON file per date.
///
/// Unlike the staging store this overwrites: each rebuild replaces the
/// day's artifact in full.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    dir: PathBuf,
}

impl CatalogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for a date, e.g. `<catalog>/2024-05-01.json`.
    pub fn file_path(&self, for_date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{for_date}.json"))
    }

    /// Serialize the full ticker → articles map, overwriting any prior file
    /// for the date. Returns the written path.
    pub fn save(&self, catalog: &Catalog, for_date: NaiveDate) -> Result<PathBuf, StorageError> {
        let path = self.file_path(for_date);
        store::write_json(&path, catalog)?;
        Ok(path)
    }

    /// An absent file is an empty catalog; a corrupt file is an error.
    /// Round-trips exactly: timestamps come back as the strings they were.
    pub fn load(&self, for_date: NaiveDate) -> Result<Catalog, StorageError> {
        store::read_json(&self.file_path(for_date))
    }
}
