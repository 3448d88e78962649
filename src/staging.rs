// src/staging.rs
//! Append-only, date-partitioned persistence of raw articles.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::crawl::types::RawArticle;
use crate::store::{self, StorageError};

/// One JSON file per calendar date; a day's file only ever grows.
///
/// Duplicates are NOT resolved here. Staging keeps every crawl run verbatim
/// and the catalog build dedups later, so re-running a crawl for the same
/// date simply appends a second copy.
#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
}

impl StagingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for a date, e.g. `<staging>/2024-05-01.json`.
    pub fn file_path(&self, for_date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{for_date}.json"))
    }

    /// Append records to the date's file, preserving the order of both the
    /// existing and the new records. Returns the total count after the
    /// append. Creates the file and directories when absent.
    pub fn append(
        &self,
        records: &[RawArticle],
        for_date: NaiveDate,
    ) -> Result<usize, StorageError> {
        let mut all = self.load(for_date)?;
        all.extend(records.iter().cloned());
        store::write_json(&self.file_path(for_date), &all)?;
        Ok(all.len())
    }

    /// Records in file order (append order, oldest-crawled first). An absent
    /// file is an empty day; a corrupt file is an error, never empty.
    pub fn load(&self, for_date: NaiveDate) -> Result<Vec<RawArticle>, StorageError> {
        store::read_json(&self.file_path(for_date))
    }
}
