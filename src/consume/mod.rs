// src/consume/mod.rs
pub mod summary;

use anyhow::Result;

use crate::catalog::Catalog;

/// A catalog consumer turns the day's catalog into some output artifact.
#[async_trait::async_trait]
pub trait Consumer: Send + Sync {
    async fn consume(&self, catalog: &Catalog, date_str: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}
