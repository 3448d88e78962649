// src/config.rs
//! Data directory layout, watchlist, and API credentials.
//!
//! Every filesystem-touching component receives its paths from an explicit
//! `HoldupConfig` value; nothing consults process-global path state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Base data directory (default `~/.holdup`) plus derived subpaths.
#[derive(Debug, Clone)]
pub struct HoldupConfig {
    base_dir: PathBuf,
}

impl HoldupConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Default location under the user's home directory.
    pub fn from_home() -> Result<Self> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; cannot locate ~/.holdup"))?;
        Ok(Self::new(home.join(".holdup")))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.base_dir.join("staging")
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.base_dir.join("catalog")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join("output")
    }

    pub fn watchlist_path(&self) -> PathBuf {
        self.base_dir.join("watchlist.json")
    }

    pub fn env_path(&self) -> PathBuf {
        self.base_dir.join(".env")
    }

    /// Create the whole directory tree if it does not exist yet.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.base_dir.clone(),
            self.staging_dir(),
            self.catalog_dir(),
            self.output_dir(),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("creating directory {}", dir.display()))?;
        }
        Ok(())
    }

    // ---- Credentials ----

    /// Load `<base>/.env` into the process environment. No-op when absent.
    pub fn load_env(&self) {
        let _ = dotenvy::from_path(self.env_path());
    }

    /// Alpaca key/secret pair; empty strings when not configured.
    pub fn alpaca_credentials(&self) -> (String, String) {
        self.load_env();
        (
            std::env::var("ALPACA_API_KEY").unwrap_or_default(),
            std::env::var("ALPACA_API_SECRET").unwrap_or_default(),
        )
    }

    /// OpenAI API key; empty string when not configured.
    pub fn openai_api_key(&self) -> String {
        self.load_env();
        std::env::var("OPENAI_API_KEY").unwrap_or_default()
    }

    /// Write the `.env` file with all three keys, replacing any prior one.
    pub fn save_env(&self, alpaca_key: &str, alpaca_secret: &str, openai_key: &str) -> Result<()> {
        self.ensure_directories()?;
        let env_path = self.env_path();
        let content = format!(
            "# Alpaca API credentials\n\
             ALPACA_API_KEY={alpaca_key}\n\
             ALPACA_API_SECRET={alpaca_secret}\n\
             \n\
             # OpenAI API key\n\
             OPENAI_API_KEY={openai_key}\n"
        );
        fs::write(&env_path, content)
            .with_context(|| format!("writing {}", env_path.display()))?;
        // Keep key material out of other users' reach.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&env_path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("restricting permissions on {}", env_path.display()))?;
        }
        Ok(())
    }

    // ---- Watchlist ----

    /// Tickers the user follows, in insertion order. Absent file is empty.
    pub fn load_watchlist(&self) -> Result<Vec<String>> {
        let path = self.watchlist_path();
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save_watchlist(&self, tickers: &[String]) -> Result<()> {
        self.ensure_directories()?;
        let path = self.watchlist_path();
        let normalized = normalize_tickers(tickers);
        let json = serde_json::to_string_pretty(&normalized).context("encoding watchlist")?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// Add tickers and return the updated watchlist.
    pub fn add_tickers(&self, tickers: &[String]) -> Result<Vec<String>> {
        let mut current = self.load_watchlist()?;
        current.extend(tickers.iter().cloned());
        self.save_watchlist(&current)?;
        self.load_watchlist()
    }

    /// Remove one ticker. Returns true when it was present.
    pub fn remove_ticker(&self, ticker: &str) -> Result<bool> {
        let current = self.load_watchlist()?;
        let upper = ticker.to_uppercase();
        let remaining: Vec<String> = current.iter().filter(|t| **t != upper).cloned().collect();
        let removed = remaining.len() != current.len();
        if removed {
            self.save_watchlist(&remaining)?;
        }
        Ok(removed)
    }
}

/// Uppercase and dedup while preserving first-seen order.
fn normalize_tickers(tickers: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(tickers.len());
    for t in tickers {
        let upper = t.trim().to_uppercase();
        if !upper.is_empty() && seen.insert(upper.clone()) {
            out.push(upper);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickers_are_uppercased_and_deduped_in_order() {
        let input = vec![
            "aapl".to_string(),
            "MSFT".into(),
            " AAPL ".into(),
            "".into(),
            "nvda".into(),
        ];
        assert_eq!(normalize_tickers(&input), vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn watchlist_roundtrip_add_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let config = HoldupConfig::new(tmp.path());

        assert!(config.load_watchlist().unwrap().is_empty());

        let updated = config
            .add_tickers(&["aapl".to_string(), "msft".to_string()])
            .unwrap();
        assert_eq!(updated, vec!["AAPL", "MSFT"]);

        // Adding an existing ticker does not duplicate it.
        let updated = config.add_tickers(&["AAPL".to_string()]).unwrap();
        assert_eq!(updated, vec!["AAPL", "MSFT"]);

        assert!(config.remove_ticker("aapl").unwrap());
        assert!(!config.remove_ticker("TSLA").unwrap());
        assert_eq!(config.load_watchlist().unwrap(), vec!["MSFT"]);
    }

    #[test]
    fn save_env_writes_all_three_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let config = HoldupConfig::new(tmp.path());

        config.save_env("ak", "as", "ok").unwrap();
        let content = fs::read_to_string(config.env_path()).unwrap();
        assert!(content.contains("ALPACA_API_KEY=ak"));
        assert!(content.contains("ALPACA_API_SECRET=as"));
        assert!(content.contains("OPENAI_API_KEY=ok"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(config.env_path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
