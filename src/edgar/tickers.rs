use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const TICKER_URL: &str = "https://www.sec.gov/files/company_tickers.json";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(ticker: String) -> Result<Self> {
        let uppercase_ticker = ticker.trim().to_uppercase();
        if uppercase_ticker.is_empty() {
            return Err(anyhow!("Ticker cannot be empty"));
        }
        if !uppercase_ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(anyhow!(
                "Ticker must contain only alphanumeric characters or hyphens: {}",
                ticker
            ));
        }
        Ok(Ticker(uppercase_ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix of the company's own XBRL taxonomy, e.g. `aapl:`.
    pub fn taxonomy_prefix(&self) -> String {
        format!("{}:", self.0.to_lowercase())
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Ticker {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ticker::new(s.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
    title: String,
}

#[derive(Debug, Clone, Default)]
pub struct TickerMaps {
    ticker_to_cik: HashMap<String, (String, String)>, // Ticker -> (CIK, Name)
}

impl TickerMaps {
    pub fn cik_for(&self, ticker: &Ticker) -> Result<&str> {
        self.ticker_to_cik
            .get(ticker.as_str())
            .map(|(cik, _)| cik.as_str())
            .ok_or_else(|| anyhow!("No CIK found for ticker: {}", ticker))
    }

    pub fn name_for(&self, ticker: &Ticker) -> Option<&str> {
        self.ticker_to_cik
            .get(ticker.as_str())
            .map(|(_, name)| name.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.ticker_to_cik.len()
    }
}

/// Reads the SEC `company_tickers.json` file into a lookup table.
pub fn load_tickers(path: &Path) -> Result<TickerMaps> {
    log::debug!("Loading tickers from {:?}", path);
    let json_string = fs::read_to_string(path)
        .with_context(|| format!("Tickers file not readable: {:?}", path))?;
    parse_tickers(&json_string)
}

pub fn parse_tickers(json_string: &str) -> Result<TickerMaps> {
    let json: HashMap<String, TickerEntry> = serde_json::from_str(json_string)
        .map_err(|e| anyhow!("Failed to parse tickers JSON: {}", e))?;
    log::debug!("Found {} ticker entries", json.len());

    let mut maps = TickerMaps::default();
    for entry in json.into_values() {
        let ticker = match Ticker::new(entry.ticker.clone()) {
            Ok(ticker) => ticker,
            Err(e) => {
                log::debug!("Ignoring ticker entry: {}", e);
                continue;
            }
        };
        maps.ticker_to_cik.insert(
            ticker.as_str().to_string(),
            (format!("{:010}", entry.cik_str), entry.title),
        );
    }

    log::debug!("Loaded {} tickers", maps.len());
    Ok(maps)
}
