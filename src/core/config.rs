use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str = "software@example.com";

/// Tickers processed when none are given on the command line.
pub const DEFAULT_TICKERS: &[&str] = &[
    "ORCL", "GOOGL", "AMD", "SAVE", "BA", "ADBE", "NFLX", "PLTR", "MSFT", "META", "TSLA",
    "NVDA", "AAPL", "GME",
];

#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Identity sent to the SEC with every request.
    pub user_agent: String,
    /// Cache for tickers, submissions and XBRL instances.
    pub data_dir: PathBuf,
    /// Root of the JSON store read by the front end.
    pub output_dir: PathBuf,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("json"),
        }
    }
}

impl MetricsConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let user_agent = lookup("SEC_USER_AGENT").unwrap_or(defaults.user_agent);
        if user_agent.trim().is_empty() {
            return Err(anyhow!("SEC_USER_AGENT must not be empty"));
        }

        let data_dir = lookup("METRICS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let output_dir = lookup("METRICS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        Ok(Self {
            user_agent,
            data_dir,
            output_dir,
        })
    }
}
