pub mod filing;
pub mod report;
pub mod tickers;
pub mod xbrl;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::fs;
use tokio::sync::OnceCell;

use crate::core::config::MetricsConfig;
use crate::utils::dirs::{ensure_edgar_dirs, INSTANCES_DIR, SUBMISSIONS_DIR, TICKERS_FILE};
use crate::utils::http::fetch_and_save;
use crate::utils::rate_limit::RateLimiter;

pub use filing::{CompanyFilings, Filing, FilingRef};
pub use report::ReportType;
pub use tickers::{Ticker, TickerMaps};

/// Instance documents downloaded at once for a single ticker.
const CONCURRENT_FETCHES: usize = 4;

/// Where filings come from. Implementations return filings newest first.
#[async_trait]
pub trait FilingSource: Send + Sync {
    async fn latest_filings(
        &self,
        ticker: &Ticker,
        report_type: ReportType,
        limit: usize,
    ) -> Result<Vec<Filing>>;
}

/// [`FilingSource`] backed by SEC EDGAR, with an on-disk cache below the data directory.
pub struct EdgarClient {
    client: Client,
    config: MetricsConfig,
    tickers: OnceCell<TickerMaps>,
}

impl EdgarClient {
    pub fn new(config: MetricsConfig) -> Result<Self> {
        ensure_edgar_dirs(&config.data_dir)?;
        let client = Client::builder().gzip(true).build()?;
        Ok(Self {
            client,
            config,
            tickers: OnceCell::new(),
        })
    }

    pub async fn ticker_maps(&self) -> Result<&TickerMaps> {
        self.tickers
            .get_or_try_init(|| async {
                let path = self.config.data_dir.join(TICKERS_FILE);
                if !path.exists() {
                    log::debug!("Tickers file not found, downloading from SEC");
                    fetch_and_save(
                        &self.client,
                        &url::Url::parse(tickers::TICKER_URL)?,
                        &path,
                        &self.config.user_agent,
                        mime::APPLICATION_JSON,
                        RateLimiter::edgar(),
                    )
                    .await?;
                }
                tickers::load_tickers(&path)
            })
            .await
    }

    /// Submissions change with every new filing, so they are refetched each run. The cached
    /// copy is only used when SEC cannot be reached.
    pub async fn company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        let url = filing::submissions_url(cik)?;
        let path = self
            .config
            .data_dir
            .join(SUBMISSIONS_DIR)
            .join(format!("CIK{}.json", cik));

        log::info!("Fetching company filings from {}", url);
        let content = match fetch_and_save(
            &self.client,
            &url,
            &path,
            &self.config.user_agent,
            mime::APPLICATION_JSON,
            RateLimiter::edgar(),
        )
        .await
        {
            Ok(content) => content,
            Err(e) if path.exists() => {
                log::warn!("Using cached submissions for CIK {}: {}", cik, e);
                fs::read_to_string(&path)?
            }
            Err(e) => return Err(e),
        };

        filing::parse_company_filings(&content)
    }

    /// Instance documents never change once filed; a cached copy is always reused.
    pub async fn load_filing(&self, cik: &str, filing_ref: &FilingRef) -> Result<Filing> {
        let path = self
            .config
            .data_dir
            .join(INSTANCES_DIR)
            .join(filing_ref.cache_name());

        let content = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            fetch_and_save(
                &self.client,
                &filing_ref.instance_url(cik)?,
                &path,
                &self.config.user_agent,
                mime::TEXT_XML,
                RateLimiter::edgar(),
            )
            .await?
        };

        let facts = xbrl::parse_instance(&content)
            .with_context(|| format!("Filing {}", filing_ref.accession_number))?;

        Ok(Filing {
            accession_number: filing_ref.accession_number.clone(),
            report_type: filing_ref.report_type.clone(),
            report_date: filing_ref.report_date.clone(),
            facts,
        })
    }

    async fn load_filing_or_skip(&self, cik: &str, filing_ref: FilingRef) -> Option<Filing> {
        match self.load_filing(cik, &filing_ref).await {
            Ok(filing) => Some(filing),
            Err(e) => {
                log::warn!(
                    "Skipping {} filing {}: {:#}",
                    filing_ref.report_type,
                    filing_ref.accession_number,
                    e
                );
                None
            }
        }
    }
}

#[async_trait]
impl FilingSource for EdgarClient {
    async fn latest_filings(
        &self,
        ticker: &Ticker,
        report_type: ReportType,
        limit: usize,
    ) -> Result<Vec<Filing>> {
        let maps = self.ticker_maps().await?;
        let cik = maps.cik_for(ticker)?.to_string();
        let refs = self.company_filings(&cik).await?.latest(&report_type, limit);
        log::info!(
            "Found {} {} filings for {} ({})",
            refs.len(),
            report_type,
            ticker,
            maps.name_for(ticker).unwrap_or("unknown company")
        );

        let cik = cik.as_str();
        let filings: Vec<Option<Filing>> = stream::iter(refs)
            .map(|filing_ref| self.load_filing_or_skip(cik, filing_ref))
            .buffered(CONCURRENT_FETCHES)
            .collect()
            .await;

        Ok(filings.into_iter().flatten().collect())
    }
}
