//! Revenue-by-segment and revenue-by-geography datasets built from XBRL filings.
//!
//! The pipeline per ticker is: pull the latest quarterly filings (annual ones when the
//! quarterly filings carry no geography breakdown), extract dimensional facts, normalize
//! them into dense name x date datasets and write one JSON snapshot.

pub mod coerce;
pub mod extract;
pub mod geography;
pub mod history;
pub mod labels;
pub mod revenue;
pub mod skip;
pub mod types;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::edgar::{FilingSource, ReportType, Ticker};
use crate::utils::dirs::{snapshot_path, write_atomic};

pub use extract::{process_filings, ExtractedFacts, FILING_WINDOW};
pub use geography::generate_geography_dataset;
pub use revenue::generate_revenue_dataset;
pub use skip::{SkipLog, SkipReason};
pub use types::{BusinessMetrics, Dataset, Fact, FactValue, HistoryEntry, Normalized};

/// Outcome of one ticker's run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticker: Ticker,
    pub path: PathBuf,
    pub revenue_names: usize,
    pub geography_names: usize,
    pub skipped: SkipLog,
}

/// Pulls raw facts for a ticker, falling back to annual filings for geography.
pub async fn collect_facts<S>(source: &S, ticker: &Ticker) -> Result<ExtractedFacts>
where
    S: FilingSource + ?Sized,
{
    let quarterly = source
        .latest_filings(ticker, ReportType::Form10Q, FILING_WINDOW)
        .await
        .with_context(|| format!("Fetching 10-Q filings for {}", ticker))?;
    let mut extracted = process_filings(&quarterly, ticker);

    if extracted.geography.is_empty() {
        log::info!(
            "No geography facts found in 10-Q for {}, checking 10-K filings",
            ticker
        );
        match source
            .latest_filings(ticker, ReportType::Form10K, FILING_WINDOW)
            .await
        {
            Ok(annual) => {
                let fallback = process_filings(&annual, ticker);
                extracted.geography = fallback.geography;
                extracted.skipped.extend(fallback.skipped);
            }
            Err(e) => log::warn!("Fetching 10-K filings for {} failed: {:#}", ticker, e),
        }
    }

    log::debug!(
        "{}: {} revenue facts, {} geography facts",
        ticker,
        extracted.revenue.len(),
        extracted.geography.len()
    );
    Ok(extracted)
}

/// Normalizes extracted facts into the snapshot document.
pub fn build_metrics(extracted: ExtractedFacts) -> (BusinessMetrics, SkipLog) {
    let revenue = generate_revenue_dataset(&extracted.revenue);
    let geographic = generate_geography_dataset(&extracted.geography);

    let mut skipped = extracted.skipped;
    skipped.extend(revenue.skipped);
    skipped.extend(geographic.skipped);

    let metrics = BusinessMetrics {
        revenue: revenue.dataset,
        geographic: geographic.dataset,
    };
    (metrics, skipped)
}

pub fn to_json(metrics: &BusinessMetrics) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(metrics)?)
}

/// Atomically replaces `<output_dir>/business-metrics/<TICKER>.json`.
pub fn write_snapshot(output_dir: &Path, ticker: &Ticker, metrics: &BusinessMetrics) -> Result<PathBuf> {
    let path = snapshot_path(output_dir, ticker.as_str());
    write_atomic(&path, &to_json(metrics)?)
        .with_context(|| format!("Writing business metrics for {}", ticker))?;
    Ok(path)
}

/// Runs the whole pipeline for one ticker.
pub async fn run<S>(source: &S, ticker: &Ticker, output_dir: &Path) -> Result<RunSummary>
where
    S: FilingSource + ?Sized,
{
    let extracted = collect_facts(source, ticker).await?;
    let (metrics, skipped) = build_metrics(extracted);
    if metrics.revenue.is_empty() {
        log::warn!("{}: no revenue segments found", ticker);
    }

    if !skipped.is_empty() {
        log::info!("{}: skipped records {:?}", ticker, skipped.summary());
    }

    let path = write_snapshot(output_dir, ticker, &metrics)?;
    log::info!(
        "{}: wrote {} revenue segments and {} regions to {:?}",
        ticker,
        metrics.revenue.names.len(),
        metrics.geographic.names.len(),
        path
    );

    Ok(RunSummary {
        ticker: ticker.clone(),
        path,
        revenue_names: metrics.revenue.names.len(),
        geography_names: metrics.geographic.names.len(),
        skipped,
    })
}
