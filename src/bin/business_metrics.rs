use anyhow::{anyhow, Result};
use business_metrics::core::config::{MetricsConfig, DEFAULT_TICKERS};
use business_metrics::edgar::{EdgarClient, Ticker};
use business_metrics::{metrics, ProgressTracker};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "business-metrics",
    about = "Build revenue segment and geography snapshots from SEC filings"
)]
struct Opt {
    /// Tickers to process (defaults to the built-in list)
    tickers: Vec<String>,

    /// Root of the JSON store; snapshots land in <output-dir>/business-metrics
    #[structopt(long, parse(from_os_str))]
    output_dir: Option<PathBuf>,

    /// Cache directory for SEC downloads
    #[structopt(long, parse(from_os_str))]
    data_dir: Option<PathBuf>,

    /// Disable the progress bar
    #[structopt(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut config = MetricsConfig::from_env()?;
    if let Some(output_dir) = opt.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(data_dir) = opt.data_dir {
        config.data_dir = data_dir;
    }

    let tickers: Vec<Ticker> = if opt.tickers.is_empty() {
        DEFAULT_TICKERS
            .iter()
            .map(|t| Ticker::new(t.to_string()))
            .collect::<Result<_>>()?
    } else {
        opt.tickers
            .into_iter()
            .map(Ticker::new)
            .collect::<Result<_>>()?
    };

    let output_dir = config.output_dir.clone();
    let source = EdgarClient::new(config)?;
    let progress = ProgressTracker::new(tickers.len() as u64, !opt.no_progress);

    let mut failures = 0;
    for ticker in &tickers {
        progress.start(ticker.as_str());
        match metrics::run(&source, ticker, &output_dir).await {
            Ok(summary) => progress.println(&format!(
                "{}: {} segments, {} regions, {} records skipped",
                summary.ticker,
                summary.revenue_names,
                summary.geography_names,
                summary.skipped.len()
            )),
            Err(e) => {
                failures += 1;
                log::error!("Failed to build business metrics for {}: {:#}", ticker, e);
            }
        }
        progress.increment();
    }
    progress.finish();

    if failures == tickers.len() {
        return Err(anyhow!("All {} tickers failed", failures));
    }
    Ok(())
}
