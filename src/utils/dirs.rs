use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// Layout below the configured data directory
pub const EDGAR_DIR: &str = "edgar";
pub const SUBMISSIONS_DIR: &str = "edgar/submissions";
pub const INSTANCES_DIR: &str = "edgar/instances";
pub const TICKERS_FILE: &str = "edgar/tickers.json";

// Layout below the configured output directory
pub const BUSINESS_METRICS_DIR: &str = "business-metrics";

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))?;
    Ok(())
}

pub fn ensure_edgar_dirs(data_dir: &Path) -> Result<()> {
    ensure_dir(&data_dir.join(EDGAR_DIR))?;
    ensure_dir(&data_dir.join(SUBMISSIONS_DIR))?;
    ensure_dir(&data_dir.join(INSTANCES_DIR))?;
    Ok(())
}

pub fn snapshot_path(output_dir: &Path, ticker: &str) -> PathBuf {
    output_dir
        .join(BUSINESS_METRICS_DIR)
        .join(format!("{}.json", ticker))
}

/// Replaces `path` with `contents` through a temp file in the same directory, so readers
/// never see a partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("No parent directory for {:?}", path))?;
    ensure_dir(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| anyhow!("Failed to replace {:?}: {}", path, e.error))?;
    log::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}
