use anyhow::{anyhow, Result};
use mime::Mime;
use reqwest::Client;
use std::path::Path;
use url::Url;

use super::dirs::write_atomic;
use super::rate_limit::RateLimiter;

/// Downloads `url` and stores the body at `filepath`.
///
/// JSON bodies are validated before they are written so a truncated response never lands
/// in the cache.
pub async fn fetch_and_save(
    client: &Client,
    url: &Url,
    filepath: &Path,
    user_agent: &str,
    content_type: Mime,
    rate_limiter: &RateLimiter,
) -> Result<String> {
    let content = fetch_text(client, url, user_agent, content_type.clone(), rate_limiter).await?;

    if content_type == mime::APPLICATION_JSON {
        serde_json::from_str::<serde_json::Value>(&content)
            .map_err(|e| anyhow!("Invalid JSON from {}: {}", url, e))?;
    } else if content.trim().is_empty() {
        return Err(anyhow!("Empty response from {}", url));
    }

    write_atomic(filepath, content.as_bytes())?;
    log::debug!("Saved content to {:?}", filepath);
    Ok(content)
}

pub async fn fetch_text(
    client: &Client,
    url: &Url,
    user_agent: &str,
    content_type: Mime,
    rate_limiter: &RateLimiter,
) -> Result<String> {
    log::debug!("Fetching URL: {}", url);

    let _permit = rate_limiter
        .acquire()
        .await
        .map_err(|e| anyhow!("Rate limiter closed: {}", e))?;

    let response = client
        .get(url.as_str())
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, content_type.as_ref())
        .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .await?;

    log::debug!("Response status: {}", response.status());

    if !response.status().is_success() {
        return Err(anyhow!(
            "HTTP request for {} failed with status: {}",
            url,
            response.status()
        ));
    }

    let content = response.text().await?;
    log::debug!("Received content length: {}", content.len());
    Ok(content)
}
