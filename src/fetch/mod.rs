//! Raw byte retrieval for feeds, over HTTP or from the local filesystem.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::{DashboardError, Result};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const SLOW_FETCH: Duration = Duration::from_secs(5);

/// GETs `url` and returns the response body.
///
/// The whole exchange (headers and body) is bounded by `timeout`. A non-2xx
/// status is reported as a network error.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>> {
    let parsed = url.parse::<reqwest::Url>().map_err(|e| DashboardError::Network {
        url: url.to_string(),
        message: format!("invalid URL: {e}"),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let started = Instant::now();
    let exchange = async {
        let resp = client.execute(req).await?.error_for_status()?;
        let bytes = resp.bytes().await?;
        Ok::<_, reqwest::Error>(bytes)
    };

    let bytes = match tokio::time::timeout(timeout, exchange).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) if e.is_timeout() => return Err(timeout_error(url, timeout)),
        Ok(Err(e)) => {
            return Err(DashboardError::Network {
                url: url.to_string(),
                message: e.to_string(),
            });
        }
        Err(_) => return Err(timeout_error(url, timeout)),
    };

    let elapsed = started.elapsed();
    if elapsed > SLOW_FETCH {
        warn!(url, elapsed_secs = elapsed.as_secs(), "Feed fetch was slow");
    }
    debug!(url, bytes = bytes.len(), elapsed_ms = elapsed.as_millis() as u64, "Feed fetched");

    Ok(bytes.to_vec())
}

/// Loads a feed from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client), fields(source = %source))]
pub async fn load_source<C: HttpClient>(
    client: &C,
    source: &str,
    timeout: Duration,
) -> Result<Vec<u8>> {
    if source.starts_with("http") {
        fetch_bytes(client, source, timeout).await
    } else {
        std::fs::read(source).map_err(|e| DashboardError::io(source, e))
    }
}

fn timeout_error(url: &str, timeout: Duration) -> DashboardError {
    DashboardError::Timeout {
        url: url.to_string(),
        secs: timeout.as_secs(),
    }
}
