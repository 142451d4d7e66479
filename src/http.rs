use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Source of remote bytes. The pipeline only ever needs whole-body GETs.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher; one request at a time, no retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("freelex/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad response status: {}", url))?;
        let body = response
            .bytes()
            .with_context(|| format!("Failed to read response body: {}", url))?;
        Ok(body.to_vec())
    }
}
