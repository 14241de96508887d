use anyhow::Context;

use crate::foundation::error::{FetchError, ImprintResult};

/// Network client seam used by the remote image cache.
///
/// Implementations return the raw encoded payload; decoding happens in the cache.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the bytes behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP(S) fetcher.
///
/// Certificate validation is relaxed so self-signed image hosts keep working. No timeout is
/// imposed here; callers that need bounded latency supply their own fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build the underlying HTTP client.
    pub fn new() -> ImprintResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_owned(),
            reason: e.to_string(),
        };

        tracing::info!(url, "fetching remote image");
        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().map_err(transport)?;
        tracing::info!(url, len = body.len(), "remote image fetched");
        Ok(body.to_vec())
    }
}
