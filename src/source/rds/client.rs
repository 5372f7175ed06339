use std::thread;
use std::time::Duration;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info};
use url::Url;

pub const READ_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_RETRIES: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("JSON content fetch failed: HTTP {code} ({reason})")]
    Status { code: u16, reason: String },
    #[error("The server communication timeout. Url: {url}")]
    Timeout { url: String },
    #[error("JSON content fetch failed: {message}. Url: {url}")]
    Transport { url: String, message: String },
}

/// Fetches a URL and returns the response body as JSON text.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait JsonFetcher {
    fn fetch_json(&self, url: &Url) -> Result<String, FetchError>;
}

/// Blocking HTTP implementation with a fixed read timeout and retries on 5xx responses.
pub struct HttpJsonFetcher {
    client: Client,
    retry_delay: Duration,
}

impl HttpJsonFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            retry_delay: RETRY_DELAY,
        })
    }

    fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.text().map_err(|e| transport_error(url, e))
    }
}

impl JsonFetcher for HttpJsonFetcher {
    fn fetch_json(&self, url: &Url) -> Result<String, FetchError> {
        info!(url = %url, "Fetching JSON content");
        with_retries(MAX_RETRIES, self.retry_delay, || self.fetch_once(url))
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Runs `attempt`, repeating it up to `max_retries` times while it fails with a server error.
pub(crate) fn with_retries<T>(
    max_retries: u32,
    delay: Duration,
    mut attempt: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut retry = 0;
    loop {
        match attempt() {
            Err(FetchError::Status { code, reason }) if retry < max_retries && code >= 500 => {
                retry += 1;
                debug!(
                    code,
                    retry, "Server error: HTTP {code} ({reason}), retrying {retry}"
                );
                thread::sleep(delay);
            }
            other => return other,
        }
    }
}
