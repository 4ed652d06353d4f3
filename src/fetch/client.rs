// src/fetch/client.rs
// =============================================================================
// This module fetches pages and media files over HTTP.
//
// Key functionality:
// - GET a page and return its HTML text
// - Stream an mp3 body straight into a file on disk
// - When a request fails, ask a well-known host whether we are online at all,
//   so the caller can tell "this page is broken" from "the network is down"
//
// No retries and no custom timeouts: reqwest defaults apply.
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E>: Every call returns a FetchError on failure
// - Streams: The response body arrives as a stream of byte chunks
// =============================================================================

use std::path::Path;

use futures::StreamExt; // StreamExt gives us .next() on the body stream
use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::error::FetchError;

/// Host used to check general internet access after a failed request.
pub const DEFAULT_PROBE_URL: &str = "https://google.com";

// Holds one HTTP client for the whole run
//
// Client is cheap to clone (it's just a reference counter internally), so the
// Fetcher is too.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    probe_url: String,
}

impl Fetcher {
    // Creates a Fetcher that probes `probe_url` when a request fails
    pub fn new(probe_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            probe_url: probe_url.into(),
        })
    }

    // Fetches a page and returns its HTML text
    //
    // The HTTP status is not inspected: an error page is just HTML without
    // the links we look for. An empty body is returned as an empty string.
    pub async fn page(&self, url: &str) -> Result<String, FetchError> {
        let url = validate(url)?;
        debug!(url, "fetching page");

        let response = self.send(url).await?;
        match response.text().await {
            Ok(html) => Ok(html),
            Err(source) => Err(self.classify_failure(url, source).await),
        }
    }

    // Same as page(), but an empty body is an error
    //
    // Used wherever we need links out of the page (author and book indexes).
    pub async fn required_page(&self, url: &str) -> Result<String, FetchError> {
        let html = self.page(url).await?;
        if html.is_empty() {
            return Err(FetchError::Retrieval {
                url: url.trim().to_string(),
            });
        }
        Ok(html)
    }

    // Downloads `url` into `dest`, overwriting any existing file
    //
    // Returns: the number of bytes written
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let url = validate(url)?;
        debug!(url, dest = %dest.display(), "downloading");

        let response = self.send(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let io_err = |source: std::io::Error| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(source) => return Err(self.classify_failure(url, source).await),
            };
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(io_err)?;
        Ok(written)
    }

    // Checks whether the probe host answers with a success status
    pub async fn is_online(&self) -> bool {
        match self.client.get(&self.probe_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(probe = %self.probe_url, error = %e, "connectivity probe failed");
                false
            }
        }
    }

    async fn send(&self, url: &str) -> Result<Response, FetchError> {
        match self.client.get(url).send().await {
            Ok(response) => Ok(response),
            Err(source) => Err(self.classify_failure(url, source).await),
        }
    }

    // Turns a transport error into Connectivity or Page
    async fn classify_failure(&self, url: &str, source: reqwest::Error) -> FetchError {
        warn!(url, error = %source, "request failed, probing connectivity");

        if self.is_online().await {
            FetchError::Page {
                url: url.to_string(),
                source,
            }
        } else {
            FetchError::Connectivity {
                url: url.to_string(),
            }
        }
    }
}

// Rejects empty input and strips surrounding whitespace
fn validate(url: &str) -> Result<&str, FetchError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidInput);
    }
    Ok(trimmed)
}
