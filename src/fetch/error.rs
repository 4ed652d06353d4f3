// src/fetch/error.rs
// =============================================================================
// Errors returned by the Fetcher.
//
// The important split is between Connectivity (the whole machine is offline,
// nothing else will work either) and Page (one URL failed while the internet
// is reachable). Everything else is a plain failure of a single call.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL argument was empty or only whitespace.
    #[error("invalid input: URL is empty")]
    InvalidInput,

    /// The server answered with an empty body.
    #[error("website was not retrieved: {url} returned an empty page")]
    Retrieval { url: String },

    /// The request failed and the connectivity probe failed too.
    #[error("no internet connection while fetching {url}, check your network")]
    Connectivity { url: String },

    /// The request failed but the probe host is reachable.
    #[error("request to {url} failed: {source}")]
    Page {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A media download answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    Status { url: String, status: u16 },

    /// Writing a downloaded file failed.
    #[error("IO error writing to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// True when the run cannot possibly continue.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, FetchError::Connectivity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_flag() {
        let err = FetchError::Connectivity {
            url: "https://example.com".to_string(),
        };
        assert!(err.is_connectivity());
        assert!(!FetchError::InvalidInput.is_connectivity());
    }

    #[test]
    fn test_messages_name_the_url() {
        let err = FetchError::Retrieval {
            url: "https://example.com/a/".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/a/"));

        let err = FetchError::Status {
            url: "https://example.com/x.mp3".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 downloading https://example.com/x.mp3");
    }
}
