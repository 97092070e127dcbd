use thiserror::Error;

/// Errors from [`crate::feed::FeedSource::fetch_records`].
///
/// URLs carried by these variants never include the query string, so the
/// API key does not leak into diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout {
        /// Endpoint URL without query parameters.
        url: String,
        /// Timeout that elapsed.
        timeout_ms: u64,
    },
    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Http {
        /// Endpoint URL without query parameters.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request failed before a response was received.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Endpoint URL without query parameters.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The response body was not the expected JSON envelope.
    #[error("failed to decode response from {url}: {message}")]
    Decode {
        /// Endpoint URL without query parameters.
        url: String,
        /// Decoder error description.
        message: String,
    },
    /// The configured base URL and endpoint path do not form a URL.
    #[error("invalid feed URL {url:?}: {message}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Parser error description.
        message: String,
    },
}
