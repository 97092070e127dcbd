//! [`HttpFeedSource`]: one `GET` per layer against the feed API.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use roadfeed_core::{FeedSource, FetchError, LayerKey};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::config::{API_KEY_PARAM, FeedConfig};
use super::envelope::decode_records;

/// Error type for [`HttpFeedSource`] construction failures.
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL does not parse.
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        /// The offending base URL.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// HTTP-backed [`FeedSource`].
///
/// Every layer fetch is a single time-bounded request. The timeout covers
/// connection, headers and body; there is no retry. A non-success status
/// is reported without reading the body.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    config: FeedConfig,
}

impl HttpFeedSource {
    /// Create a source for `base_url` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SourceBuildError> {
        Self::with_config(FeedConfig::new(base_url, api_key))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: FeedConfig) -> Result<Self, SourceBuildError> {
        Url::parse(&config.base_url).map_err(|source| SourceBuildError::BaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// The configuration this source was built with.
    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    fn endpoint_url(&self, layer: LayerKey) -> Result<Url, FetchError> {
        let raw = self.config.endpoint_url(layer);
        Url::parse(&raw).map_err(|err| FetchError::InvalidUrl {
            url: raw,
            message: err.to_string(),
        })
    }

    /// Convert a reqwest error to a `FetchError`.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }

        if error.is_decode() || error.is_body() {
            return FetchError::Decode {
                url: url.to_owned(),
                message: error.without_url().to_string(),
            };
        }

        FetchError::Network {
            url: url.to_owned(),
            // Strip the URL reqwest embeds, which carries the API key.
            message: error.without_url().to_string(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_records(&self, layer: LayerKey) -> Result<Vec<Value>, FetchError> {
        let url = self.endpoint_url(layer)?;
        let display_url = url.as_str().to_owned();
        debug!("fetching {layer} from {display_url}");

        let response = self
            .client
            .get(url)
            .query(&[(API_KEY_PARAM, self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &display_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: display_url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &display_url))?;

        decode_records(layer, &body).map_err(|message| FetchError::Decode {
            url: display_url,
            message,
        })
    }
}
