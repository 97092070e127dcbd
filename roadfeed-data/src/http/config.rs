//! Endpoint and transport settings for [`super::HttpFeedSource`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use roadfeed_core::LayerKey;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://data.cotrip.org/api/v1";

/// Default user agent for feed requests.
pub const DEFAULT_USER_AGENT: &str = "roadfeed/0.1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Query parameter carrying the static API key.
pub(super) const API_KEY_PARAM: &str = "apiKey";

/// Default endpoint path for each layer, relative to the base URL.
const fn default_endpoint(layer: LayerKey) -> &'static str {
    match layer {
        LayerKey::RoadConditions => "/roadConditions",
        LayerKey::Incidents => "/incidents",
        LayerKey::WeatherStations => "/weatherStations",
        LayerKey::SnowPlows => "/snowPlows",
        LayerKey::PlannedEvents => "/plannedEvents",
        LayerKey::DmsSigns => "/signs",
        LayerKey::WorkZones => "/wzdx",
    }
}

/// Configuration for [`super::HttpFeedSource`].
///
/// The `Debug` output redacts the API key.
#[derive(Clone)]
pub struct FeedConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Static key sent as the `apiKey` query parameter.
    pub api_key: String,
    /// Per-request timeout, covering connect, headers and body.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    endpoints: BTreeMap<LayerKey, String>,
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            endpoints: BTreeMap::new(),
        }
    }
}

impl FeedConfig {
    /// Create a configuration for `base_url` authenticated with `api_key`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the endpoint path for one layer.
    #[must_use]
    pub fn with_endpoint(mut self, layer: LayerKey, path: impl Into<String>) -> Self {
        self.endpoints.insert(layer, path.into());
        self
    }

    /// Endpoint path for `layer`, falling back to the built-in default.
    #[must_use]
    pub fn endpoint(&self, layer: LayerKey) -> &str {
        self.endpoints
            .get(&layer)
            .map_or_else(|| default_endpoint(layer), String::as_str)
    }

    /// Endpoint URL for `layer` without the API key.
    #[must_use]
    pub fn endpoint_url(&self, layer: LayerKey) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint(layer).trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn endpoint_url_joins_without_double_slash() {
        let config = FeedConfig::new("https://api.example.org/v1/", "key");
        assert_eq!(
            config.endpoint_url(LayerKey::Incidents),
            "https://api.example.org/v1/incidents"
        );
    }

    #[rstest]
    fn endpoint_override_takes_precedence() {
        let config = FeedConfig::new("https://api.example.org", "key")
            .with_endpoint(LayerKey::WorkZones, "wzdx/v4");
        assert_eq!(
            config.endpoint_url(LayerKey::WorkZones),
            "https://api.example.org/wzdx/v4"
        );
        assert_eq!(config.endpoint(LayerKey::DmsSigns), "/signs");
    }

    #[rstest]
    fn debug_output_redacts_api_key() {
        let config = FeedConfig::new("https://api.example.org", "super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn defaults_match_upstream_contract() {
        let config = FeedConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
