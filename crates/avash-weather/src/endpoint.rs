//! Upstream API location and credentials.

use avash_core::{ConfigError, WeatherConfig};
use url::Url;

/// Base URL plus API key for the OpenWeatherMap-style endpoints.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    base_url: Url,
    api_key: String,
}

impl ApiEndpoint {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("api base url {base_url}: {e}")))?;

        // Keep any path prefix when joining endpoint paths onto it.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, ConfigError> {
        Self::new(&config.api_base_url, config.effective_api_key())
    }

    /// Build `{base}/{path}?{params}&appid={key}`.
    pub(crate) fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("appid", &self.api_key);
        Ok(url)
    }
}
