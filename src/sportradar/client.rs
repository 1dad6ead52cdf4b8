//! Sportradar IndyCar HTTP client
//!
//! Two endpoints are used:
//! - `{base_url}/seasons.json` - every season the feed knows about
//! - `{base_url}/sport_events/{id}/summary.json` - summary of any stage;
//!   used both for a season (to enumerate its races) and for a single race
//!
//! See: https://developer.sportradar.com/racing/reference/indycar-overview

use serde_json::Value;

use super::dto;
use super::fetch::{FetchError, Fetcher, HttpJsonSource, JsonSource, RetryPolicy};
use crate::config::Config;

/// Sportradar API client
pub struct SportradarClient<S = HttpJsonSource> {
    fetcher: Fetcher<S>,
    base_url: String,
}

impl SportradarClient<HttpJsonSource> {
    /// Create a client from the application config
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let source = HttpJsonSource::new(config.api.api_key.clone())?;
        Ok(Self::with_source(
            source,
            &config.api.base_url,
            RetryPolicy::from(&config.fetch),
        ))
    }
}

impl<S: JsonSource> SportradarClient<S> {
    /// Create a client over any transport
    pub fn with_source(source: S, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            fetcher: Fetcher::new(source, policy),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn seasons_url(&self) -> String {
        format!("{}/seasons.json", self.base_url)
    }

    pub fn summary_url(&self, stage_id: &str) -> String {
        format!("{}/sport_events/{}/summary.json", self.base_url, stage_id)
    }

    /// Fetch the list of seasons. `None` if the fetch or the parse failed.
    pub async fn seasons(&self) -> Option<dto::SeasonsResponse> {
        let value = self.fetcher.fetch(&self.seasons_url()).await?;
        match serde_json::from_value(value) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!("Malformed seasons list: {}", e);
                None
            }
        }
    }

    /// Fetch a raw stage summary. `None` means "no data".
    pub async fn summary(&self, stage_id: &str) -> Option<Value> {
        self.fetcher.fetch(&self.summary_url(stage_id)).await
    }

    /// Fetch a season summary and parse the parts we navigate.
    pub async fn season_summary(&self, season_id: &str) -> Option<dto::SeasonSummary> {
        let value = self.summary(season_id).await?;
        match serde_json::from_value(value) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Malformed season summary for {}: {}", season_id, e);
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        self.fetcher.source()
    }
}
