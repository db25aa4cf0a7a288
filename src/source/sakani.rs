use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::SnapshotSource;
use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::listing::{Listing, SearchResponse};

const SEARCH_PATH: &str = "/marketplaceApi/search/v3/location";
const USER_AGENT: &str = concat!("sakani-watch/", env!("CARGO_PKG_VERSION"));

/// Snapshot source backed by the Sakani marketplace search API.
pub struct SakaniSource {
    client: Client,
    base_url: String,
    filters: BTreeMap<String, String>,
}

impl SakaniSource {
    pub fn new(config: &SourceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            filters: config.filters.clone(),
        }
    }
}

#[async_trait]
impl SnapshotSource for SakaniSource {
    async fn fetch(&self) -> Result<Vec<Listing>, FetchError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let query: Vec<(String, &str)> = self
            .filters
            .iter()
            .map(|(k, v)| (format!("filter[{}]", k), v.as_str()))
            .collect();

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .header("Accept", "*/*")
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(FetchError::Transport)?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(FetchError::Parse)?;
        Ok(parsed.data.into_iter().map(Listing::from).collect())
    }
}
