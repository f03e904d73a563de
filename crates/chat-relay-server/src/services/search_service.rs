use crate::config::SearchConfig;
use crate::models::search::SearchResult;
use crate::utils::error::ProviderError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::services::conversation::manager::{SearchKind, SearchProvider};

const PROVIDER: &str = "search API";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<SearchResult>,
    #[serde(default)]
    news: Vec<SearchResult>,
}

impl SearchKind {
    fn endpoint(&self) -> &'static str {
        match self {
            Self::Web => "search",
            Self::News => "news",
        }
    }
}

/// Client for a Serper-style search API (`/search` and `/news`).
#[derive(Clone)]
pub struct SearchService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SearchService {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    pub async fn fetch(
        &self,
        kind: SearchKind,
        query: &str,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(PROVIDER))?;

        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, kind.endpoint()))
            .header("X-API-KEY", api_key)
            .json(&SearchRequest { q: query })
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Search {} returned {}: {}", kind.endpoint(), status, body);
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let body: SearchResponse = response.json().await.map_err(|source| ProviderError::Decode {
            provider: PROVIDER,
            source,
        })?;

        let results = match kind {
            SearchKind::Web => body.organic,
            SearchKind::News => body.news,
        };

        debug!("Search {} returned {} results", kind.endpoint(), results.len());
        Ok(results)
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearchService {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.fetch(kind, query).await?)
    }
}
