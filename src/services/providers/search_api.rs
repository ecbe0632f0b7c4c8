use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::VideoHit,
    services::providers::SearchProvider,
};

/// HTTP client for the search/index collaborator.
///
/// Expects a JSON endpoint `GET {base}/search?q=<terms>` returning
/// `{ "results": [ { "video_id": ..., "relevance": ... }, ... ] }`
/// ordered by descending relevance.
#[derive(Clone)]
pub struct HttpSearchProvider {
    http_client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    video_id: String,
    relevance: f64,
}

impl HttpSearchProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn query(&self, terms: &[String]) -> AppResult<Vec<VideoHit>> {
        let url = format!("{}/search", self.base_url);
        let query = terms.join(" ");

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Search API returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        tracing::debug!(terms = terms.len(), hits = body.results.len(), "Search query resolved");

        Ok(body
            .results
            .into_iter()
            .map(|hit| VideoHit {
                id: hit.video_id,
                relevance: Some(hit.relevance),
            })
            .collect())
    }
}
