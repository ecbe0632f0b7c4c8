use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::VideoHit,
    services::providers::TrendingProvider,
};

/// HTTP client for the trending collaborator.
///
/// Expects `GET {base}/trending` returning `{ "videos": ["id", ...] }`
/// in display order.
#[derive(Clone)]
pub struct HttpTrendingProvider {
    http_client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    videos: Vec<String>,
}

impl HttpTrendingProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl TrendingProvider for HttpTrendingProvider {
    async fn fetch(&self) -> AppResult<Vec<VideoHit>> {
        let url = format!("{}/trending", self.base_url);
        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Trending API returned status {}",
                response.status()
            )));
        }

        let body: TrendingResponse = response.json().await?;
        Ok(body
            .videos
            .into_iter()
            .map(|id| VideoHit {
                id,
                relevance: None,
            })
            .collect())
    }
}
