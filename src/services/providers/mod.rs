/// External collaborator abstractions
///
/// The search/index backend and the trending source are external systems;
/// the feed assembler only depends on these traits, with reqwest-backed
/// production implementations and mock doubles in tests.
use crate::{error::AppResult, models::VideoHit};

pub mod search_api;
pub mod trending_api;

pub use search_api::HttpSearchProvider;
pub use trending_api::HttpTrendingProvider;

/// Search/index collaborator: resolves query terms to ranked videos.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Resolves up to eight query terms into an ordered list of video
    /// identifiers with relevance scores.
    async fn query(&self, terms: &[String]) -> AppResult<Vec<VideoHit>>;
}

/// Trending collaborator: the no-signal fallback source.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrendingProvider: Send + Sync {
    /// Fetches the current ordered trending list.
    async fn fetch(&self) -> AppResult<Vec<VideoHit>>;
}
