use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::QueryStrategy,
    error::AppResult,
    models::{ProfileSnapshot, VideoHit},
    services::{
        providers::{SearchProvider, TrendingProvider},
        ranker::{HybridRanker, RankOutcome},
    },
};

/// Where the feed content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Personalized,
    Trending,
}

/// The assembled feed returned to the caller.
///
/// `degraded` flags that the personalized path failed and trending results
/// were substituted (soft failure, never fatal).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedResponse {
    pub videos: Vec<VideoHit>,
    pub source: FeedSource,
    pub degraded: bool,
}

/// Turns a profile snapshot into a feed by ranking terms and resolving them
/// through the search collaborator, falling back to trending when there is
/// nothing to rank or the search backend is down.
pub struct FeedAssembler {
    ranker: HybridRanker,
    search: Arc<dyn SearchProvider>,
    trending: Arc<dyn TrendingProvider>,
    strategy: QueryStrategy,
}

impl FeedAssembler {
    pub fn new(
        ranker: HybridRanker,
        search: Arc<dyn SearchProvider>,
        trending: Arc<dyn TrendingProvider>,
        strategy: QueryStrategy,
    ) -> Self {
        Self {
            ranker,
            search,
            trending,
            strategy,
        }
    }

    /// Builds the feed for one profile snapshot.
    pub async fn assemble(&self, snapshot: &ProfileSnapshot) -> AppResult<FeedResponse> {
        let terms = match self.ranker.rank(snapshot) {
            RankOutcome::EmptyProfile => {
                let videos = self.trending.fetch().await?;
                return Ok(FeedResponse {
                    videos,
                    source: FeedSource::Trending,
                    degraded: false,
                });
            }
            RankOutcome::Ranked(terms) => terms,
        };

        match self.resolve_terms(&terms).await {
            Ok(videos) => Ok(FeedResponse {
                videos,
                source: FeedSource::Personalized,
                degraded: false,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Search collaborator failed, degrading to trending");
                let videos = self.trending.fetch().await?;
                Ok(FeedResponse {
                    videos,
                    source: FeedSource::Trending,
                    degraded: true,
                })
            }
        }
    }

    async fn resolve_terms(&self, terms: &[String]) -> AppResult<Vec<VideoHit>> {
        match self.strategy {
            QueryStrategy::Combined => self.search.query(terms).await,
            QueryStrategy::PerTerm => {
                let mut merged: Vec<VideoHit> = Vec::new();
                for term in terms {
                    let hits = self.search.query(std::slice::from_ref(term)).await?;
                    for hit in hits {
                        match merged.iter_mut().find(|h| h.id == hit.id) {
                            // Keep the best relevance seen for a video
                            Some(existing) => {
                                if hit.relevance > existing.relevance {
                                    existing.relevance = hit.relevance;
                                }
                            }
                            None => merged.push(hit),
                        }
                    }
                }
                merged.sort_by(|a, b| {
                    b.relevance
                        .unwrap_or(0.0)
                        .total_cmp(&a.relevance.unwrap_or(0.0))
                });
                Ok(merged)
            }
        }
    }
}
