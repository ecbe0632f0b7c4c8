use serde::Deserialize;

/// Strategy for resolving ranked terms against the search collaborator.
///
/// `Combined` submits all ranked terms as one query; `PerTerm` issues one
/// query per term and merges the results by relevance.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    Combined,
    PerTerm,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Search/index collaborator base URL
    #[serde(default = "default_search_api_url")]
    pub search_api_url: String,

    /// Trending collaborator base URL
    #[serde(default = "default_trending_api_url")]
    pub trending_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Weight of the sequence (Markov) score in the hybrid blend, in [0, 1].
    /// The frequency (TF-IDF) score receives the complement.
    #[serde(default = "default_blend_weight")]
    pub blend_weight: f64,

    /// Half-life in seconds of the exponential recency decay applied to
    /// profile history entries
    #[serde(default = "default_decay_half_life_secs")]
    pub decay_half_life_secs: f64,

    /// Multiplier applied to the recency weight of liked watches
    #[serde(default = "default_like_boost")]
    pub like_boost: f64,

    /// Maximum number of history entries retained per user profile
    #[serde(default = "default_max_profile_entries")]
    pub max_profile_entries: usize,

    /// How many days of per-day statistics to retain per user
    #[serde(default = "default_stats_retention_days")]
    pub stats_retention_days: i64,

    /// How ranked terms are submitted to the search collaborator
    #[serde(default = "default_query_strategy")]
    pub query_strategy: QueryStrategy,
}

fn default_search_api_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_trending_api_url() -> String {
    "http://localhost:9300".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_blend_weight() -> f64 {
    0.5
}

fn default_decay_half_life_secs() -> f64 {
    86_400.0
}

fn default_like_boost() -> f64 {
    2.0
}

fn default_max_profile_entries() -> usize {
    100
}

fn default_stats_retention_days() -> i64 {
    7
}

fn default_query_strategy() -> QueryStrategy {
    QueryStrategy::Combined
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_api_url: default_search_api_url(),
            trending_api_url: default_trending_api_url(),
            host: default_host(),
            port: default_port(),
            blend_weight: default_blend_weight(),
            decay_half_life_secs: default_decay_half_life_secs(),
            like_boost: default_like_boost(),
            max_profile_entries: default_max_profile_entries(),
            stats_retention_days: default_stats_retention_days(),
            query_strategy: default_query_strategy(),
        }
    }
}
