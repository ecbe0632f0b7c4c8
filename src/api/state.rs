use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{BreakState, DailyLedger, ParentalControls, UserProfile};
use crate::services::providers::{SearchProvider, TrendingProvider};
use crate::services::{
    BreakScheduler, ExponentialDecay, FeedAssembler, GuardrailMonitor, HybridRanker,
    ProfileAggregator,
};

/// All mutable state for one user.
///
/// Guarded by a single lock so event processing, break transitions and
/// parental updates for that user serialize; users are fully independent.
pub struct UserState {
    pub ledger: DailyLedger,
    pub scheduler: BreakScheduler,
    pub profile: UserProfile,
    pub controls: ParentalControls,
    /// Timestamp of the last accepted event; older arrivals are rejected
    pub last_event_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl UserState {
    fn new() -> Self {
        Self {
            ledger: DailyLedger::new(),
            scheduler: BreakScheduler::new(),
            profile: UserProfile::new(),
            controls: ParentalControls::default(),
            last_event_at: None,
        }
    }

    pub fn break_state(&self) -> &BreakState {
        self.scheduler.state()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub monitor: GuardrailMonitor,
    pub aggregator: ProfileAggregator,
    pub feed: Arc<FeedAssembler>,
    users: Arc<RwLock<HashMap<Uuid, Arc<RwLock<UserState>>>>>,
}

impl AppState {
    /// Creates application state around the given collaborators.
    pub fn new(
        config: Config,
        search: Arc<dyn SearchProvider>,
        trending: Arc<dyn TrendingProvider>,
    ) -> Self {
        let decay = Arc::new(ExponentialDecay::new(config.decay_half_life_secs));
        let aggregator =
            ProfileAggregator::new(decay, config.like_boost, config.max_profile_entries);
        let ranker = HybridRanker::new(config.blend_weight);
        let feed = Arc::new(FeedAssembler::new(
            ranker,
            search,
            trending,
            config.query_strategy,
        ));

        Self {
            config: Arc::new(config),
            monitor: GuardrailMonitor::new(),
            aggregator,
            feed,
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the state handle for a user, creating empty state on first
    /// contact (a new user is empty state, never an error).
    pub async fn user(&self, user_id: Uuid) -> Arc<RwLock<UserState>> {
        if let Some(state) = self.users.read().await.get(&user_id) {
            return state.clone();
        }
        let mut users = self.users.write().await;
        users
            .entry(user_id)
            .or_insert_with(|| Arc::new(RwLock::new(UserState::new())))
            .clone()
    }

    /// Looks a user up without creating state.
    pub async fn existing_user(&self, user_id: Uuid) -> Option<Arc<RwLock<UserState>>> {
        self.users.read().await.get(&user_id).cloned()
    }
}
