pub mod break_scheduler;
pub mod feed;
pub mod guardrail;
pub mod profile;
pub mod providers;
pub mod ranker;

pub use break_scheduler::{break_length_minutes, BreakScheduler};
pub use feed::{FeedAssembler, FeedResponse, FeedSource};
pub use guardrail::{GuardrailDecision, GuardrailMonitor};
pub use profile::{DecaySchedule, ExponentialDecay, ProfileAggregator};
pub use ranker::{HybridRanker, RankOutcome, MAX_QUERY_TERMS};
