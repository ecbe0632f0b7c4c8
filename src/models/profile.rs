use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};

/// One counted, non-disliked watch in the profile history.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    /// Lowercased title and hashtag tokens, deduplicated, in original order
    pub tokens: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    pub liked: bool,
}

/// Per-user viewing profile.
///
/// The history is the decayed source of truth; `aggregate` is the current
/// term-weight mapping recomputed after every mutation, and `purged` holds
/// tokens removed by dislikes until a later non-disliked watch reintroduces
/// them.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub history: VecDeque<ProfileEntry>,
    pub purged: HashSet<String>,
    pub aggregate: HashMap<String, f64>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// One history entry in a snapshot, with its recency weight resolved and
/// purged tokens already stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub tokens: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    pub weight: f64,
}

/// A consistent point-in-time view of a profile handed to the ranker.
///
/// Feed requests run over a snapshot so concurrent ingestion can never
/// expose a partially updated profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileSnapshot {
    pub entries: Vec<SnapshotEntry>,
}

impl ProfileSnapshot {
    /// True when nothing can be scored: no history, or every token purged.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.tokens.is_empty())
    }
}
