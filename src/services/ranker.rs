use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::ProfileSnapshot;

/// Maximum number of terms a ranking produces.
pub const MAX_QUERY_TERMS: usize = 8;

/// Result of ranking a profile snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum RankOutcome {
    /// No scorable history; the feed should fall back to trending
    EmptyProfile,
    /// Up to eight distinct terms, best first
    Ranked(Vec<String>),
}

/// Blends a sequence (Markov transition) model with a frequency (TF-IDF)
/// model over the user's weighted watch history.
///
/// The sequence score captures topical momentum: how strongly a term tends
/// to follow the user's recent watch order. The frequency score captures
/// distinctiveness: terms frequent for this user but rare across their
/// history as a whole. Output is deterministic for a fixed snapshot.
#[derive(Debug, Clone, Copy)]
pub struct HybridRanker {
    /// Share of the sequence score in the blend, in [0, 1]
    blend_weight: f64,
}

impl HybridRanker {
    pub fn new(blend_weight: f64) -> Self {
        Self {
            blend_weight: blend_weight.clamp(0.0, 1.0),
        }
    }

    /// Ranks the snapshot into at most eight distinct terms.
    ///
    /// An empty history (or one whose every token has been purged) yields
    /// [`RankOutcome::EmptyProfile`] without ever entering the scoring path.
    pub fn rank(&self, snapshot: &ProfileSnapshot) -> RankOutcome {
        if snapshot.is_empty() {
            return RankOutcome::EmptyProfile;
        }

        let sequence = normalize(self.sequence_scores(snapshot));
        let frequency = normalize(self.frequency_scores(snapshot));
        let last_seen = last_occurrence(snapshot);

        let mut scored: Vec<(String, f64)> = last_seen
            .keys()
            .map(|term| {
                let seq = sequence.get(term).copied().unwrap_or(0.0);
                let freq = frequency.get(term).copied().unwrap_or(0.0);
                let blended = self.blend_weight * seq + (1.0 - self.blend_weight) * freq;
                (term.clone(), blended)
            })
            .collect();

        // Ties broken by most recent occurrence, then lexicographically, so
        // the ordering is total and stable across runs.
        scored.sort_by(|(a_term, a_score), (b_term, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| last_seen[b_term].cmp(&last_seen[a_term]))
                .then_with(|| a_term.cmp(b_term))
        });

        let terms: Vec<String> = scored
            .into_iter()
            .take(MAX_QUERY_TERMS)
            .map(|(term, _)| term)
            .collect();

        tracing::debug!(terms = ?terms, "Ranked profile terms");
        RankOutcome::Ranked(terms)
    }

    /// Markov-style transition scores: each term's weighted incoming
    /// transition mass over the flattened watch-order token sequence.
    fn sequence_scores(&self, snapshot: &ProfileSnapshot) -> HashMap<String, f64> {
        // Flatten tokens in watch order, remembering each token's entry weight.
        let sequence: Vec<(&String, f64)> = snapshot
            .entries
            .iter()
            .flat_map(|entry| entry.tokens.iter().map(|t| (t, entry.weight)))
            .collect();

        let mut incoming: HashMap<String, f64> = HashMap::new();
        let mut total_mass = 0.0;
        for window in sequence.windows(2) {
            let (next, weight) = window[1];
            *incoming.entry(next.clone()).or_insert(0.0) += weight;
            total_mass += weight;
        }

        if total_mass > 0.0 {
            for score in incoming.values_mut() {
                *score /= total_mass;
            }
        }
        incoming
    }

    /// TF-IDF scores: each history entry is a document; per-document
    /// contributions are scaled by the entry's recency weight.
    fn frequency_scores(&self, snapshot: &ProfileSnapshot) -> HashMap<String, f64> {
        let docs: Vec<_> = snapshot
            .entries
            .iter()
            .filter(|e| !e.tokens.is_empty())
            .collect();
        let total_docs = docs.len() as f64;
        if total_docs == 0.0 {
            return HashMap::new();
        }

        let mut docs_with_term: HashMap<&String, f64> = HashMap::new();
        for doc in &docs {
            for token in &doc.tokens {
                *docs_with_term.entry(token).or_insert(0.0) += 1.0;
            }
        }

        let mut scores: HashMap<String, f64> = HashMap::new();
        for doc in &docs {
            let doc_len = doc.tokens.len() as f64;
            for token in &doc.tokens {
                // Entry tokens are deduplicated, so term frequency is 1/len.
                let tf = 1.0 / doc_len;
                let idf = (total_docs / docs_with_term[token]).ln();
                *scores.entry(token.clone()).or_insert(0.0) += doc.weight * tf * idf;
            }
        }
        scores
    }
}

/// Scales scores into [0, 1] by the maximum, leaving all-zero maps alone.
fn normalize(mut scores: HashMap<String, f64>) -> HashMap<String, f64> {
    let max = scores.values().cloned().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for score in scores.values_mut() {
            *score /= max;
        }
    }
    scores
}

/// Most recent `recorded_at` per distinct term; doubles as the candidate set.
fn last_occurrence(snapshot: &ProfileSnapshot) -> HashMap<String, DateTime<Utc>> {
    let mut last_seen: HashMap<String, DateTime<Utc>> = HashMap::new();
    for entry in &snapshot.entries {
        for token in &entry.tokens {
            last_seen
                .entry(token.clone())
                .and_modify(|ts| {
                    if entry.recorded_at > *ts {
                        *ts = entry.recorded_at;
                    }
                })
                .or_insert(entry.recorded_at);
        }
    }
    last_seen
}
