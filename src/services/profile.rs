use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{ProfileEntry, ProfileSnapshot, SnapshotEntry, UserProfile, WatchEvent};

/// Recency decay applied to profile history entries.
///
/// Implementations must be monotone nonincreasing in age so a newer watch
/// never weighs less than an older one. The exact curve is a tuning knob,
/// which is why it is a trait rather than a hard-coded schedule.
pub trait DecaySchedule: Send + Sync {
    /// Weight multiplier for an entry aged `age_secs`, in (0, 1].
    fn weight(&self, age_secs: f64) -> f64;
}

/// Exponential decay with a configurable half-life.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialDecay {
    half_life_secs: f64,
}

impl ExponentialDecay {
    pub fn new(half_life_secs: f64) -> Self {
        Self {
            half_life_secs: half_life_secs.max(1.0),
        }
    }
}

impl DecaySchedule for ExponentialDecay {
    fn weight(&self, age_secs: f64) -> f64 {
        let age_secs = age_secs.max(0.0);
        0.5_f64.powf(age_secs / self.half_life_secs)
    }
}

/// Maintains the decayed, weighted term profile for each user.
///
/// Liked watches get a weight boost; disliked watches purge their tokens
/// from the aggregate outright rather than down-weighting them. The
/// aggregate term-weight mapping is recomputed after every mutation so
/// consumers always read a complete snapshot.
#[derive(Clone)]
pub struct ProfileAggregator {
    decay: Arc<dyn DecaySchedule>,
    like_boost: f64,
    max_entries: usize,
}

impl ProfileAggregator {
    pub fn new(decay: Arc<dyn DecaySchedule>, like_boost: f64, max_entries: usize) -> Self {
        Self {
            decay,
            like_boost: like_boost.max(1.0),
            max_entries: max_entries.max(1),
        }
    }

    /// Applies one watch event to the profile.
    ///
    /// A dislike purges the event's tokens from the aggregate regardless of
    /// watch length: the signal is the dislike itself, not the time spent.
    /// Any other sub-threshold watch never contributes, and a counted watch
    /// joins the history and reintroduces previously purged tokens it
    /// carries.
    pub fn record(&self, profile: &mut UserProfile, event: &WatchEvent, now: DateTime<Utc>) {
        if event.disliked {
            let tokens = event.tokens();
            for token in &tokens {
                profile.purged.insert(token.clone());
            }
            tracing::debug!(
                user_id = %event.user_id,
                purged = tokens.len(),
                "Disliked watch purged its tokens"
            );
            self.recompute_aggregate(profile, now);
            return;
        }

        if event.is_discarded() {
            return;
        }

        let tokens = event.tokens();
        for token in &tokens {
            profile.purged.remove(token);
        }
        profile.history.push_back(ProfileEntry {
            tokens,
            recorded_at: event.recorded_at,
            liked: event.liked,
        });
        while profile.history.len() > self.max_entries {
            profile.history.pop_front();
        }

        self.recompute_aggregate(profile, now);
    }

    /// Rebuilds the aggregate term-weight mapping from the history.
    fn recompute_aggregate(&self, profile: &mut UserProfile, now: DateTime<Utc>) {
        profile.aggregate.clear();
        for entry in &profile.history {
            let weight = self.entry_weight(entry, now);
            for token in &entry.tokens {
                if profile.purged.contains(token) {
                    continue;
                }
                *profile.aggregate.entry(token.clone()).or_insert(0.0) += weight;
            }
        }
    }

    /// Clones a consistent, weight-resolved view of the profile for ranking.
    pub fn snapshot(&self, profile: &UserProfile, now: DateTime<Utc>) -> ProfileSnapshot {
        let entries = profile
            .history
            .iter()
            .map(|entry| SnapshotEntry {
                tokens: entry
                    .tokens
                    .iter()
                    .filter(|t| !profile.purged.contains(*t))
                    .cloned()
                    .collect(),
                recorded_at: entry.recorded_at,
                weight: self.entry_weight(entry, now),
            })
            .collect();

        ProfileSnapshot { entries }
    }

    fn entry_weight(&self, entry: &ProfileEntry, now: DateTime<Utc>) -> f64 {
        let age_secs = (now - entry.recorded_at).num_milliseconds() as f64 / 1000.0;
        let boost = if entry.liked { self.like_boost } else { 1.0 };
        self.decay.weight(age_secs) * boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn aggregator() -> ProfileAggregator {
        ProfileAggregator::new(Arc::new(ExponentialDecay::new(3600.0)), 2.0, 100)
    }

    fn event(name: &str, hashtags: &[&str], recorded_at: DateTime<Utc>) -> WatchEvent {
        WatchEvent {
            user_id: Uuid::new_v4(),
            video_id: Uuid::new_v4(),
            watch_time_secs: 60.0,
            video_duration_secs: 120.0,
            session_watch_time_secs: 60.0,
            video_name: name.to_string(),
            hashtags: hashtags.iter().map(|s| s.to_string()).collect(),
            liked: false,
            disliked: false,
            hour_of_day: 12,
            recorded_at,
        }
    }

    #[test]
    fn test_discarded_event_leaves_profile_unchanged() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        let mut e = event("pasta recipe", &["cooking"], now);
        e.watch_time_secs = 2.0;
        aggregator.record(&mut profile, &e, now);

        assert!(profile.is_empty());
        assert!(profile.aggregate.is_empty());
    }

    #[test]
    fn test_counted_event_contributes_tokens() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        aggregator.record(&mut profile, &event("pasta recipe", &["cooking"], now), now);

        assert_eq!(profile.history.len(), 1);
        assert!(profile.aggregate.contains_key("pasta"));
        assert!(profile.aggregate.contains_key("recipe"));
        assert!(profile.aggregate.contains_key("cooking"));
    }

    #[test]
    fn test_newer_entry_weighs_at_least_as_much() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        let older = event("vintage trains", &[], now - Duration::hours(5));
        let newer = event("modern trains", &[], now - Duration::minutes(1));
        aggregator.record(&mut profile, &older, now);
        aggregator.record(&mut profile, &newer, now);

        let vintage = profile.aggregate["vintage"];
        let modern = profile.aggregate["modern"];
        assert!(modern >= vintage, "{} < {}", modern, vintage);
    }

    #[test]
    fn test_liked_event_boosted() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        let plain = event("plain clip", &[], now);
        let mut liked = event("liked clip", &[], now);
        liked.liked = true;
        aggregator.record(&mut profile, &plain, now);
        aggregator.record(&mut profile, &liked, now);

        assert!(profile.aggregate["liked"] > profile.aggregate["plain"]);
        // shared token gets both contributions
        assert!(profile.aggregate["clip"] > profile.aggregate["liked"]);
    }

    #[test]
    fn test_dislike_purges_tokens_from_aggregate() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        aggregator.record(&mut profile, &event("shocking viral clip", &["viral"], now), now);
        assert!(profile.aggregate.contains_key("viral"));

        let mut disliked = event("shocking garbage", &["viral", "shocking"], now);
        disliked.disliked = true;
        aggregator.record(&mut profile, &disliked, now);

        // Purged outright, not down-weighted
        assert!(!profile.aggregate.contains_key("viral"));
        assert!(!profile.aggregate.contains_key("shocking"));
        // Unrelated tokens survive
        assert!(profile.aggregate.contains_key("clip"));
        // The disliked watch never joins the history
        assert_eq!(profile.history.len(), 1);
    }

    #[test]
    fn test_sub_threshold_dislike_still_purges() {
        // A dislike is an explicit signal even when the watch was a
        // 3-second scroll-past; only the stats/weight contribution is
        // skipped, not the purge.
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        aggregator.record(
            &mut profile,
            &event("great cooking tips", &["cooking"], now),
            now,
        );
        assert!(profile.aggregate.contains_key("cooking"));

        let mut disliked = event("clickbait", &["cooking", "shocking"], now);
        disliked.watch_time_secs = 3.0;
        disliked.disliked = true;
        aggregator.record(&mut profile, &disliked, now);

        assert!(!profile.aggregate.contains_key("cooking"));
        assert!(profile.purged.contains("shocking"));
        // Still no history entry and no weight from the disliked watch
        assert_eq!(profile.history.len(), 1);
        assert!(!profile.aggregate.contains_key("clickbait"));
    }

    #[test]
    fn test_purged_token_reintroduced_by_new_signal() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        let mut disliked = event("clickbait", &["viral"], now);
        disliked.disliked = true;
        aggregator.record(&mut profile, &disliked, now);
        assert!(profile.purged.contains("viral"));

        aggregator.record(&mut profile, &event("actually good", &["viral"], now), now);
        assert!(!profile.purged.contains("viral"));
        assert!(profile.aggregate.contains_key("viral"));
    }

    #[test]
    fn test_history_capped_by_eviction() {
        let aggregator = ProfileAggregator::new(Arc::new(ExponentialDecay::new(3600.0)), 2.0, 2);
        let mut profile = UserProfile::new();
        let now = Utc::now();

        aggregator.record(&mut profile, &event("first", &[], now), now);
        aggregator.record(&mut profile, &event("second", &[], now), now);
        aggregator.record(&mut profile, &event("third", &[], now), now);

        assert_eq!(profile.history.len(), 2);
        assert!(!profile.aggregate.contains_key("first"));
        assert!(profile.aggregate.contains_key("third"));
    }

    #[test]
    fn test_snapshot_strips_purged_tokens() {
        let aggregator = aggregator();
        let mut profile = UserProfile::new();
        let now = Utc::now();

        aggregator.record(&mut profile, &event("viral pasta", &[], now), now);
        let mut disliked = event("junk", &["viral"], now);
        disliked.disliked = true;
        aggregator.record(&mut profile, &disliked, now);

        let snapshot = aggregator.snapshot(&profile, now);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].tokens, vec!["pasta".to_string()]);
    }

    #[test]
    fn test_exponential_decay_halves_at_half_life() {
        let decay = ExponentialDecay::new(100.0);
        assert!((decay.weight(0.0) - 1.0).abs() < 1e-9);
        assert!((decay.weight(100.0) - 0.5).abs() < 1e-9);
        assert!((decay.weight(200.0) - 0.25).abs() < 1e-9);
        // Negative ages clamp to full weight
        assert!((decay.weight(-50.0) - 1.0).abs() < 1e-9);
    }
}
