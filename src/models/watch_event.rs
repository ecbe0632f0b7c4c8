use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Watches shorter than this are recorded but excluded from all aggregate
/// statistics and profile weighting (misclicks, scroll-pasts).
pub const MIN_COUNTED_WATCH_SECS: f64 = 5.0;

/// One per-video watch record, immutable once ingested.
///
/// `watch_time_secs` may exceed `video_duration_secs` (loops and re-watches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    pub user_id: Uuid,
    pub video_id: Uuid,
    /// Seconds actually spent on this video
    pub watch_time_secs: f64,
    /// Full length of the video in seconds
    pub video_duration_secs: f64,
    /// Cumulative continuous watching time in the current unbroken session
    pub session_watch_time_secs: f64,
    pub video_name: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub disliked: bool,
    /// Local hour at which the watch happened, 0-23
    pub hour_of_day: u8,
    /// Event timestamp; used for day bucketing, ordering and recency weighting
    pub recorded_at: DateTime<Utc>,
}

impl WatchEvent {
    /// Validates the event at the ingestion boundary.
    ///
    /// Malformed events are rejected before any state is touched.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("watch_time_secs", self.watch_time_secs),
            ("video_duration_secs", self.video_duration_secs),
            ("session_watch_time_secs", self.session_watch_time_secs),
        ] {
            if !value.is_finite() {
                return Err(format!("{} must be a finite number", name));
            }
            if value < 0.0 {
                return Err(format!("{} must not be negative", name));
            }
        }

        if self.hour_of_day > 23 {
            return Err(format!("hour_of_day {} out of range 0-23", self.hour_of_day));
        }

        if self.liked && self.disliked {
            return Err("event cannot be both liked and disliked".to_string());
        }

        Ok(())
    }

    /// Whether the event falls under the policy-discard threshold.
    pub fn is_discarded(&self) -> bool {
        self.watch_time_secs < MIN_COUNTED_WATCH_SECS
    }

    /// Lowercased, deduplicated tokens from the video name and hashtags,
    /// in first-occurrence order.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();

        for word in self.video_name.to_lowercase().split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if !word.is_empty() && !tokens.iter().any(|t| t == word) {
                tokens.push(word.to_string());
            }
        }
        for tag in &self.hashtags {
            let tag = tag.trim_start_matches('#').to_lowercase();
            if !tag.is_empty() && !tokens.contains(&tag) {
                tokens.push(tag);
            }
        }

        tokens
    }
}
