mod break_state;
mod daily_stats;
mod profile;
mod watch_event;

pub use break_state::{BreakNotification, BreakReason, BreakState, ParentalControls};
pub use daily_stats::{DailyLedger, DayBucket};
pub use profile::{ProfileEntry, ProfileSnapshot, SnapshotEntry, UserProfile};
pub use watch_event::{WatchEvent, MIN_COUNTED_WATCH_SECS};

use serde::{Deserialize, Serialize};

/// A single candidate video returned by a collaborator.
///
/// Search results carry a relevance score; trending results do not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoHit {
    pub id: String,
    pub relevance: Option<f64>,
}
