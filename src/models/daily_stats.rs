use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::WatchEvent;

/// Accumulated statistics for one user on one calendar day.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DayBucket {
    /// Sum of watch time over counted events, seconds
    pub watch_secs: f64,
    /// Sum of video duration over counted events, seconds
    pub duration_secs: f64,
    pub counted_events: u32,
    /// Sub-threshold watches: recorded as received, excluded from the sums
    pub discarded_events: u32,
}

impl DayBucket {
    /// Daily completion ratio as a percentage.
    ///
    /// Treated as 100 when no counted event has landed yet, so guardrail
    /// rules never fire on an empty day.
    pub fn attention_span_percent(&self) -> f64 {
        if self.duration_secs == 0.0 {
            return 100.0;
        }
        100.0 * self.watch_secs / self.duration_secs
    }
}

/// Per-user, date-keyed daily statistics.
///
/// Every event is routed to the bucket for its own `recorded_at` date, never
/// the processing date, so events straddling a day boundary land in exactly
/// one day. The daily reset is a prune of stale buckets and is idempotent.
#[derive(Debug, Clone, Default)]
pub struct DailyLedger {
    days: BTreeMap<NaiveDate, DayBucket>,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a counted event into its day's bucket and returns the
    /// updated bucket.
    pub fn record(&mut self, event: &WatchEvent) -> &DayBucket {
        let bucket = self.days.entry(event.recorded_at.date_naive()).or_default();
        bucket.watch_secs += event.watch_time_secs;
        bucket.duration_secs += event.video_duration_secs;
        bucket.counted_events += 1;
        bucket
    }

    /// Records a sub-threshold event without touching the sums.
    pub fn record_discarded(&mut self, event: &WatchEvent) {
        let bucket = self.days.entry(event.recorded_at.date_naive()).or_default();
        bucket.discarded_events += 1;
    }

    /// Returns the bucket for `date`, if any counted or discarded event
    /// has been routed to it.
    pub fn bucket(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.days.get(&date)
    }

    /// Drops buckets strictly older than `cutoff`. Idempotent; calling it
    /// twice with the same cutoff is a no-op the second time.
    pub fn prune_before(&mut self, cutoff: NaiveDate) {
        self.days.retain(|date, _| *date >= cutoff);
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
