use chrono::{DateTime, Utc};

use crate::models::{BreakNotification, BreakReason, BreakState, ParentalControls};

/// Per-user break state machine: ACTIVE -> ARMED -> ON_BREAK -> ACTIVE.
///
/// The scheduler is the only component allowed to mutate [`BreakState`].
/// Arming defers activation until the current video ends, so a break never
/// interrupts playback; the end-of-video signal may arrive at any time,
/// including with nothing armed, and is then a no-op.
#[derive(Debug, Clone, Default)]
pub struct BreakScheduler {
    state: BreakState,
}

impl BreakScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BreakState {
        &self.state
    }

    /// Submits an arm request. Idempotent: a no-op while already armed or
    /// on break, so the first reason wins. Returns whether the request
    /// transitioned the machine.
    pub fn arm(&mut self, reason: BreakReason) -> bool {
        match self.state {
            BreakState::Active => {
                self.state = BreakState::Armed { reason };
                true
            }
            BreakState::Armed { .. } | BreakState::OnBreak { .. } => false,
        }
    }

    /// Handles the end-of-video signal from the playback client.
    ///
    /// If a break is armed, activates it and returns the notification to
    /// emit; otherwise a no-op. Break length is computed at activation time
    /// from the hour of day and the parental configuration.
    pub fn on_video_end(
        &mut self,
        now: DateTime<Utc>,
        hour_of_day: u8,
        controls: &ParentalControls,
    ) -> Option<BreakNotification> {
        let BreakState::Armed { reason } = self.state else {
            return None;
        };

        let length_minutes = break_length_minutes(hour_of_day, controls);
        self.state = BreakState::OnBreak {
            reason,
            started_at: now,
            length_minutes,
        };

        tracing::info!(?reason, length_minutes, hour_of_day, "Break started");
        Some(BreakNotification {
            length_minutes,
            reason,
        })
    }

    /// Ends the break once its duration has elapsed. An elapse signal that
    /// arrives before the break is actually over is ignored, so a client
    /// cannot cut a break short. No-op unless on break.
    pub fn on_break_elapsed(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            BreakState::OnBreak {
                started_at,
                length_minutes,
                ..
            } => {
                let ends_at = started_at + chrono::Duration::minutes(i64::from(length_minutes));
                if now < ends_at {
                    tracing::warn!(%ends_at, "Early break elapse signal ignored");
                    return false;
                }
                self.state = BreakState::Active;
                true
            }
            _ => false,
        }
    }
}

/// Break length in minutes for a given hour of day.
///
/// Monotone nondecreasing over the day: the short tier through the morning,
/// the medium tier from noon, the long tier in the evening. With default
/// controls this stays within [3, 10]; parental overrides raise the whole
/// range.
pub fn break_length_minutes(hour_of_day: u8, controls: &ParentalControls) -> u32 {
    let base = controls.break_short_min;
    let max = controls.break_long_min;

    let scaled = match hour_of_day {
        0..=11 => base,
        12..=17 => controls.break_medium_min,
        _ => max,
    };

    scaled.clamp(base, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stricter_controls() -> ParentalControls {
        ParentalControls {
            break_short_min: 10,
            break_medium_min: 30,
            break_long_min: 60,
        }
    }

    #[test]
    fn test_arm_then_video_end_starts_break() {
        let mut scheduler = BreakScheduler::new();
        assert!(scheduler.arm(BreakReason::DurationRule));
        assert!(matches!(scheduler.state(), BreakState::Armed { .. }));

        let notification = scheduler
            .on_video_end(Utc::now(), 21, &ParentalControls::default())
            .expect("armed break should start");
        assert_eq!(notification.reason, BreakReason::DurationRule);
        assert_eq!(notification.length_minutes, 10);
        assert!(matches!(scheduler.state(), BreakState::OnBreak { .. }));
    }

    #[test]
    fn test_arm_is_idempotent_first_reason_wins() {
        let mut scheduler = BreakScheduler::new();
        assert!(scheduler.arm(BreakReason::AttentionRule));
        assert!(!scheduler.arm(BreakReason::DurationRule));

        let notification = scheduler
            .on_video_end(Utc::now(), 9, &ParentalControls::default())
            .unwrap();
        assert_eq!(notification.reason, BreakReason::AttentionRule);
    }

    #[test]
    fn test_video_end_without_arm_is_noop() {
        let mut scheduler = BreakScheduler::new();
        let notification = scheduler.on_video_end(Utc::now(), 12, &ParentalControls::default());
        assert!(notification.is_none());
        assert_eq!(*scheduler.state(), BreakState::Active);
    }

    #[test]
    fn test_video_end_while_on_break_is_noop() {
        let mut scheduler = BreakScheduler::new();
        scheduler.arm(BreakReason::DurationRule);
        scheduler
            .on_video_end(Utc::now(), 12, &ParentalControls::default())
            .unwrap();

        let again = scheduler.on_video_end(Utc::now(), 12, &ParentalControls::default());
        assert!(again.is_none());
        assert!(matches!(scheduler.state(), BreakState::OnBreak { .. }));
    }

    #[test]
    fn test_break_elapsed_returns_to_active() {
        let mut scheduler = BreakScheduler::new();
        scheduler.arm(BreakReason::AttentionRule);
        let start = Utc::now();
        let notification = scheduler
            .on_video_end(start, 12, &ParentalControls::default())
            .unwrap();

        let after = start + chrono::Duration::minutes(i64::from(notification.length_minutes));
        assert!(scheduler.on_break_elapsed(after));
        assert_eq!(*scheduler.state(), BreakState::Active);

        // Elapsing again, or without a break, is a no-op
        assert!(!scheduler.on_break_elapsed(after));
    }

    #[test]
    fn test_early_break_elapse_is_ignored() {
        let mut scheduler = BreakScheduler::new();
        scheduler.arm(BreakReason::DurationRule);
        let start = Utc::now();
        scheduler
            .on_video_end(start, 21, &ParentalControls::default())
            .unwrap();

        // One minute into a ten-minute break: the break holds
        assert!(!scheduler.on_break_elapsed(start + chrono::Duration::minutes(1)));
        assert!(matches!(scheduler.state(), BreakState::OnBreak { .. }));

        assert!(scheduler.on_break_elapsed(start + chrono::Duration::minutes(10)));
        assert_eq!(*scheduler.state(), BreakState::Active);
    }

    #[test]
    fn test_arm_while_on_break_is_noop() {
        let mut scheduler = BreakScheduler::new();
        scheduler.arm(BreakReason::AttentionRule);
        scheduler
            .on_video_end(Utc::now(), 12, &ParentalControls::default())
            .unwrap();
        assert!(!scheduler.arm(BreakReason::DurationRule));
    }

    #[test]
    fn test_break_length_nondecreasing_over_the_day() {
        let controls = ParentalControls::default();
        let mut previous = 0;
        for hour in 0u8..24 {
            let length = break_length_minutes(hour, &controls);
            assert!(length >= previous, "hour {} shrank the break", hour);
            assert!((3..=10).contains(&length));
            previous = length;
        }
    }

    #[test]
    fn test_default_break_length_bounds() {
        let controls = ParentalControls::default();
        assert_eq!(break_length_minutes(0, &controls), 3);
        assert_eq!(break_length_minutes(14, &controls), 6);
        assert_eq!(break_length_minutes(23, &controls), 10);
    }

    #[test]
    fn test_parental_override_raises_range() {
        let controls = stricter_controls();
        assert_eq!(break_length_minutes(8, &controls), 10);
        assert_eq!(break_length_minutes(13, &controls), 30);
        assert_eq!(break_length_minutes(22, &controls), 60);

        let mut previous = 0;
        for hour in 0u8..24 {
            let length = break_length_minutes(hour, &controls);
            assert!(length >= previous);
            assert!((10..=60).contains(&length));
            previous = length;
        }
    }
}
