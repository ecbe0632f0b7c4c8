use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which guardrail rule asked for the break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakReason {
    /// Low engagement: attention span under 25% with 8+ minutes of session time
    AttentionRule,
    /// Hard session cap: more than 20 minutes of continuous watching
    DurationRule,
}

/// Per-user break state machine position.
///
/// Owned exclusively by the break scheduler; the guardrail monitor only
/// submits arm requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BreakState {
    /// Watching normally
    Active,
    /// A break has been decided but waits for the current video to finish
    Armed { reason: BreakReason },
    /// Break in progress
    OnBreak {
        reason: BreakReason,
        started_at: DateTime<Utc>,
        length_minutes: u32,
    },
}

impl Default for BreakState {
    fn default() -> Self {
        BreakState::Active
    }
}

/// Emitted to the playback client when a break actually starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakNotification {
    pub length_minutes: u32,
    pub reason: BreakReason,
}

/// Parental break-length configuration, minutes.
///
/// The short value acts as the base break length and the long value as the
/// cap; parents may raise all three (e.g. 10/30/60).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentalControls {
    pub break_short_min: u32,
    pub break_medium_min: u32,
    pub break_long_min: u32,
}

impl Default for ParentalControls {
    fn default() -> Self {
        Self {
            break_short_min: 3,
            break_medium_min: 6,
            break_long_min: 10,
        }
    }
}

impl ParentalControls {
    /// The tiers must be nondecreasing so break length stays a monotone
    /// function of hour-of-day.
    pub fn validate(&self) -> Result<(), String> {
        if self.break_short_min == 0 {
            return Err("break_short_min must be at least 1 minute".to_string());
        }
        if self.break_short_min > self.break_medium_min
            || self.break_medium_min > self.break_long_min
        {
            return Err("break lengths must satisfy short <= medium <= long".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controls_valid() {
        assert!(ParentalControls::default().validate().is_ok());
    }

    #[test]
    fn test_decreasing_tiers_rejected() {
        let controls = ParentalControls {
            break_short_min: 10,
            break_medium_min: 5,
            break_long_min: 20,
        };
        assert!(controls.validate().is_err());
    }

    #[test]
    fn test_zero_base_rejected() {
        let controls = ParentalControls {
            break_short_min: 0,
            break_medium_min: 5,
            break_long_min: 10,
        };
        assert!(controls.validate().is_err());
    }

    #[test]
    fn test_break_state_serializes_tagged() {
        let json = serde_json::to_value(BreakState::Armed {
            reason: BreakReason::DurationRule,
        })
        .unwrap();
        assert_eq!(json["state"], "armed");
        assert_eq!(json["reason"], "duration_rule");
    }
}
