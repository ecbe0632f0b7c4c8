use crate::models::{BreakReason, DailyLedger, WatchEvent};

/// Attention span threshold below which Rule A may fire, percent
const LOW_ENGAGEMENT_PERCENT: f64 = 25.0;
/// Session time after which Rule A may fire, seconds (8 minutes)
const LOW_ENGAGEMENT_SESSION_SECS: f64 = 8.0 * 60.0;
/// Hard session cap for Rule B, seconds (20 minutes)
const SESSION_CAP_SECS: f64 = 20.0 * 60.0;

/// Outcome of running the guardrail rules over one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailDecision {
    None,
    ArmBreak(BreakReason),
}

/// Evaluates break-trigger rules over per-day viewing statistics.
///
/// Stateless: all temporal state lives in the caller-owned [`DailyLedger`].
/// The monitor never activates a break itself; arming is delegated to the
/// break scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardrailMonitor;

impl GuardrailMonitor {
    pub fn new() -> Self {
        Self
    }

    /// Processes one watch event against the user's daily ledger.
    ///
    /// Sub-threshold watches are recorded but update no statistics and can
    /// never trigger a rule. Both rules are evaluated on every counted
    /// event; when both fire the low-engagement reason wins (scheduler
    /// arming is idempotent, so only the first reason sticks anyway).
    pub fn evaluate(&self, ledger: &mut DailyLedger, event: &WatchEvent) -> GuardrailDecision {
        if event.is_discarded() {
            ledger.record_discarded(event);
            return GuardrailDecision::None;
        }

        let bucket = ledger.record(event);
        let attention_percent = bucket.attention_span_percent();
        let session_secs = event.session_watch_time_secs;

        if attention_percent < LOW_ENGAGEMENT_PERCENT && session_secs > LOW_ENGAGEMENT_SESSION_SECS
        {
            tracing::info!(
                user_id = %event.user_id,
                attention_percent,
                session_secs,
                "Low-engagement rule fired"
            );
            return GuardrailDecision::ArmBreak(BreakReason::AttentionRule);
        }

        if session_secs > SESSION_CAP_SECS {
            tracing::info!(
                user_id = %event.user_id,
                session_secs,
                "Session-cap rule fired"
            );
            return GuardrailDecision::ArmBreak(BreakReason::DurationRule);
        }

        GuardrailDecision::None
    }
}
