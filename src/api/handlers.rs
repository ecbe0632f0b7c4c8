use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{BreakReason, BreakState, DayBucket, ParentalControls, WatchEvent};
use crate::services::{FeedResponse, GuardrailDecision};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub accepted: bool,
    /// True for sub-threshold watches recorded without statistical effect
    pub discarded: bool,
    /// True when this event armed (or re-requested) a break
    pub break_armed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BreakReason>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaybackEndedRequest {
    /// Local hour at which playback ended; defaults to the server clock
    pub hour_of_day: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct PlaybackEndedResponse {
    pub break_started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BreakReason>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Calendar day to report on; defaults to today (UTC)
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DailyStatsResponse {
    pub date: NaiveDate,
    pub watch_secs: f64,
    pub duration_secs: f64,
    pub attention_span_percent: f64,
    pub counted_events: u32,
    pub discarded_events: u32,
}

impl DailyStatsResponse {
    fn from_bucket(date: NaiveDate, bucket: &DayBucket) -> Self {
        Self {
            date,
            watch_secs: bucket.watch_secs,
            duration_secs: bucket.duration_secs,
            attention_span_percent: bucket.attention_span_percent(),
            counted_events: bucket.counted_events,
            discarded_events: bucket.discarded_events,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Ingests one watch event: guardrail evaluation plus profile aggregation.
///
/// Events are validated at the boundary and must arrive in timestamp order
/// per user; an out-of-order event is rejected without touching any state.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<WatchEvent>,
) -> AppResult<Json<IngestResponse>> {
    event
        .validate()
        .map_err(|e| {
            tracing::warn!(user_id = %event.user_id, error = %e, "Rejected malformed event");
            AppError::InvalidInput(e)
        })?;

    let user = state.user(event.user_id).await;
    let mut user = user.write().await;

    if let Some(last) = user.last_event_at {
        if event.recorded_at < last {
            tracing::warn!(
                user_id = %event.user_id,
                event_at = %event.recorded_at,
                last_at = %last,
                "Rejected out-of-order event"
            );
            return Err(AppError::OutOfOrderEvent(format!(
                "event at {} is older than last accepted event at {}",
                event.recorded_at, last
            )));
        }
    }
    user.last_event_at = Some(event.recorded_at);

    // Scheduled daily reset: drop buckets past the retention window. The
    // per-user lock serializes this with the insertion below.
    let cutoff = Utc::now().date_naive() - chrono::Duration::days(state.config.stats_retention_days);
    user.ledger.prune_before(cutoff);

    let decision = state.monitor.evaluate(&mut user.ledger, &event);
    let (break_armed, reason) = match decision {
        GuardrailDecision::ArmBreak(reason) => {
            user.scheduler.arm(reason);
            (true, Some(reason))
        }
        GuardrailDecision::None => (false, None),
    };

    state
        .aggregator
        .record(&mut user.profile, &event, Utc::now());

    Ok(Json(IngestResponse {
        accepted: true,
        discarded: event.is_discarded(),
        break_armed,
        reason,
    }))
}

/// Signals that the currently playing video finished naturally.
///
/// An armed break starts here; with nothing armed this is a no-op, so the
/// playback client may send it unconditionally.
pub async fn playback_ended(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    body: Option<Json<PlaybackEndedRequest>>,
) -> AppResult<Json<PlaybackEndedResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let now = Utc::now();
    let hour_of_day = match request.hour_of_day {
        Some(h) if h > 23 => {
            return Err(AppError::InvalidInput(format!(
                "hour_of_day {} out of range 0-23",
                h
            )))
        }
        Some(h) => h,
        None => now.hour() as u8,
    };

    let user = state.user(user_id).await;
    let mut user = user.write().await;
    let controls = user.controls;

    match user.scheduler.on_video_end(now, hour_of_day, &controls) {
        Some(notification) => Ok(Json(PlaybackEndedResponse {
            break_started: true,
            length_minutes: Some(notification.length_minutes),
            reason: Some(notification.reason),
        })),
        None => Ok(Json(PlaybackEndedResponse {
            break_started: false,
            length_minutes: None,
            reason: None,
        })),
    }
}

/// Ends an elapsed break, returning the user to active viewing.
pub async fn break_elapsed(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<BreakState>> {
    let user = state.user(user_id).await;
    let mut user = user.write().await;
    user.scheduler.on_break_elapsed(Utc::now());
    Ok(Json(user.break_state().clone()))
}

/// Current break state for a user
pub async fn get_break_state(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<BreakState> {
    match state.existing_user(user_id).await {
        Some(user) => Json(user.read().await.break_state().clone()),
        None => Json(BreakState::Active),
    }
}

/// Daily statistics for a user, defaulting to today (UTC).
///
/// Unknown users and untouched days report empty statistics, not 404.
pub async fn get_daily_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> Json<DailyStatsResponse> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let bucket = match state.existing_user(user_id).await {
        Some(user) => user.read().await.ledger.bucket(date).cloned(),
        None => None,
    };

    Json(DailyStatsResponse::from_bucket(
        date,
        &bucket.unwrap_or_default(),
    ))
}

/// Builds the feed for a user from a consistent profile snapshot.
pub async fn get_feed(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<FeedResponse>> {
    // Snapshot under the read lock, then rank and resolve without holding
    // it, so in-flight ingestion is never blocked or observed mid-update.
    let snapshot = match state.existing_user(user_id).await {
        Some(user) => {
            let user = user.read().await;
            state.aggregator.snapshot(&user.profile, Utc::now())
        }
        None => Default::default(),
    };

    let feed = state.feed.assemble(&snapshot).await?;
    Ok(Json(feed))
}

/// Parental break-length configuration for a user
pub async fn get_parental_controls(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<ParentalControls> {
    match state.existing_user(user_id).await {
        Some(user) => Json(user.read().await.controls),
        None => Json(ParentalControls::default()),
    }
}

/// Replaces a user's parental break-length configuration
pub async fn put_parental_controls(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(controls): Json<ParentalControls>,
) -> AppResult<Json<ParentalControls>> {
    controls.validate().map_err(AppError::InvalidInput)?;

    let user = state.user(user_id).await;
    let mut user = user.write().await;
    user.controls = controls;

    tracing::info!(user_id = %user_id, ?controls, "Parental controls updated");
    Ok(Json(controls))
}
