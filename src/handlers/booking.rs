use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::{BookingPatch, BookingState};
use crate::services::clients::BookingReceipt;
use crate::services::{persistence, submission};
use crate::state::AppState;

// GET /api/booking/:session
//
// The "page mount" read: loads durable state (running the legacy-key
// migration if needed) and hydrates the in-memory store.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<BookingState>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        persistence::load(&db, &session_id)
    };
    state.store.replace(&session_id, booking.clone());
    Ok(Json(booking))
}

// POST /api/booking/:session
//
// Merge-update: navigation-supplied context (selected service, address,
// captured location) is shallow-merged over the durable state, never a full
// replace, then re-persisted.
pub async fn update_state(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<BookingState>, AppError> {
    let db = state.db.lock().unwrap();
    let current = persistence::load(&db, &session_id);
    state.store.replace(&session_id, current);
    let merged = state.store.update(&session_id, patch);
    persistence::save(&db, &session_id, &merged)?;
    Ok(Json(merged))
}

// POST /api/booking/:session/schedule
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub booked_date: String,
    pub booked_time: String,
}

// Date and time are set as a pair; neither means anything alone.
pub async fn set_schedule(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<BookingState>, AppError> {
    submission::validate_schedule(&body.booked_date, &body.booked_time)?;

    let db = state.db.lock().unwrap();
    let current = persistence::load(&db, &session_id);
    state.store.replace(&session_id, current);
    let merged = state.store.update(
        &session_id,
        BookingPatch {
            booked_date: Some(body.booked_date),
            booked_time: Some(body.booked_time),
            ..Default::default()
        },
    );
    persistence::save(&db, &session_id, &merged)?;
    Ok(Json(merged))
}

// POST /api/booking/:session/flow/service
//
// Entering a direct-service page after browsing a service center: the
// stored provider id is dropped so it cannot leak into the submission.
pub async fn set_service_flow(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<BookingState>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        persistence::set_service_flow(&db, &session_id)?
    };
    state.store.replace(&session_id, booking.clone());
    Ok(Json(booking))
}

// POST /api/booking/:session/flow/provider
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFlowRequest {
    pub provider_id: String,
}

pub async fn set_provider_flow(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<ProviderFlowRequest>,
) -> Result<Json<BookingState>, AppError> {
    let provider_id = body.provider_id.trim();
    if provider_id.is_empty() || provider_id == "null" {
        return Err(AppError::InvalidProvider);
    }

    let booking = {
        let db = state.db.lock().unwrap();
        persistence::set_provider_flow(&db, &session_id, provider_id)?
    };
    state.store.replace(&session_id, booking.clone());
    Ok(Json(booking))
}

// POST /api/booking/:session/submit
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<BookingReceipt>, AppError> {
    let receipt = submission::submit_booking(&state, &session_id).await?;
    Ok(Json(receipt))
}

// GET /api/booking/:session/events — SSE stream of state changes for this
// session, consumed by views that re-render on store updates.
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.store.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.session_id == session_id => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("booking_state")))
        }
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let merged = StreamExt::merge(live_stream, keepalive_stream);

    Sse::new(merged)
}
