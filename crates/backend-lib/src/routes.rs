// ============================
// crates/backend-lib/src/routes.rs
// ============================
//! HTTP router and presence handlers.
use crate::error::AppError;
use crate::metrics::{PRESENCE_COUNT_READ, PRESENCE_HEARTBEAT, PRESENCE_JOIN, PRESENCE_LEAVE};
use crate::middleware::rate_limit;
use crate::presence::PresenceIntent;
use crate::storage::PresenceStore;
use crate::validation;
use crate::AppState;
use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use glorycast_common::{CountResponse, PresenceRequest};
use metrics::counter;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the presence API router.
///
/// The mutation routes sit behind the rate limiter; the count route does
/// not (it is a cheap cached read polled by every viewer page).
pub fn create_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: PresenceStore + Clone + 'static,
{
    Router::new()
        .route("/api/presence/join", post(join::<S>))
        .route("/api/presence/heartbeat", post(heartbeat::<S>))
        .route("/api/presence/leave", post(leave::<S>))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::<S>))
        .route("/api/presence/{resource_id}/count", get(count::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// POST /api/presence/join — register a viewing session, return the count.
#[tracing::instrument(skip_all, fields(resource_id = %req.resource_id))]
async fn join<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PresenceRequest>,
) -> Result<Json<CountResponse>, AppError>
where
    S: PresenceStore + Clone + 'static,
{
    apply_presence(&state, PresenceIntent::Join, req).await
}

/// POST /api/presence/heartbeat — refresh a viewing session, return the
/// count. 404 for resources that were never joined, unless the resource is
/// configured as auto-creating.
#[tracing::instrument(skip_all, fields(resource_id = %req.resource_id))]
async fn heartbeat<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PresenceRequest>,
) -> Result<Json<CountResponse>, AppError>
where
    S: PresenceStore + Clone + 'static,
{
    apply_presence(&state, PresenceIntent::Heartbeat, req).await
}

/// POST /api/presence/leave — drop a viewing session, return the count.
/// Best-effort from the client; staleness expiry is the backstop when this
/// call never arrives.
#[tracing::instrument(skip_all, fields(resource_id = %req.resource_id))]
async fn leave<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PresenceRequest>,
) -> Result<Json<CountResponse>, AppError>
where
    S: PresenceStore + Clone + 'static,
{
    apply_presence(&state, PresenceIntent::Leave, req).await
}

/// GET /api/presence/{resource_id}/count — the count as of the last
/// mutation, 0 for unknown resources.
///
/// Deliberately a cached read: no staleness filtering happens here, so the
/// value can lag behind the viewer map until the next join/heartbeat/leave
/// recomputes it.
#[tracing::instrument(skip_all, fields(resource_id = %resource_id))]
async fn count<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(resource_id): Path<String>,
) -> Result<Json<CountResponse>, AppError>
where
    S: PresenceStore + Clone + 'static,
{
    validation::validate_resource_id(&resource_id)?;

    let active_count = state
        .store
        .load_record(&resource_id)
        .await?
        .map_or(0, |record| record.active_count);

    counter!(PRESENCE_COUNT_READ).increment(1);

    Ok(Json(CountResponse { active_count }))
}

async fn apply_presence<S>(
    state: &AppState<S>,
    intent: PresenceIntent,
    req: PresenceRequest,
) -> Result<Json<CountResponse>, AppError>
where
    S: PresenceStore + Clone + 'static,
{
    // Reject before touching storage
    validation::validate_resource_id(&req.resource_id)?;
    validation::validate_viewer_id(&req.viewer_id)?;

    let presence_settings = &state.settings.presence;
    let auto_create = presence_settings
        .auto_create_resources
        .iter()
        .any(|id| id == &req.resource_id);

    let handle = state.presence.handle(
        &req.resource_id,
        &state.store,
        auto_create,
        presence_settings.staleness_threshold_ms,
    );

    let active_count = handle.apply(intent, req.viewer_id, Utc::now()).await?;

    // Update metrics
    let key = match intent {
        PresenceIntent::Join => PRESENCE_JOIN,
        PresenceIntent::Heartbeat => PRESENCE_HEARTBEAT,
        PresenceIntent::Leave => PRESENCE_LEAVE,
    };
    counter!(key).increment(1);

    Ok(Json(CountResponse { active_count }))
}
