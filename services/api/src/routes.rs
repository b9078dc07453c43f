use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use campus_connect::workflows::accounts::ProfileStore;
use campus_connect::workflows::moderation::moderation_router;
use campus_connect::workflows::onboarding::onboarding_router;
use campus_connect::workflows::Portal;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Both workflow routers over one portal, plus the operational endpoints.
pub(crate) fn with_portal_routes<S>(portal: Arc<Portal<S>>) -> Router
where
    S: ProfileStore + 'static,
{
    onboarding_router(portal.clone())
        .merge(moderation_router(portal))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
