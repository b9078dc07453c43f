use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::dashboard::ModerationError;
use crate::workflows::accounts::{Gate, NavigationLog, ProfileStore, UserId};
use crate::workflows::portal::{
    identity_from_headers, profile_pending_response, redirect_response, store_failure_response,
    Portal,
};

/// Router builder exposing the admin dashboard and the per-record actions.
pub fn moderation_router<S>(portal: Arc<Portal<S>>) -> Router
where
    S: ProfileStore + 'static,
{
    Router::new()
        .route("/api/v1/admin/dashboard", get(dashboard_handler::<S>))
        .route("/api/v1/admin/users/refresh", post(refresh_handler::<S>))
        .route(
            "/api/v1/admin/users/:uid/verify",
            post(verify_handler::<S>),
        )
        .route(
            "/api/v1/admin/users/:uid/reject",
            post(reject_handler::<S>),
        )
        .with_state(portal)
}

/// Resolve the request identity and run the admin gate, returning the
/// response to send when the page is not available.
async fn admit<S>(portal: &Portal<S>, headers: &HeaderMap) -> Result<(), Response>
where
    S: ProfileStore + 'static,
{
    let session = portal
        .session_for(identity_from_headers(headers))
        .await
        .map_err(|err| store_failure_response(&err.to_string()))?;

    let navigation = NavigationLog::default();
    match portal.dashboard().mount(&session, &navigation).await {
        Gate::Allow => Ok(()),
        Gate::Wait => Err(profile_pending_response()),
        Gate::Redirect(destination) => Err(redirect_response(&destination)),
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(portal): State<Arc<Portal<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ProfileStore + 'static,
{
    if let Err(response) = admit(&portal, &headers).await {
        return response;
    }
    (StatusCode::OK, Json(portal.dashboard().view())).into_response()
}

pub(crate) async fn refresh_handler<S>(
    State(portal): State<Arc<Portal<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ProfileStore + 'static,
{
    if let Err(response) = admit(&portal, &headers).await {
        return response;
    }
    match portal.dashboard().refresh().await {
        Ok(count) => (StatusCode::OK, Json(json!({ "users": count }))).into_response(),
        Err(err) => store_failure_response(&err.to_string()),
    }
}

pub(crate) async fn verify_handler<S>(
    State(portal): State<Arc<Portal<S>>>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Response
where
    S: ProfileStore + 'static,
{
    if let Err(response) = admit(&portal, &headers).await {
        return response;
    }

    let id = UserId::new(uid);
    match portal.dashboard().verify(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "uid": id,
                "status": "verified",
                "pending": portal.dashboard().pending().len(),
            })),
        )
            .into_response(),
        Err(err @ ModerationError::NotPending(_)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))).into_response()
        }
        Err(ModerationError::Loading) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "loading_users" })),
        )
            .into_response(),
        Err(err @ ModerationError::InFlight(_)) => {
            (StatusCode::CONFLICT, Json(json!({ "error": err.to_string() }))).into_response()
        }
        Err(err) => store_failure_response(&err.to_string()),
    }
}

pub(crate) async fn reject_handler<S>(
    State(portal): State<Arc<Portal<S>>>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Response
where
    S: ProfileStore + 'static,
{
    if let Err(response) = admit(&portal, &headers).await {
        return response;
    }

    match portal.dashboard().reject(&UserId::new(uid)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => (
            StatusCode::NOT_IMPLEMENTED,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}
