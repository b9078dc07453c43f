use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::flow::{CompletionError, ProfileCompletionFlow, SubmitOutcome, SAVE_FAILED_MESSAGE};
use super::form::ProfileForm;
use crate::workflows::accounts::{Gate, LoadStatus, NavigationLog, ProfileStore};
use crate::workflows::portal::{
    identity_from_headers, profile_pending_response, redirect_response, store_failure_response,
    Portal,
};

/// Router builder exposing the profile completion page and its submission.
pub fn onboarding_router<S>(portal: Arc<Portal<S>>) -> Router
where
    S: ProfileStore + 'static,
{
    Router::new()
        .route("/api/v1/onboarding", get(gate_handler::<S>))
        .route("/api/v1/onboarding/profile", post(submit_handler::<S>))
        .with_state(portal)
}

pub(crate) async fn gate_handler<S>(
    State(portal): State<Arc<Portal<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ProfileStore + 'static,
{
    let session = match portal.session_for(identity_from_headers(&headers)).await {
        Ok(session) => Arc::new(session),
        Err(err) => return store_failure_response(&err.to_string()),
    };

    let flow = ProfileCompletionFlow::new(session);
    let navigation = NavigationLog::default();
    match flow.gate(&navigation) {
        Gate::Allow => (StatusCode::OK, Json(flow.view())).into_response(),
        Gate::Wait => profile_pending_response(),
        Gate::Redirect(destination) => redirect_response(&destination),
    }
}

pub(crate) async fn submit_handler<S>(
    State(portal): State<Arc<Portal<S>>>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> Response
where
    S: ProfileStore + 'static,
{
    let identity = identity_from_headers(&headers);

    // Claimed before the profile is resolved so a request that waited on another
    // submission for the same account sees the record that one wrote.
    let _claim = match identity.as_ref() {
        Some(identity) => match portal.claim_submission(&identity.uid) {
            Some(claim) => Some(claim),
            None => return in_flight_response(),
        },
        None => None,
    };

    let session = match portal.session_for(identity).await {
        Ok(session) => Arc::new(session),
        Err(err) => return store_failure_response(&err.to_string()),
    };

    let flow = ProfileCompletionFlow::with_form(session, form);
    let navigation = NavigationLog::default();
    match flow.submit(&navigation).await {
        Ok(SubmitOutcome::Completed {
            profile,
            destination,
        }) => {
            // Keep an already-loaded admin collection in step with the new record.
            if portal.directory().status() == LoadStatus::Ready {
                portal.directory().upsert(profile);
            }
            redirect_response(&destination)
        }
        Ok(SubmitOutcome::Redirected(destination)) => redirect_response(&destination),
        Ok(SubmitOutcome::NotReady) => profile_pending_response(),
        Err(CompletionError::Invalid(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response(),
        Err(CompletionError::InFlight) => in_flight_response(),
        Err(CompletionError::Store(_)) => store_failure_response(SAVE_FAILED_MESSAGE),
    }
}

fn in_flight_response() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({ "error": CompletionError::InFlight.to_string() })),
    )
        .into_response()
}
