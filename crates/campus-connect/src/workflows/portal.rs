//! Process-wide composition of the store, the user collection and the
//! moderation dashboard, plus the HTTP plumbing shared by both routers.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::accounts::{
    Destination, Identity, ProfileStore, SessionContext, StoreError, UserDirectory, UserId,
};
use super::moderation::ModerationDashboard;

pub const IDENTITY_UID_HEADER: &str = "x-identity-uid";
pub const IDENTITY_EMAIL_HEADER: &str = "x-identity-email";
pub const IDENTITY_NAME_HEADER: &str = "x-identity-name";
pub const IDENTITY_PHOTO_HEADER: &str = "x-identity-photo";

pub struct Portal<S> {
    store: Arc<S>,
    directory: Arc<UserDirectory>,
    dashboard: ModerationDashboard<S>,
    submissions: Arc<Mutex<BTreeSet<UserId>>>,
}

/// Exclusive right to create one account's profile. Released on drop.
#[derive(Debug)]
pub struct SubmissionClaim {
    uid: UserId,
    submissions: Arc<Mutex<BTreeSet<UserId>>>,
}

impl SubmissionClaim {
    pub fn uid(&self) -> &UserId {
        &self.uid
    }
}

impl Drop for SubmissionClaim {
    fn drop(&mut self) {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.uid);
    }
}

impl<S> Portal<S>
where
    S: ProfileStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let directory = Arc::new(UserDirectory::default());
        let dashboard = ModerationDashboard::new(store.clone(), directory.clone());
        Self {
            store,
            directory,
            dashboard,
            submissions: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn directory(&self) -> &Arc<UserDirectory> {
        &self.directory
    }

    pub fn dashboard(&self) -> &ModerationDashboard<S> {
        &self.dashboard
    }

    /// Claim the profile submission for an account, or `None` when another
    /// request for the same account is still writing.
    pub fn claim_submission(&self, uid: &UserId) -> Option<SubmissionClaim> {
        let mut submissions = self.submissions.lock().unwrap_or_else(PoisonError::into_inner);
        if !submissions.insert(uid.clone()) {
            return None;
        }
        Some(SubmissionClaim {
            uid: uid.clone(),
            submissions: self.submissions.clone(),
        })
    }

    pub fn is_submitting(&self, uid: &UserId) -> bool {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(uid)
    }

    /// Build a session for a request identity with its profile already resolved.
    pub async fn session_for(
        &self,
        identity: Option<Identity>,
    ) -> Result<SessionContext<S>, StoreError> {
        let session = SessionContext::with_directory(self.store.clone(), self.directory.clone());
        if let Some(identity) = identity {
            session.sign_in(identity).await?;
        }
        Ok(session)
    }
}

/// Read the authenticated identity forwarded by the identity provider.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let uid = text(IDENTITY_UID_HEADER)?;
    Some(Identity {
        uid: UserId::new(uid),
        email: text(IDENTITY_EMAIL_HEADER),
        display_name: text(IDENTITY_NAME_HEADER),
        photo_url: text(IDENTITY_PHOTO_HEADER),
    })
}

pub(crate) fn redirect_response(destination: &Destination) -> Response {
    let path = destination.path();
    let mut response = (
        StatusCode::SEE_OTHER,
        Json(json!({ "redirect_to": path })),
    )
        .into_response();
    if let Ok(location) = HeaderValue::from_str(&path) {
        response.headers_mut().insert(header::LOCATION, location);
    }
    response
}

pub(crate) fn profile_pending_response() -> Response {
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "resolving_profile" })),
    )
        .into_response()
}

pub(crate) fn store_failure_response(message: &str) -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": message }))).into_response()
}
