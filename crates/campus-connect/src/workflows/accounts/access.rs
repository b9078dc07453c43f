//! Page gating rules shared by both workflows.
//!
//! The checks are pure functions of the current identity and profile state so
//! callers can re-run them whenever either changes.

use serde::Serialize;

use super::domain::Identity;
use super::navigation::Destination;
use super::session::ProfileState;

/// Result of evaluating a gate for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "gate", content = "destination", rename_all = "snake_case")]
pub enum Gate {
    /// Protected content may render.
    Allow,
    /// Identity is known but its profile is still being resolved; render nothing.
    Wait,
    /// Leave the page silently.
    Redirect(Destination),
}

impl Gate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Gate::Allow)
    }

    pub fn redirect(&self) -> Option<&Destination> {
        match self {
            Gate::Redirect(destination) => Some(destination),
            _ => None,
        }
    }
}

/// Gate for the profile-completion page: only identities without a profile stay.
pub fn completion_gate(identity: Option<&Identity>, profile: &ProfileState) -> Gate {
    if identity.is_none() {
        return Gate::Redirect(Destination::Login);
    }

    match profile {
        ProfileState::Unresolved => Gate::Wait,
        ProfileState::Missing => Gate::Allow,
        ProfileState::Loaded(_) => Gate::Redirect(Destination::Feed),
    }
}

/// Gate for the admin dashboard: only identities whose profile has the admin role stay.
pub fn admin_gate(identity: Option<&Identity>, profile: &ProfileState) -> Gate {
    if identity.is_none() {
        return Gate::Redirect(Destination::Login);
    }

    match profile {
        ProfileState::Unresolved => Gate::Wait,
        ProfileState::Loaded(profile) if profile.is_admin() => Gate::Allow,
        ProfileState::Loaded(_) | ProfileState::Missing => Gate::Redirect(Destination::Feed),
    }
}
