use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::form::{FieldErrors, ProfileForm, RoleChoice, ValidatedProfile};
use crate::workflows::accounts::{
    completion_gate, Destination, Gate, Identity, Navigator, ProfileStore, SessionContext,
    StoreError, UserProfile, UserRole, VisibilitySettings,
};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save your profile. Please try again.";

#[derive(Debug, Default)]
struct FlowState {
    form: ProfileForm,
    field_errors: FieldErrors,
    submitting: bool,
    error_banner: Option<String>,
}

/// Snapshot of everything the completion page renders.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionView {
    pub form: ProfileForm,
    pub field_errors: FieldErrors,
    pub submitting: bool,
    pub show_alumni_fields: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_banner: Option<String>,
}

/// How a submission ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The profile was written and the user routed by role.
    Completed {
        profile: UserProfile,
        destination: Destination,
    },
    /// The page is not available to this session; the user was sent elsewhere.
    Redirected(Destination),
    /// The identity's profile is still being resolved.
    NotReady,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("a profile submission is already in progress")]
    InFlight,
    #[error("profile form is invalid: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One-time onboarding step that turns an authenticated identity into a full profile.
pub struct ProfileCompletionFlow<S> {
    session: Arc<SessionContext<S>>,
    state: Mutex<FlowState>,
}

impl<S> ProfileCompletionFlow<S>
where
    S: ProfileStore + 'static,
{
    /// Start with an empty form, the display name prefilled from the identity provider.
    pub fn new(session: Arc<SessionContext<S>>) -> Self {
        let form = ProfileForm {
            display_name: session
                .identity()
                .and_then(|identity| identity.display_name)
                .unwrap_or_default(),
            ..ProfileForm::default()
        };
        Self::with_form(session, form)
    }

    pub fn with_form(session: Arc<SessionContext<S>>, form: ProfileForm) -> Self {
        Self {
            session,
            state: Mutex::new(FlowState {
                form,
                ..FlowState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> &Arc<SessionContext<S>> {
        &self.session
    }

    /// Evaluate the page gate against the current session and navigate away if needed.
    pub fn gate(&self, navigator: &dyn Navigator) -> Gate {
        let gate = completion_gate(
            self.session.identity().as_ref(),
            &self.session.profile_state(),
        );
        if let Gate::Redirect(destination) = &gate {
            tracing::debug!(path = %destination.path(), "profile completion gate redirect");
            navigator.navigate(destination.clone());
        }
        gate
    }

    pub fn form(&self) -> ProfileForm {
        self.lock().form.clone()
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut ProfileForm)) {
        edit(&mut self.lock().form);
    }

    pub fn set_role(&self, role: RoleChoice) {
        self.lock().form.set_role(role);
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    pub fn error_banner(&self) -> Option<String> {
        self.lock().error_banner.clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().error_banner = None;
    }

    pub fn view(&self) -> CompletionView {
        let state = self.lock();
        CompletionView {
            form: state.form.clone(),
            field_errors: state.field_errors.clone(),
            submitting: state.submitting,
            show_alumni_fields: state.form.shows_alumni_fields(),
            error_banner: state.error_banner.clone(),
        }
    }

    /// Validate, write the profile once, and route by role.
    ///
    /// On a write failure the form is kept intact and a dismissable banner is set
    /// so the user can retry.
    pub async fn submit(&self, navigator: &dyn Navigator) -> Result<SubmitOutcome, CompletionError> {
        let identity = match self.gate(navigator) {
            Gate::Redirect(destination) => return Ok(SubmitOutcome::Redirected(destination)),
            Gate::Wait => return Ok(SubmitOutcome::NotReady),
            Gate::Allow => match self.session.identity() {
                Some(identity) => identity,
                None => return Ok(SubmitOutcome::NotReady),
            },
        };

        let validated = {
            let mut state = self.lock();
            if state.submitting {
                return Err(CompletionError::InFlight);
            }
            match state.form.validate() {
                Ok(validated) => {
                    state.field_errors = FieldErrors::default();
                    state.error_banner = None;
                    state.submitting = true;
                    validated
                }
                Err(errors) => {
                    state.field_errors = errors.clone();
                    return Err(CompletionError::Invalid(errors));
                }
            }
        };

        let profile = build_profile(&identity, validated, Utc::now());
        let result = self
            .session
            .store()
            .write(&profile.uid, profile.clone())
            .await;

        match result {
            Ok(()) => {
                self.lock().submitting = false;
                let destination = destination_for(profile.role);
                tracing::info!(
                    uid = %profile.uid,
                    role = profile.role.as_str(),
                    "profile created"
                );
                self.session.set_profile(profile.clone());
                navigator.navigate(destination.clone());
                Ok(SubmitOutcome::Completed {
                    profile,
                    destination,
                })
            }
            Err(err) => {
                tracing::error!(uid = %profile.uid, error = %err, "failed to save profile");
                let mut state = self.lock();
                state.submitting = false;
                state.error_banner = Some(SAVE_FAILED_MESSAGE.to_string());
                Err(CompletionError::Store(err))
            }
        }
    }
}

/// Where a freshly onboarded user lands.
pub fn destination_for(role: UserRole) -> Destination {
    match role {
        UserRole::Alumni => Destination::PendingVerification,
        UserRole::Student | UserRole::Admin => Destination::Feed,
    }
}

/// Assemble the full profile record written on submission.
pub fn build_profile(
    identity: &Identity,
    validated: ValidatedProfile,
    now: DateTime<Utc>,
) -> UserProfile {
    let role = UserRole::from(validated.role);
    UserProfile {
        uid: identity.uid.clone(),
        email: identity.email.clone().unwrap_or_default(),
        display_name: validated.display_name,
        photo_url: identity.photo_url.clone(),
        role,
        is_verified: role == UserRole::Student,
        department: validated.department,
        batch: validated.batch,
        company: validated.company,
        job_title: validated.job_title,
        bio: validated.bio,
        created_at: now,
        updated_at: now,
        visibility_settings: VisibilitySettings::default(),
    }
}
