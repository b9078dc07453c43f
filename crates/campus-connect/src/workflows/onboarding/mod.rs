//! Profile completion: role selection, validation, the single profile write,
//! and role-based routing afterwards.

pub mod flow;
pub mod form;
pub mod router;

#[cfg(test)]
mod tests;

pub use flow::{
    build_profile, destination_for, CompletionError, CompletionView, ProfileCompletionFlow,
    SubmitOutcome, SAVE_FAILED_MESSAGE,
};
pub use form::{FieldErrors, ProfileField, ProfileForm, RoleChoice, ValidatedProfile};
pub use router::onboarding_router;
