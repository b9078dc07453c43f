use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::common::*;
use crate::workflows::accounts::{
    Destination, Identity, NavigationLog, ProfileStore, SessionContext, StoreError, UserId,
    UserProfile, UserRole,
};
use crate::workflows::onboarding::{
    CompletionError, ProfileCompletionFlow, ProfileField, ProfileForm, RoleChoice, SubmitOutcome,
    SAVE_FAILED_MESSAGE,
};

#[tokio::test]
async fn student_submission_is_verified_and_routed_to_feed() {
    let store = Arc::new(MemoryStore::default());
    let flow = signed_in_flow(store.clone(), form(RoleChoice::Student)).await;
    let navigation = NavigationLog::default();

    let outcome = flow.submit(&navigation).await.expect("submission succeeds");

    let (profile, destination) = match outcome {
        SubmitOutcome::Completed {
            profile,
            destination,
        } => (profile, destination),
        other => panic!("expected completed submission, got {other:?}"),
    };
    assert_eq!(destination, Destination::Feed);
    assert_eq!(navigation.last(), Some(Destination::Feed));
    assert_eq!(profile.role, UserRole::Student);
    assert!(profile.is_verified);
    assert_eq!(profile.created_at, profile.updated_at);
    assert_eq!(profile.email, "new.user@example.edu");
    assert_eq!(profile.company, None, "company is alumni-only");

    let stored = store.stored("new-user").expect("record written");
    assert_eq!(stored, profile);
    assert_eq!(store.write_count(), 1);
    assert_eq!(flow.session().profile_state().profile(), Some(&profile));
}

#[tokio::test]
async fn alumni_submission_waits_for_verification() {
    let store = Arc::new(MemoryStore::default());
    let flow = signed_in_flow(store.clone(), form(RoleChoice::Alumni)).await;
    let navigation = NavigationLog::default();

    let outcome = flow.submit(&navigation).await.expect("submission succeeds");

    match outcome {
        SubmitOutcome::Completed {
            profile,
            destination,
        } => {
            assert_eq!(destination, Destination::PendingVerification);
            assert!(!profile.is_verified);
            assert_eq!(profile.company.as_deref(), Some("Orbital Labs"));
            assert_eq!(profile.job_title.as_deref(), Some("Platform Engineer"));
        }
        other => panic!("expected completed submission, got {other:?}"),
    }
    assert_eq!(
        navigation.history(),
        vec![Destination::PendingVerification]
    );
}

#[tokio::test]
async fn invalid_form_blocks_the_write_and_keeps_field_errors() {
    let store = Arc::new(MemoryStore::default());
    let flow = signed_in_flow(
        store.clone(),
        ProfileForm {
            display_name: " J ".to_string(),
            ..ProfileForm::default()
        },
    )
    .await;
    let navigation = NavigationLog::default();

    match flow.submit(&navigation).await {
        Err(CompletionError::Invalid(errors)) => {
            assert!(errors.get(ProfileField::DisplayName).is_some());
            assert!(errors.get(ProfileField::Role).is_some());
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    assert_eq!(store.write_count(), 0);
    assert!(navigation.is_empty());
    let view = flow.view();
    assert_eq!(view.field_errors.len(), 2);
    assert!(!view.submitting);
}

#[tokio::test]
async fn write_failure_sets_banner_and_allows_retry_with_same_input() {
    let store = Arc::new(MemoryStore::failing());
    let flow = signed_in_flow(store.clone(), form(RoleChoice::Alumni)).await;
    let navigation = NavigationLog::default();

    match flow.submit(&navigation).await {
        Err(CompletionError::Store(StoreError::Unavailable(_))) => {}
        other => panic!("expected store failure, got {other:?}"),
    }

    assert!(!flow.is_submitting());
    assert_eq!(flow.error_banner().as_deref(), Some(SAVE_FAILED_MESSAGE));
    assert_eq!(flow.form(), form(RoleChoice::Alumni));
    assert!(navigation.is_empty());

    flow.dismiss_error();
    assert!(flow.error_banner().is_none());

    store
        .fail_writes
        .store(false, std::sync::atomic::Ordering::SeqCst);
    let outcome = flow.submit(&navigation).await.expect("retry succeeds");
    assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn unauthenticated_sessions_are_sent_to_login() {
    let store = Arc::new(MemoryStore::default());
    let session = Arc::new(SessionContext::new(store.clone()));
    let flow = ProfileCompletionFlow::with_form(session, form(RoleChoice::Student));
    let navigation = NavigationLog::default();

    let outcome = flow.submit(&navigation).await.expect("redirect is not an error");

    assert_eq!(outcome, SubmitOutcome::Redirected(Destination::Login));
    assert_eq!(navigation.last(), Some(Destination::Login));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn existing_profile_redirects_to_feed_and_gate_reacts_to_changes() {
    let store = Arc::new(MemoryStore::default());
    let flow = signed_in_flow(store.clone(), form(RoleChoice::Student)).await;
    let navigation = NavigationLog::default();
    assert!(flow.gate(&navigation).is_allowed());

    flow.submit(&navigation).await.expect("first submission");

    let again = flow.submit(&navigation).await.expect("redirect");
    assert_eq!(again, SubmitOutcome::Redirected(Destination::Feed));
    assert_eq!(store.write_count(), 1, "a profile is created exactly once");

    flow.session().sign_out();
    assert_eq!(
        flow.gate(&navigation).redirect(),
        Some(&Destination::Login)
    );
}

#[tokio::test]
async fn changing_role_keeps_alumni_inputs_in_the_form() {
    let store = Arc::new(MemoryStore::default());
    let flow = signed_in_flow(store, form(RoleChoice::Alumni)).await;

    flow.set_role(RoleChoice::Student);
    let view = flow.view();
    assert!(!view.show_alumni_fields);
    assert_eq!(view.form.company, "Orbital Labs");

    flow.update_form(|form| form.display_name = "Priya R.".to_string());
    assert_eq!(flow.form().display_name, "Priya R.");
}

#[tokio::test]
async fn fresh_form_starts_from_the_provider_display_name() {
    let store = Arc::new(MemoryStore::default());
    let session = Arc::new(SessionContext::new(store.clone()));
    session.sign_in(identity()).await.expect("profile resolves");

    let flow = ProfileCompletionFlow::new(session);
    assert_eq!(flow.form().display_name, "New User");
    assert_eq!(flow.form().role, None);

    let anonymous = ProfileCompletionFlow::new(Arc::new(SessionContext::new(store)));
    assert_eq!(anonymous.form().display_name, "");
}

struct HeldWriteStore {
    release: Notify,
    inner: MemoryStore,
}

#[async_trait]
impl ProfileStore for HeldWriteStore {
    async fn fetch_all(&self) -> Result<Vec<UserProfile>, StoreError> {
        self.inner.fetch_all().await
    }

    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        self.inner.fetch(id).await
    }

    async fn write(&self, id: &UserId, profile: UserProfile) -> Result<(), StoreError> {
        self.release.notified().await;
        self.inner.write(id, profile).await
    }

    async fn set_verified(&self, id: &UserId) -> Result<(), StoreError> {
        self.inner.set_verified(id).await
    }
}

#[tokio::test]
async fn duplicate_submission_is_rejected_while_write_is_in_flight() {
    let store = Arc::new(HeldWriteStore {
        release: Notify::new(),
        inner: MemoryStore::default(),
    });
    let session = Arc::new(SessionContext::new(store.clone()));
    session
        .sign_in(Identity::new("new-user"))
        .await
        .expect("resolves");
    let flow = Arc::new(ProfileCompletionFlow::with_form(
        session,
        form(RoleChoice::Student),
    ));
    let navigation = Arc::new(NavigationLog::default());

    let first = {
        let flow = flow.clone();
        let navigation = navigation.clone();
        tokio::spawn(async move { flow.submit(navigation.as_ref()).await })
    };

    while !flow.is_submitting() {
        tokio::task::yield_now().await;
    }
    assert!(flow.view().submitting);

    match flow.submit(navigation.as_ref()).await {
        Err(CompletionError::InFlight) => {}
        other => panic!("expected in-flight rejection, got {other:?}"),
    }

    store.release.notify_one();
    let outcome = first.await.expect("task joins").expect("first submission");
    assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
    assert_eq!(store.inner.write_count(), 1);
    assert!(!flow.is_submitting());
}
