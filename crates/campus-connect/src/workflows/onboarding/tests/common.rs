use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::workflows::accounts::{
    Identity, ProfileStore, SessionContext, StoreError, UserId, UserProfile,
};
use crate::workflows::onboarding::{ProfileCompletionFlow, ProfileForm, RoleChoice};

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) records: Mutex<HashMap<UserId, UserProfile>>,
    pub(super) writes: AtomicUsize,
    pub(super) fail_writes: AtomicBool,
}

impl MemoryStore {
    pub(super) fn failing() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub(super) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(super) fn stored(&self, id: &str) -> Option<UserProfile> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(&UserId::new(id))
            .cloned()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<UserProfile>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn write(&self, id: &UserId, profile: UserProfile) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), profile);
        Ok(())
    }

    async fn set_verified(&self, id: &UserId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.is_verified = true;
        Ok(())
    }
}

pub(super) fn identity() -> Identity {
    Identity::new("new-user")
        .with_email("new.user@example.edu")
        .with_display_name("New User")
}

pub(super) fn form(role: RoleChoice) -> ProfileForm {
    ProfileForm {
        display_name: "Priya Raman".to_string(),
        role: Some(role),
        department: "Computer Science".to_string(),
        batch: "2019".to_string(),
        company: "Orbital Labs".to_string(),
        job_title: "Platform Engineer".to_string(),
        bio: "Happy to mentor juniors.".to_string(),
    }
}

pub(super) async fn signed_in_flow(
    store: Arc<MemoryStore>,
    form: ProfileForm,
) -> ProfileCompletionFlow<MemoryStore> {
    let session = Arc::new(SessionContext::new(store));
    session.sign_in(identity()).await.expect("profile resolves");
    ProfileCompletionFlow::with_form(session, form)
}
