use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use crate::workflows::accounts::{
    Identity, ProfileStore, SessionContext, StoreError, UserDirectory, UserId, UserProfile,
    UserRole, VisibilitySettings,
};
use crate::workflows::moderation::ModerationDashboard;

pub(super) fn joined(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn profile(uid: &str, role: UserRole, is_verified: bool) -> UserProfile {
    let created = joined(2025, 3, 7);
    UserProfile {
        uid: UserId::new(uid),
        email: format!("{uid}@example.edu"),
        display_name: format!("user {uid}"),
        photo_url: None,
        role,
        is_verified,
        department: None,
        batch: None,
        company: None,
        job_title: None,
        bio: None,
        created_at: created,
        updated_at: created,
        visibility_settings: VisibilitySettings::default(),
    }
}

pub(super) fn community() -> Vec<UserProfile> {
    vec![
        profile("admin-1", UserRole::Admin, true),
        profile("s1", UserRole::Student, true),
        profile("a1", UserRole::Alumni, false),
        profile("a2", UserRole::Alumni, false),
        profile("a3", UserRole::Alumni, true),
    ]
}

/// Store double whose verification writes can be held, failed, or counted per record.
#[derive(Default)]
pub(super) struct ScriptedStore {
    records: Mutex<BTreeMap<UserId, UserProfile>>,
    held: Mutex<HashSet<UserId>>,
    failing: Mutex<HashSet<UserId>>,
    hold_fetch: AtomicBool,
    pub(super) release: Notify,
    pub(super) fetches: AtomicUsize,
    pub(super) verify_calls: AtomicUsize,
}

impl ScriptedStore {
    pub(super) fn with(users: Vec<UserProfile>) -> Self {
        let store = Self::default();
        {
            let mut records = store.records.lock().expect("store mutex poisoned");
            for user in users {
                records.insert(user.uid.clone(), user);
            }
        }
        store
    }

    pub(super) fn hold(&self, uid: &str) {
        self.held
            .lock()
            .expect("store mutex poisoned")
            .insert(UserId::new(uid));
    }

    pub(super) fn unhold(&self, uid: &str) {
        self.held
            .lock()
            .expect("store mutex poisoned")
            .remove(&UserId::new(uid));
    }

    pub(super) fn hold_fetch(&self) {
        self.hold_fetch.store(true, Ordering::SeqCst);
    }

    pub(super) fn fail(&self, uid: &str) {
        self.failing
            .lock()
            .expect("store mutex poisoned")
            .insert(UserId::new(uid));
    }

    pub(super) fn record(&self, uid: &str) -> Option<UserProfile> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(&UserId::new(uid))
            .cloned()
    }
}

#[async_trait]
impl ProfileStore for ScriptedStore {
    async fn fetch_all(&self) -> Result<Vec<UserProfile>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.hold_fetch.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.records.lock().expect("store mutex poisoned").get(id).cloned())
    }

    async fn write(&self, id: &UserId, profile: UserProfile) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), profile);
        Ok(())
    }

    async fn set_verified(&self, id: &UserId) -> Result<(), StoreError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let held = self.held.lock().expect("store mutex poisoned").contains(id);
        if held {
            self.release.notified().await;
        }
        if self.failing.lock().expect("store mutex poisoned").contains(id) {
            return Err(StoreError::Unavailable("permission denied".to_string()));
        }
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.is_verified = true;
        Ok(())
    }
}

pub(super) struct Fixture {
    pub(super) store: Arc<ScriptedStore>,
    pub(super) dashboard: Arc<ModerationDashboard<ScriptedStore>>,
    pub(super) session: SessionContext<ScriptedStore>,
}

pub(super) async fn fixture(users: Vec<UserProfile>, signed_in_as: Option<&str>) -> Fixture {
    let store = Arc::new(ScriptedStore::with(users));
    let directory = Arc::new(UserDirectory::default());
    let dashboard = Arc::new(ModerationDashboard::new(store.clone(), directory.clone()));
    let session = SessionContext::with_directory(store.clone(), directory);
    if let Some(uid) = signed_in_as {
        session
            .sign_in(Identity::new(uid))
            .await
            .expect("profile resolves");
    }
    Fixture {
        store,
        dashboard,
        session,
    }
}

pub(super) fn uid(value: &str) -> UserId {
    UserId::new(value)
}
