use async_trait::async_trait;
use campus_connect::config::DirectoryConfig;
use campus_connect::workflows::accounts::{
    load_profiles, ProfileStore, SeedError, StoreError, UserId, UserProfile,
};
use chrono::{NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Profile documents keyed by user id, held for the life of the process.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    records: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl InMemoryProfileStore {
    pub(crate) fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let store = Self::default();
        for profile in profiles {
            store.insert(profile);
        }
        store
    }

    /// Build the store from the configured seed file, or empty when none is set.
    pub(crate) fn from_config(config: &DirectoryConfig) -> Result<Self, SeedError> {
        let Some(path) = config.seed_path.as_ref() else {
            return Ok(Self::default());
        };
        let profiles = load_profiles(path)?;
        info!(path = %path.display(), count = profiles.len(), "seeded profile store");
        Ok(Self::with_profiles(profiles))
    }

    pub(crate) fn insert(&self, profile: UserProfile) {
        self.guard().insert(profile.uid.clone(), profile);
    }

    pub(crate) fn len(&self) -> usize {
        self.guard().len()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<UserId, UserProfile>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_all(&self) -> Result<Vec<UserProfile>, StoreError> {
        let mut users: Vec<UserProfile> = self.guard().values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.uid.cmp(&b.uid)));
        Ok(users)
    }

    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.guard().get(id).cloned())
    }

    async fn write(&self, id: &UserId, profile: UserProfile) -> Result<(), StoreError> {
        if &profile.uid != id {
            return Err(StoreError::Rejected(format!(
                "document key {id} does not match profile uid {}",
                profile.uid
            )));
        }
        self.guard().insert(id.clone(), profile);
        Ok(())
    }

    async fn set_verified(&self, id: &UserId) -> Result<(), StoreError> {
        let mut guard = self.guard();
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.is_verified = true;
        record.updated_at = Utc::now();
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
