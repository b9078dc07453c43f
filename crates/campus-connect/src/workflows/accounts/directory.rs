use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use super::domain::{UserId, UserProfile};
use super::store::{ProfileStore, StoreError};

/// Progress of the user collection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: Vec<UserProfile>,
    status: Option<LoadStatus>,
}

/// In-memory copy of the full user collection.
///
/// The collection is only mutated by a fetch or by a successful verification,
/// and is dropped on sign-out.
#[derive(Debug, Default)]
pub struct UserDirectory {
    state: RwLock<DirectoryState>,
}

impl UserDirectory {
    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> LoadStatus {
        self.read().status.clone().unwrap_or(LoadStatus::Idle)
    }

    pub fn is_loading(&self) -> bool {
        self.status() == LoadStatus::Loading
    }

    pub fn users(&self) -> Vec<UserProfile> {
        self.read().users.clone()
    }

    pub fn len(&self) -> usize {
        self.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().users.is_empty()
    }

    pub fn get(&self, id: &UserId) -> Option<UserProfile> {
        self.read().users.iter().find(|user| &user.uid == id).cloned()
    }

    /// Fetch the full collection, replacing whatever was loaded before.
    pub async fn load<S>(&self, store: &S) -> Result<usize, StoreError>
    where
        S: ProfileStore + ?Sized,
    {
        self.write().status = Some(LoadStatus::Loading);

        match store.fetch_all().await {
            Ok(users) => {
                let count = users.len();
                let mut state = self.write();
                state.users = users;
                state.status = Some(LoadStatus::Ready);
                tracing::info!(count, "user collection loaded");
                Ok(count)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load user collection");
                self.write().status = Some(LoadStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Fetch the collection unless it is loaded or a request is already outstanding.
    pub async fn ensure_loaded<S>(&self, store: &S) -> Result<(), StoreError>
    where
        S: ProfileStore + ?Sized,
    {
        let should_load = {
            let mut state = self.write();
            match state.status {
                Some(LoadStatus::Ready) | Some(LoadStatus::Loading) => false,
                _ => {
                    state.status = Some(LoadStatus::Loading);
                    true
                }
            }
        };

        if should_load {
            self.load(store).await?;
        }
        Ok(())
    }

    /// Flip the verification flag of a loaded record. Returns `false` when the
    /// record is not part of the collection.
    pub fn mark_verified(&self, id: &UserId) -> bool {
        let mut state = self.write();
        match state.users.iter_mut().find(|user| &user.uid == id) {
            Some(user) => {
                user.is_verified = true;
                true
            }
            None => false,
        }
    }

    /// Insert or replace a single record without refetching.
    pub fn upsert(&self, profile: UserProfile) {
        let mut state = self.write();
        match state.users.iter_mut().find(|user| user.uid == profile.uid) {
            Some(existing) => *existing = profile,
            None => state.users.push(profile),
        }
    }

    pub fn reset(&self) {
        let mut state = self.write();
        state.users.clear();
        state.status = None;
    }
}
