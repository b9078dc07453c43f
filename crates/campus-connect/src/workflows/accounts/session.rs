use std::sync::{Arc, PoisonError, RwLock};

use super::directory::UserDirectory;
use super::domain::{Identity, UserProfile};
use super::store::{IdentityProvider, ProfileStore, StoreError};

/// What is known about the signed-in identity's profile record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProfileState {
    #[default]
    Unresolved,
    Missing,
    Loaded(UserProfile),
}

impl ProfileState {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            ProfileState::Loaded(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Per-session state shared by the workflows: who is signed in, their profile,
/// and the user collection loaded on their behalf.
///
/// Sign-in resolves the profile; sign-out tears everything down.
pub struct SessionContext<S> {
    store: Arc<S>,
    identity: RwLock<Option<Identity>>,
    profile: RwLock<ProfileState>,
    directory: Arc<UserDirectory>,
}

impl<S> SessionContext<S>
where
    S: ProfileStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_directory(store, Arc::new(UserDirectory::default()))
    }

    pub fn with_directory(store: Arc<S>, directory: Arc<UserDirectory>) -> Self {
        Self {
            store,
            identity: RwLock::new(None),
            profile: RwLock::new(ProfileState::Unresolved),
            directory,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn directory(&self) -> &Arc<UserDirectory> {
        &self.directory
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn profile_state(&self) -> ProfileState {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attach an identity and resolve its profile record.
    pub async fn sign_in(&self, identity: Identity) -> Result<ProfileState, StoreError> {
        tracing::debug!(uid = %identity.uid, "identity attached to session");
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(identity);
        self.set_profile_state(ProfileState::Unresolved);
        self.refresh_profile().await
    }

    /// Re-read the profile of the current identity from the store.
    pub async fn refresh_profile(&self) -> Result<ProfileState, StoreError> {
        let Some(identity) = self.identity() else {
            self.set_profile_state(ProfileState::Unresolved);
            return Ok(ProfileState::Unresolved);
        };

        let resolved = match self.store.fetch(&identity.uid).await? {
            Some(profile) => ProfileState::Loaded(profile),
            None => ProfileState::Missing,
        };

        // The identity may have signed out while the fetch was outstanding.
        if self.identity().as_ref().map(|current| &current.uid) != Some(&identity.uid) {
            return Ok(self.profile_state());
        }

        self.set_profile_state(resolved.clone());
        Ok(resolved)
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.set_profile_state(ProfileState::Loaded(profile));
    }

    fn set_profile_state(&self, state: ProfileState) {
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Drop the identity, its profile and the loaded user collection.
    pub fn sign_out(&self) {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.set_profile_state(ProfileState::Unresolved);
        self.directory.reset();
        tracing::debug!("session cleared");
    }
}

impl<S> IdentityProvider for SessionContext<S>
where
    S: ProfileStore + 'static,
{
    fn current_identity(&self) -> Option<Identity> {
        self.identity()
    }
}
