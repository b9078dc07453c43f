use async_trait::async_trait;

use super::domain::{Identity, UserId, UserProfile};

/// Document-store abstraction for profile records.
///
/// Every call is a single remote attempt; callers decide what a failure means
/// for the interaction that triggered it.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<UserProfile>, StoreError>;
    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;
    async fn write(&self, id: &UserId, profile: UserProfile) -> Result<(), StoreError>;
    async fn set_verified(&self, id: &UserId) -> Result<(), StoreError>;
}

/// Error enumeration for profile store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("profile not found")]
    NotFound,
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
    #[error("profile store rejected the write: {0}")]
    Rejected(String),
}

/// Source of the currently authenticated principal, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}
