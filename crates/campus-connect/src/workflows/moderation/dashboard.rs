use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};

use super::analytics::OverviewStats;
use super::views::{DashboardView, PendingAlumnusCard, TabContent, UserListingEntry};
use crate::workflows::accounts::{
    admin_gate, Gate, Navigator, ProfileStore, SessionContext, StoreError, UserDirectory, UserId,
    UserProfile,
};

/// Alumni records waiting for approval, derived from the given collection.
pub fn pending_alumni(users: &[UserProfile]) -> Vec<UserProfile> {
    users
        .iter()
        .filter(|user| user.is_pending_alumnus())
        .cloned()
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("verification for {0} is already in progress")]
    InFlight(UserId),
    #[error("{0} is not awaiting verification")]
    NotPending(UserId),
    #[error("the user collection is still loading")]
    Loading,
    #[error("rejecting alumni accounts is not supported")]
    RejectUnsupported,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Admin dashboard over the shared user collection.
///
/// Verification progress is tracked per record so approving one alumnus never
/// blocks the controls of another.
pub struct ModerationDashboard<S> {
    store: Arc<S>,
    directory: Arc<UserDirectory>,
    verifying: Mutex<BTreeSet<UserId>>,
}

impl<S> ModerationDashboard<S>
where
    S: ProfileStore + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<UserDirectory>) -> Self {
        Self {
            store,
            directory,
            verifying: Mutex::new(BTreeSet::new()),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, BTreeSet<UserId>> {
        self.verifying.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn directory(&self) -> &Arc<UserDirectory> {
        &self.directory
    }

    /// Gate the page for the session and request the collection once when allowed.
    ///
    /// A failed load is logged and reflected in the directory status; the gate
    /// result is returned either way.
    pub async fn mount(&self, session: &SessionContext<S>, navigator: &dyn Navigator) -> Gate {
        let gate = admin_gate(session.identity().as_ref(), &session.profile_state());
        match &gate {
            Gate::Redirect(destination) => {
                tracing::debug!(path = %destination.path(), "admin gate redirect");
                navigator.navigate(destination.clone());
            }
            Gate::Wait => {}
            Gate::Allow => {
                if let Err(err) = self.directory.ensure_loaded(self.store.as_ref()).await {
                    tracing::warn!(error = %err, "dashboard opened without user collection");
                }
            }
        }
        gate
    }

    /// User-initiated reload of the collection.
    pub async fn refresh(&self) -> Result<usize, ModerationError> {
        Ok(self.directory.load(self.store.as_ref()).await?)
    }

    pub fn users(&self) -> Vec<UserProfile> {
        self.directory.users()
    }

    pub fn pending(&self) -> Vec<UserProfile> {
        pending_alumni(&self.directory.users())
    }

    pub fn is_verifying(&self, id: &UserId) -> bool {
        self.in_flight().contains(id)
    }

    pub fn verifying(&self) -> BTreeSet<UserId> {
        self.in_flight().clone()
    }

    /// Approve a pending alumnus.
    ///
    /// On success the record's flag flips in the collection, so it drops out of
    /// the pending view. On failure it stays pending. The record's busy state is
    /// cleared in both cases, and only after the collection reflects the outcome.
    pub async fn verify(&self, id: &UserId) -> Result<(), ModerationError> {
        {
            // Lock order: in-flight set, then the collection.
            let mut verifying = self.in_flight();
            if verifying.contains(id) {
                return Err(ModerationError::InFlight(id.clone()));
            }
            if self.directory.is_loading() {
                return Err(ModerationError::Loading);
            }
            let is_pending = self
                .directory
                .get(id)
                .map(|user| user.is_pending_alumnus())
                .unwrap_or(false);
            if !is_pending {
                return Err(ModerationError::NotPending(id.clone()));
            }
            verifying.insert(id.clone());
        }

        let result = self.store.set_verified(id).await;

        {
            let mut verifying = self.in_flight();
            if result.is_ok() {
                self.directory.mark_verified(id);
            }
            verifying.remove(id);
        }

        match result {
            Ok(()) => {
                tracing::info!(uid = %id, "alumnus verified");
                Ok(())
            }
            Err(err) => {
                tracing::error!(uid = %id, error = %err, "error verifying alumnus");
                Err(ModerationError::Store(err))
            }
        }
    }

    /// The reject control has no backing action; nothing is changed.
    pub fn reject(&self, id: &UserId) -> Result<(), ModerationError> {
        tracing::info!(uid = %id, "reject requested; no rejection behavior is defined");
        Err(ModerationError::RejectUnsupported)
    }

    pub fn view(&self) -> DashboardView {
        self.view_at(Utc::now().date_naive())
    }

    /// Render every tab. While the collection request is outstanding each tab
    /// shows a busy state in place of its content.
    pub fn view_at(&self, today: NaiveDate) -> DashboardView {
        let users = self.directory.users();
        let pending = pending_alumni(&users);
        let status = self.directory.status();

        if self.directory.is_loading() {
            return DashboardView {
                pending_count: pending.len(),
                status,
                overview: TabContent::Loading,
                verification: TabContent::Loading,
                users: TabContent::Loading,
            };
        }

        let verifying = self.verifying();
        let cards = pending
            .iter()
            .map(|user| PendingAlumnusCard::from_profile(user, verifying.contains(&user.uid)))
            .collect();
        let listing = users.iter().map(UserListingEntry::from_profile).collect();

        DashboardView {
            pending_count: pending.len(),
            status,
            overview: TabContent::Ready(OverviewStats::compute(&users, today)),
            verification: TabContent::Ready(cards),
            users: TabContent::Ready(listing),
        }
    }
}
