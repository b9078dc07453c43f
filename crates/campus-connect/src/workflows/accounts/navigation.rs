use std::sync::{Mutex, PoisonError};

use serde::{Serialize, Serializer};

use super::domain::UserId;

/// Pages the workflows may send a user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Login,
    Feed,
    PendingVerification,
    Profile(UserId),
}

impl Destination {
    pub fn path(&self) -> String {
        match self {
            Destination::Login => "/auth/login".to_string(),
            Destination::Feed => "/".to_string(),
            Destination::PendingVerification => "/auth/pending-verification".to_string(),
            Destination::Profile(uid) => format!("/profile/{uid}"),
        }
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}

/// Routing collaborator. Implementations decide how a destination is reached.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Navigator that records every requested destination in order.
#[derive(Debug, Default)]
pub struct NavigationLog {
    visited: Mutex<Vec<Destination>>,
}

impl NavigationLog {
    pub fn last(&self) -> Option<Destination> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn history(&self) -> Vec<Destination> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, destination: Destination) {
        tracing::debug!(path = %destination.path(), "navigation requested");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination);
    }
}
