//! Shared account model and the collaborators both workflows talk to.

pub mod access;
pub mod directory;
pub mod domain;
pub mod navigation;
pub mod seed;
pub mod session;
pub mod store;

pub use access::{admin_gate, completion_gate, Gate};
pub use directory::{LoadStatus, UserDirectory};
pub use domain::{Identity, UserId, UserProfile, UserRole, VisibilitySettings};
pub use navigation::{Destination, NavigationLog, Navigator};
pub use seed::{load_profiles, SeedError};
pub use session::{ProfileState, SessionContext};
pub use store::{IdentityProvider, ProfileStore, StoreError};
