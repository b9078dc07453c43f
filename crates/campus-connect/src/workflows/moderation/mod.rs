//! Admin moderation: aggregate counts, the pending-alumni list, the full user
//! listing, and per-record approval.

pub mod analytics;
pub mod dashboard;
pub mod router;
pub mod views;

#[cfg(test)]
mod tests;

pub use analytics::{DistributionSlice, MonthlyRegistrations, OverviewStats};
pub use dashboard::{pending_alumni, ModerationDashboard, ModerationError};
pub use router::moderation_router;
pub use views::{
    AccountStatus, DashboardView, PendingAlumnusCard, TabContent, UserListingEntry, NOT_PROVIDED,
};
