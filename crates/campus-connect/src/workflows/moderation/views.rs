use chrono::NaiveDate;
use serde::Serialize;

use super::analytics::OverviewStats;
use crate::workflows::accounts::{Destination, LoadStatus, UserId, UserProfile, UserRole};

pub const NOT_PROVIDED: &str = "Not provided";

/// Tab body that is either still loading or ready to render.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum TabContent<T> {
    Loading,
    Ready(T),
}

impl<T> TabContent<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, TabContent::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            TabContent::Ready(content) => Some(content),
            TabContent::Loading => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub pending_count: usize,
    pub status: LoadStatus,
    pub overview: TabContent<OverviewStats>,
    pub verification: TabContent<Vec<PendingAlumnusCard>>,
    pub users: TabContent<Vec<UserListingEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Verified,
    Pending,
    Active,
}

impl AccountStatus {
    pub fn of(profile: &UserProfile) -> Self {
        match (profile.role, profile.is_verified) {
            (UserRole::Alumni, true) => AccountStatus::Verified,
            (UserRole::Alumni, false) => AccountStatus::Pending,
            _ => AccountStatus::Active,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AccountStatus::Verified => "Verified",
            AccountStatus::Pending => "Pending",
            AccountStatus::Active => "Active",
        }
    }
}

/// Row of the "All Users" tab.
#[derive(Debug, Clone, Serialize)]
pub struct UserListingEntry {
    pub uid: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub avatar_initial: String,
    pub role: UserRole,
    pub role_label: &'static str,
    pub status: AccountStatus,
    pub status_label: &'static str,
    pub joined_on: NaiveDate,
    pub joined_label: String,
    pub profile_path: String,
}

impl UserListingEntry {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let status = AccountStatus::of(profile);
        let joined_on = profile.created_at.date_naive();
        Self {
            uid: profile.uid.clone(),
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            photo_url: profile.photo_url.clone(),
            avatar_initial: avatar_initial(&profile.display_name),
            role: profile.role,
            role_label: profile.role.label(),
            status,
            status_label: status.label(),
            joined_on,
            joined_label: format_join_date(joined_on),
            profile_path: Destination::Profile(profile.uid.clone()).path(),
        }
    }
}

/// Card shown in the verification tab for each pending alumnus.
#[derive(Debug, Clone, Serialize)]
pub struct PendingAlumnusCard {
    pub uid: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub avatar_initial: String,
    pub department: String,
    pub batch: String,
    pub company: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub verifying: bool,
}

impl PendingAlumnusCard {
    pub fn from_profile(profile: &UserProfile, verifying: bool) -> Self {
        Self {
            uid: profile.uid.clone(),
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            photo_url: profile.photo_url.clone(),
            avatar_initial: avatar_initial(&profile.display_name),
            department: or_not_provided(profile.department.as_deref()),
            batch: or_not_provided(profile.batch.as_deref()),
            company: or_not_provided(profile.company.as_deref()),
            job_title: or_not_provided(profile.job_title.as_deref()),
            bio: profile.bio.clone().filter(|bio| !bio.trim().is_empty()),
            verifying,
        }
    }
}

fn or_not_provided(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

/// First character of the display name, used when no avatar image is set.
pub fn avatar_initial(display_name: &str) -> String {
    display_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Join date in month/day/year form, e.g. `3/7/2025`.
pub fn format_join_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
