use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::dashboard::pending_alumni;
use crate::workflows::accounts::{UserProfile, UserRole};

pub const GROWTH_WINDOW_MONTHS: u32 = 6;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionSlice {
    pub role: UserRole,
    pub label: &'static str,
    pub value: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRegistrations {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    pub students: usize,
    pub alumni: usize,
}

/// Figures for the overview tab, derived from the loaded collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewStats {
    pub total_users: usize,
    pub pending_verifications: usize,
    pub distribution: Vec<DistributionSlice>,
    pub growth: Vec<MonthlyRegistrations>,
}

impl OverviewStats {
    pub fn compute(users: &[UserProfile], today: NaiveDate) -> Self {
        Self {
            total_users: users.len(),
            pending_verifications: pending_alumni(users).len(),
            distribution: role_distribution(users),
            growth: monthly_registrations(users, today, GROWTH_WINDOW_MONTHS),
        }
    }
}

fn slice_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Student => "Students",
        UserRole::Alumni => "Alumni",
        UserRole::Admin => "Admins",
    }
}

pub fn role_distribution(users: &[UserProfile]) -> Vec<DistributionSlice> {
    let total = users.len();
    [UserRole::Student, UserRole::Alumni, UserRole::Admin]
        .into_iter()
        .map(|role| {
            let value = users.iter().filter(|user| user.role == role).count();
            let percent = if total == 0 {
                0
            } else {
                ((value as f64 / total as f64) * 100.0).round() as u8
            };
            DistributionSlice {
                role,
                label: slice_label(role),
                value,
                percent,
            }
        })
        .collect()
}

/// Student and alumni sign-ups per calendar month, oldest first, for the
/// `months` months ending with the month of `today`.
pub fn monthly_registrations(
    users: &[UserProfile],
    today: NaiveDate,
    months: u32,
) -> Vec<MonthlyRegistrations> {
    let mut buckets: Vec<MonthlyRegistrations> = Vec::with_capacity(months as usize);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..months {
        buckets.push(MonthlyRegistrations {
            year,
            month,
            label: MONTH_ABBREVIATIONS[(month - 1) as usize],
            students: 0,
            alumni: 0,
        });
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    buckets.reverse();

    for user in users {
        let joined = user.created_at.date_naive();
        let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| bucket.year == joined.year() && bucket.month == joined.month())
        else {
            continue;
        };
        match user.role {
            UserRole::Student => bucket.students += 1,
            UserRole::Alumni => bucket.alumni += 1,
            UserRole::Admin => {}
        }
    }

    buckets
}
