//! Mock user generator.
//!
//! Produces `user-1..user-N` with random role, status and department,
//! a join date 100 to 1099 days back and a last login within the last 30
//! days.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use roster_core::role::ROLES;
use roster_core::user::{User, UserStatus};

pub const DEPARTMENTS: [&str; 6] = [
    "Engineering",
    "Marketing",
    "Sales",
    "HR",
    "Finance",
    "Support",
];

/// Builds the user at 1-based position `index`.
pub fn user_at(
    index: usize,
    role: &str,
    status: UserStatus,
    department: &str,
    date_joined: NaiveDate,
    last_login: NaiveDate,
) -> User {
    let id = format!("user-{}", index);
    User {
        avatar: Some(format!("https://i.pravatar.cc/150?u={}", id)),
        id,
        name: format!("User {}", index),
        email: format!("user{}@example.com", index),
        role: role.to_string(),
        status,
        department: department.to_string(),
        date_joined,
        last_login,
    }
}

/// Generates `count` users relative to `today`.
pub fn generate_users<R: Rng + ?Sized>(count: usize, rng: &mut R, today: NaiveDate) -> Vec<User> {
    (1..=count)
        .map(|index| {
            let role = ROLES.choose(rng).map(|r| r.id).unwrap_or("viewer");
            let status = *UserStatus::ALL.choose(rng).unwrap_or(&UserStatus::Active);
            let department = DEPARTMENTS.choose(rng).copied().unwrap_or("Support");

            let joined_days_ago = rng.gen_range(100..1100);
            let login_days_ago = rng.gen_range(0..30);
            let date_joined = today
                .checked_sub_days(Days::new(joined_days_ago))
                .unwrap_or(today);
            let last_login = today
                .checked_sub_days(Days::new(login_days_ago))
                .unwrap_or(today);

            user_at(index, role, status, department, date_joined, last_login)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_user(index: usize, role: &str, status: UserStatus) -> User {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    user_at(index, role, status, "Engineering", day, day)
}
