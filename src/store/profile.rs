//! User profile record
//!
//! There is no real account system: signing in creates a flat profile
//! record under a fixed key, and signing out removes it. The record is
//! read once on startup and rewritten wholesale on every change.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StoreError, keys, load_record, save_record};

/// Subscription tier shown in the profile header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Plus,
    Pro,
}

impl Plan {
    pub fn label(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Plus => "Plus",
            Plan::Pro => "Pro",
        }
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub plan: Plan,
    /// Enrolled course identifiers
    pub courses: Vec<String>,
    /// Unix timestamp of account creation
    pub created_at: i64,
    /// Unix timestamp of the most recent sign-in
    pub last_sign_in: i64,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

/// Load the current profile, if someone is signed in
pub fn load(store: &dyn KeyValueStore) -> Result<Option<UserProfile>, StoreError> {
    load_record(store, keys::PROFILE)
}

/// Sign in: reuse the stored profile when the email matches, otherwise
/// create a fresh one
pub fn sign_in(
    store: &mut dyn KeyValueStore,
    name: &str,
    email: &str,
) -> Result<UserProfile, StoreError> {
    let now = unix_now();

    let profile = match load(store)? {
        Some(mut existing) if existing.email == email => {
            existing.name = name.to_string();
            existing.last_sign_in = now;
            existing
        }
        _ => UserProfile {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Student,
            plan: Plan::Free,
            courses: Vec::new(),
            created_at: now,
            last_sign_in: now,
        },
    };

    save_record(store, keys::PROFILE, &profile)?;
    Ok(profile)
}

/// Sign out: delete the profile record
pub fn sign_out(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(keys::PROFILE)
}

/// Enroll the signed-in user in a course
pub fn enroll(store: &mut dyn KeyValueStore, course_id: &str) -> Result<(), StoreError> {
    if let Some(mut profile) = load(store)? {
        if !profile.courses.iter().any(|c| c == course_id) {
            profile.courses.push(course_id.to_string());
            save_record(store, keys::PROFILE, &profile)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn sign_in_creates_a_student_on_the_free_plan() {
        let mut store = MemoryStore::new();
        let profile = sign_in(&mut store, "Ada", "ada@example.com").unwrap();

        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.plan, Plan::Free);
        assert!(profile.courses.is_empty());
        assert!(load(&store).unwrap().is_some());
    }

    #[test]
    fn repeat_sign_in_keeps_the_existing_record() {
        let mut store = MemoryStore::new();
        sign_in(&mut store, "Ada", "ada@example.com").unwrap();
        enroll(&mut store, "pte-essentials").unwrap();

        let again = sign_in(&mut store, "Ada L.", "ada@example.com").unwrap();
        assert_eq!(again.name, "Ada L.");
        assert_eq!(again.courses, vec!["pte-essentials".to_string()]);
    }

    #[test]
    fn different_email_replaces_the_profile() {
        let mut store = MemoryStore::new();
        sign_in(&mut store, "Ada", "ada@example.com").unwrap();
        let other = sign_in(&mut store, "Grace", "grace@example.com").unwrap();

        assert_eq!(other.email, "grace@example.com");
        assert!(other.courses.is_empty());
    }

    #[test]
    fn sign_out_removes_the_record() {
        let mut store = MemoryStore::new();
        sign_in(&mut store, "Ada", "ada@example.com").unwrap();
        sign_out(&mut store).unwrap();
        assert!(load(&store).unwrap().is_none());
    }

    #[test]
    fn enroll_is_idempotent() {
        let mut store = MemoryStore::new();
        sign_in(&mut store, "Ada", "ada@example.com").unwrap();
        enroll(&mut store, "c1").unwrap();
        enroll(&mut store, "c1").unwrap();

        let profile = load(&store).unwrap().unwrap();
        assert_eq!(profile.courses.len(), 1);
    }
}
