//! User accounts: lookup, maintenance and default seeding

use chrono::{TimeDelta, Utc};
use tracing::{error, info, warn};
use crate::{Error, Result};
use crate::auth::password::{hash_password, verify_password};
use crate::entity::{NewUser, User};
use crate::storage::SqliteStore;

/// Password given to the seeded accounts
pub const DEFAULT_PASSWORD: &str = "password123";

pub struct UserService<'a> {
    store: &'a SqliteStore,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Check credentials. Unknown, inactive or wrong-password users all
    /// come back as `None`; a match has its last login recorded.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = match self.get_by_email(email)? {
            Some(user) if user.is_active => user,
            _ => {
                warn!(email, "Authentication failed");
                return Ok(None);
            }
        };

        if !verify_password(password, &user.password_hash) {
            warn!(email, "Invalid password");
            return Ok(None);
        }

        let now = Utc::now();
        self.store.touch_last_login(user.id, now)?;
        info!(email, "User authenticated successfully");
        Ok(Some(User {
            last_login_at: Some(now),
            ..user
        }))
    }

    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.get_user_by_email(email)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        self.store.get_user(id)
    }

    /// Create an active user from a plain-text password
    pub fn create_user(&self, new_user: &NewUser) -> Result<User> {
        if self.get_by_email(&new_user.email)?.is_some() {
            warn!(email = %new_user.email, "User already exists");
            return Err(Error::DuplicateEmail(new_user.email.clone()));
        }

        let user = self.store.insert_user(&User {
            id: 0,
            email: new_user.email.clone(),
            password_hash: hash_password(&new_user.password),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            created_at: Utc::now(),
            last_login_at: None,
            is_active: true,
        })?;

        info!(email = %user.email, id = user.id, "User created successfully");
        Ok(user)
    }

    /// Update names, email and active flag. Returns false if the user is gone.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        let updated = self.store.update_user(user)?;
        if updated {
            info!(email = %user.email, "User updated successfully");
        } else {
            warn!(id = user.id, "User not found for update");
        }
        Ok(updated)
    }

    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let deleted = self.store.delete_user(id)?;
        if deleted {
            info!(id, "User deleted successfully");
        } else {
            warn!(id, "User not found for deletion");
        }
        Ok(deleted)
    }

    pub fn list_active_users(&self) -> Result<Vec<User>> {
        let all = self.store.list_users()?;
        info!(total = all.len(), "Loaded users");
        Ok(all.into_iter().filter(|u| u.is_active).collect())
    }

    /// Insert the default accounts when the users table is empty.
    /// Returns how many were added.
    pub fn seed_default_users(&self) -> Result<usize> {
        let existing = self.store.list_users()?;
        if !existing.is_empty() {
            info!(count = existing.len(), "Database already contains users, skipping seed");
            return Ok(0);
        }

        info!("Seeding database with initial users...");
        let users = default_users();
        for user in &users {
            if let Err(e) = self.store.insert_user(user) {
                error!(error = %e, email = %user.email, "Error seeding user");
                return Err(e);
            }
        }
        info!(count = users.len(), "Database seeded successfully");
        Ok(users.len())
    }

    /// Replace all users with the default accounts
    pub fn reseed_default_users(&self) -> Result<usize> {
        info!("Re-seeding database...");
        self.store.delete_all_users()?;
        self.seed_default_users()
    }
}

fn default_users() -> Vec<User> {
    let now = Utc::now();
    let account = |email: &str, first: &str, last: &str, age_days: i64| User {
        id: 0,
        email: email.to_string(),
        password_hash: hash_password(DEFAULT_PASSWORD),
        first_name: first.to_string(),
        last_name: last.to_string(),
        created_at: now - TimeDelta::days(age_days),
        last_login_at: None,
        is_active: true,
    };

    vec![
        account("admin@example.com", "Admin", "User", 30),
        account("user@example.com", "John", "Doe", 15),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        UserService::new(&store).seed_default_users().unwrap();
        store
    }

    #[test]
    fn test_seed_only_once() {
        let store = seeded();
        let service = UserService::new(&store);
        assert_eq!(service.seed_default_users().unwrap(), 0);
        assert_eq!(store.count_users().unwrap(), 2);

        let admin = service.get_by_email("admin@example.com").unwrap().unwrap();
        assert_eq!(admin.full_name(), "Admin User");
        assert!(admin.created_at < Utc::now() - TimeDelta::days(29));
    }

    #[test]
    fn test_authenticate() {
        let store = seeded();
        let service = UserService::new(&store);

        let user = service.authenticate("ADMIN@example.com", DEFAULT_PASSWORD).unwrap().unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert!(user.last_login_at.is_some());
        assert!(service.get_by_id(user.id).unwrap().unwrap().last_login_at.is_some());

        assert!(service.authenticate("admin@example.com", "wrong-pass").unwrap().is_none());
        assert!(service.authenticate("ghost@example.com", DEFAULT_PASSWORD).unwrap().is_none());
    }

    #[test]
    fn test_inactive_user_cannot_log_in() {
        let store = seeded();
        let service = UserService::new(&store);

        let mut user = service.get_by_email("user@example.com").unwrap().unwrap();
        user.is_active = false;
        assert!(service.update_user(&user).unwrap());

        assert!(service.authenticate("user@example.com", DEFAULT_PASSWORD).unwrap().is_none());
        let active = service.list_active_users().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].email, "admin@example.com");
    }

    #[test]
    fn test_create_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        let service = UserService::new(&store);
        let new_user = NewUser {
            email: "new@example.com".to_string(),
            password: "hunter22".to_string(),
            first_name: "New".to_string(),
            last_name: "Person".to_string(),
        };

        let user = service.create_user(&new_user).unwrap();
        assert!(user.is_active);
        assert_eq!(user.password_hash, hash_password("hunter22"));

        let again = NewUser { email: "NEW@example.com".to_string(), ..new_user };
        assert!(matches!(service.create_user(&again), Err(Error::DuplicateEmail(_))));
    }

    #[test]
    fn test_delete_and_reseed() {
        let store = seeded();
        let service = UserService::new(&store);
        let user = service.get_by_email("user@example.com").unwrap().unwrap();

        assert!(service.delete_user(user.id).unwrap());
        assert!(!service.delete_user(user.id).unwrap());
        assert!(!service.update_user(&user).unwrap());

        assert_eq!(service.reseed_default_users().unwrap(), 2);
        assert_eq!(store.count_users().unwrap(), 2);
    }
}
