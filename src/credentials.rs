// Credential store: the registry of local users kept under the `users`
// key as a single JSON array of `{id, password}` objects.
//
// The password is stored in plain text because it doubles as the
// catalog API key (see `session::SessionManager::active_key`).
//
// Every mutation rewrites the whole array. Two registrations racing on
// the same store can both read one snapshot and the later write wins,
// silently dropping the other user. The CLI is single-user so this is
// accepted, not guarded.

use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const USERS_KEY: &str = "users";

/// A registered user. `id` is the email address.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub password: String,
}

/// Failures reported by registration and login.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("email is already registered: {email}")]
    DuplicateUser { email: String },

    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registry of users on top of a `KeyValueStore`.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All registered users in registration order.
    ///
    /// A stored blob that does not parse is treated as an empty registry.
    pub fn users(&self) -> Vec<User> {
        let Some(raw) = self.store.get(USERS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "stored user registry is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, users: &[User]) -> Result<(), AuthError> {
        let raw = serde_json::to_string(users).map_err(StoreError::from)?;
        self.store.set(USERS_KEY, &raw)?;
        Ok(())
    }

    /// Append a new user. Fails with `DuplicateUser` if the email is taken;
    /// the registry is left untouched in that case.
    pub fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let mut users = self.users();
        if users.iter().any(|u| u.id == email) {
            return Err(AuthError::DuplicateUser {
                email: email.to_string(),
            });
        }

        let user = User {
            id: email.to_string(),
            password: password.to_string(),
        };
        users.push(user.clone());
        self.save(&users)?;
        info!(user = %user.id, total = users.len(), "registered user");
        Ok(user)
    }

    /// Return the first user whose id and password both match exactly.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.users()
            .into_iter()
            .find(|u| u.id == email && u.password == password)
            .ok_or(AuthError::InvalidCredentials)
    }
}
