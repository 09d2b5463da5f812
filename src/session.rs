// Session manager: which user is logged in, whether that login should
// survive a restart, and which API key the catalog client should use.
//
// Stored keys:
// - `currentUser`: id of the logged-in user, absent when logged out.
// - `keepLogin`: present (value "true") when the session should be kept;
//   absence means false.
// - `TMDb-Key`: the active API key, i.e. the password of the user who
//   most recently registered or logged in.
//
// Logging out only clears the key when `LogoutPolicy::ClearKey` is chosen.
// The default retains it, so catalog calls keep working after logout.

use crate::credentials::User;
use crate::store::{KeyValueStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info};

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const KEEP_LOGIN_KEY: &str = "keepLogin";
pub const API_KEY_KEY: &str = "TMDb-Key";

/// What `logout` does with the active API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutPolicy {
    /// Leave the key in place until the next login or registration replaces it.
    #[default]
    RetainKey,
    /// Remove the key together with the current user.
    ClearKey,
}

/// Point-in-time view of the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub current_user_id: Option<String>,
    pub keep_session: bool,
    pub active_key: Option<String>,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    logout_policy: LogoutPolicy,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_policy(store, LogoutPolicy::default())
    }

    pub fn with_policy(store: Arc<dyn KeyValueStore>, logout_policy: LogoutPolicy) -> Self {
        Self {
            store,
            logout_policy,
        }
    }

    pub fn logout_policy(&self) -> LogoutPolicy {
        self.logout_policy
    }

    /// Make `user` the current user and their password the active key.
    ///
    /// `keep_session == false` removes the `keepLogin` entry instead of
    /// storing "false".
    pub fn complete_login(&self, user: &User, keep_session: bool) -> Result<(), StoreError> {
        self.store.set(API_KEY_KEY, &user.password)?;
        self.store.set(CURRENT_USER_KEY, &user.id)?;
        if keep_session {
            self.store.set(KEEP_LOGIN_KEY, "true")?;
        } else {
            self.store.remove(KEEP_LOGIN_KEY)?;
        }
        info!(user = %user.id, keep_session, "logged in");
        Ok(())
    }

    /// Store `user`'s password as the active key without logging them in.
    /// Used right after registration.
    pub fn adopt_key(&self, user: &User) -> Result<(), StoreError> {
        self.store.set(API_KEY_KEY, &user.password)?;
        debug!(user = %user.id, "adopted api key");
        Ok(())
    }

    /// Clear the current user. The active key follows `LogoutPolicy`.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.remove(CURRENT_USER_KEY)?;
        if self.logout_policy == LogoutPolicy::ClearKey {
            self.store.remove(API_KEY_KEY)?;
        }
        info!(policy = ?self.logout_policy, "logged out");
        Ok(())
    }

    /// Startup hook: keep the current user only when `keepLogin` is set.
    ///
    /// Returns the id of the user that is still logged in, if any.
    pub fn resume(&self) -> Result<Option<String>, StoreError> {
        let current = self.current_user_id();
        if current.is_some() && !self.keep_session() {
            self.store.remove(CURRENT_USER_KEY)?;
            debug!("session not kept across restart, cleared current user");
            return Ok(None);
        }
        Ok(current)
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.store.get(CURRENT_USER_KEY)
    }

    /// The stored API key. An empty value counts as absent.
    pub fn active_key(&self) -> Option<String> {
        self.store.get(API_KEY_KEY).filter(|k| !k.is_empty())
    }

    pub fn keep_session(&self) -> bool {
        self.store.get(KEEP_LOGIN_KEY).is_some()
    }

    pub fn snapshot(&self) -> Session {
        Session {
            current_user_id: self.current_user_id(),
            keep_session: self.keep_session(),
            active_key: self.active_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rstest::rstest;

    fn user(id: &str, password: &str) -> User {
        User {
            id: id.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn fresh_session_is_empty() {
        let session = SessionManager::new(Arc::new(MemoryStore::new()));
        assert_eq!(
            session.snapshot(),
            Session {
                current_user_id: None,
                keep_session: false,
                active_key: None,
            }
        );
    }

    #[rstest]
    #[case::kept(true)]
    #[case::not_kept(false)]
    fn complete_login_sets_user_key_and_flag(#[case] keep: bool) {
        let store = Arc::new(MemoryStore::new());
        let session = SessionManager::new(store.clone());
        let alice = user("a@x.com", "key123");

        session.complete_login(&alice, keep).expect("login");

        assert_eq!(session.current_user_id().as_deref(), Some("a@x.com"));
        assert_eq!(session.active_key().as_deref(), Some("key123"));
        assert_eq!(session.keep_session(), keep);
        assert_eq!(store.get(KEEP_LOGIN_KEY).is_some(), keep);
    }

    #[test]
    fn login_without_keep_removes_previous_flag() {
        let session = SessionManager::new(Arc::new(MemoryStore::new()));
        let alice = user("a@x.com", "key123");

        session.complete_login(&alice, true).expect("first login");
        session.complete_login(&alice, false).expect("second login");

        assert!(!session.keep_session());
    }

    #[test]
    fn logout_retains_key_by_default() {
        let session = SessionManager::new(Arc::new(MemoryStore::new()));
        session
            .complete_login(&user("a@x.com", "key123"), true)
            .expect("login");

        let key_before = session.active_key();
        session.logout().expect("logout");

        assert_eq!(session.current_user_id(), None);
        assert_eq!(session.active_key(), key_before);
    }

    #[test]
    fn logout_clears_key_when_configured() {
        let session =
            SessionManager::with_policy(Arc::new(MemoryStore::new()), LogoutPolicy::ClearKey);
        session
            .complete_login(&user("a@x.com", "key123"), false)
            .expect("login");

        session.logout().expect("logout");

        assert_eq!(session.current_user_id(), None);
        assert_eq!(session.active_key(), None);
    }

    #[test]
    fn adopt_key_does_not_log_in() {
        let session = SessionManager::new(Arc::new(MemoryStore::new()));
        session
            .adopt_key(&user("a@x.com", "key123"))
            .expect("adopt");

        assert_eq!(session.active_key().as_deref(), Some("key123"));
        assert_eq!(session.current_user_id(), None);
    }

    #[test]
    fn latest_login_wins_the_key() {
        let session = SessionManager::new(Arc::new(MemoryStore::new()));
        session
            .complete_login(&user("a@x.com", "key-a"), false)
            .expect("login a");
        session
            .complete_login(&user("b@x.com", "key-b"), false)
            .expect("login b");

        assert_eq!(session.current_user_id().as_deref(), Some("b@x.com"));
        assert_eq!(session.active_key().as_deref(), Some("key-b"));
    }

    #[rstest]
    #[case::kept(true, Some("a@x.com"))]
    #[case::not_kept(false, None)]
    fn resume_honours_keep_flag(#[case] keep: bool, #[case] expected: Option<&str>) {
        let session = SessionManager::new(Arc::new(MemoryStore::new()));
        session
            .complete_login(&user("a@x.com", "key123"), keep)
            .expect("login");

        let resumed = session.resume().expect("resume");

        assert_eq!(resumed.as_deref(), expected);
        assert_eq!(session.current_user_id().as_deref(), expected);
        assert_eq!(session.active_key().as_deref(), Some("key123"));
    }

    #[test]
    fn empty_stored_key_counts_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set(API_KEY_KEY, "").expect("seed");
        let session = SessionManager::new(store);
        assert_eq!(session.active_key(), None);
    }
}
