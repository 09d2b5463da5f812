// Account flows used by the CLI: sign up, sign in, sign out.
//
// Each flow touches the credential registry and the session in sequence.
// The writes are not atomic; a storage failure halfway leaves whatever
// was already written in place.

use crate::credentials::{AuthError, CredentialStore, User};
use crate::session::SessionManager;

#[derive(Clone)]
pub struct Accounts {
    credentials: CredentialStore,
    session: SessionManager,
}

impl Accounts {
    pub fn new(credentials: CredentialStore, session: SessionManager) -> Self {
        Self {
            credentials,
            session,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Register a user and make their password the active API key.
    /// The user is not logged in by this call.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.credentials.register(email, password)?;
        self.session.adopt_key(&user)?;
        Ok(user)
    }

    /// Check credentials and start a session for the matching user.
    pub fn sign_in(&self, email: &str, password: &str, keep_session: bool) -> Result<User, AuthError> {
        let user = self.credentials.authenticate(email, password)?;
        self.session.complete_login(&user, keep_session)?;
        Ok(user)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.session.logout()?;
        Ok(())
    }
}
