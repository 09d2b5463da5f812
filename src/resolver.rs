// API key resolution for the catalog client.
//
// Order: a configured override key (flag or `TMDB_API_KEY`), then the key
// stored by the session. Empty strings are ignored at both tiers.

use crate::session::SessionManager;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no catalog API key available: register or log in first, or configure TMDB_API_KEY")]
pub struct MissingApiKey;

#[derive(Clone)]
pub struct ApiKeyResolver {
    override_key: Option<String>,
    session: SessionManager,
}

impl ApiKeyResolver {
    pub fn new(session: SessionManager, override_key: Option<String>) -> Self {
        Self {
            override_key: override_key.filter(|k| !k.is_empty()),
            session,
        }
    }

    pub fn has_override(&self) -> bool {
        self.override_key.is_some()
    }

    pub fn resolve(&self) -> Result<String, MissingApiKey> {
        if let Some(key) = &self.override_key {
            return Ok(key.clone());
        }
        self.session.active_key().ok_or(MissingApiKey)
    }
}
