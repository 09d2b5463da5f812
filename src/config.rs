// Runtime configuration, from command-line flags or the environment.
//
// Every option has an environment variable so the CLI can be pinned to a
// fixed API key (`TMDB_API_KEY`) without going through the login flow.

use crate::catalog::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};
use crate::session::LogoutPolicy;
use crate::store::FileStore;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(name = "neteflix", version, about = "Browse the movie catalog from your terminal")]
pub struct Config {
    /// Path of the local credential/session store.
    #[arg(long = "store", env = "NETEFLIX_STORE")]
    pub store_path: Option<PathBuf>,

    /// Keep everything in memory; nothing survives the process.
    #[arg(long, conflicts_with = "store_path")]
    pub in_memory: bool,

    /// Catalog service base URL.
    #[arg(long, env = "TMDB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Display language sent with every request.
    #[arg(long, env = "TMDB_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Fixed API key. Takes precedence over the key of the logged-in user.
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Forget the API key on logout instead of keeping it for later calls.
    #[arg(long, env = "NETEFLIX_CLEAR_KEY_ON_LOGOUT")]
    pub clear_key_on_logout: bool,

    /// Per-request timeout in seconds.
    #[arg(long, env = "NETEFLIX_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(FileStore::default_path)
    }

    pub fn logout_policy(&self) -> LogoutPolicy {
        if self.clear_key_on_logout {
            LogoutPolicy::ClearKey
        } else {
            LogoutPolicy::RetainKey
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("neteflix").chain(args.iter().copied()))
            .expect("args should parse")
    }

    #[test]
    fn defaults() {
        let config = parse(&["--store", "/tmp/neteflix.json"]);
        assert_eq!(config.language, DEFAULT_LANGUAGE);
        assert_eq!(config.logout_policy(), LogoutPolicy::RetainKey);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.store_path(), PathBuf::from("/tmp/neteflix.json"));
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--in-memory",
            "--base-url",
            "http://localhost:9000/3",
            "--language",
            "en-US",
            "--api-key",
            "pinned",
            "--clear-key-on-logout",
            "--timeout-secs",
            "0",
        ]);
        assert!(config.in_memory);
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/3");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.api_key.as_deref(), Some("pinned"));
        assert_eq!(config.logout_policy(), LogoutPolicy::ClearKey);
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn store_and_in_memory_conflict() {
        let result = Config::try_parse_from(["neteflix", "--in-memory", "--store", "x.json"]);
        assert!(result.is_err());
    }
}
