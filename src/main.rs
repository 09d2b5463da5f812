// Entrypoint for the CLI application.
// - Parse configuration from flags/environment and install logging.
// - Build the store, account flows and catalog client, then hand them to
//   the UI loop.

use anyhow::Context;
use clap::Parser;
use neteflix_cli::{
    accounts::Accounts,
    catalog::{CatalogClient, HttpTransport},
    config::Config,
    credentials::CredentialStore,
    resolver::ApiKeyResolver,
    session::SessionManager,
    store::{FileStore, KeyValueStore, MemoryStore},
    ui::main_menu,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they do not interleave with the menu on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neteflix_cli=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store: Arc<dyn KeyValueStore> = if config.in_memory {
        Arc::new(MemoryStore::new())
    } else {
        let path = config.store_path();
        let store = FileStore::open(&path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        tracing::info!(path = %store.path().display(), "opened store");
        Arc::new(store)
    };

    let session = SessionManager::with_policy(store.clone(), config.logout_policy());
    if let Some(user) = session.resume().context("Failed to restore session")? {
        tracing::info!(%user, "resumed kept session");
    }

    let resolver = ApiKeyResolver::new(session.clone(), config.api_key.clone());
    if resolver.has_override() {
        tracing::info!("using configured API key override");
    }

    let transport = HttpTransport::new(config.timeout()).context("Failed to build HTTP client")?;
    let catalog = CatalogClient::new(transport, resolver, config.base_url.clone(), &config.language);
    let accounts = Accounts::new(CredentialStore::new(store), session);

    // Blocks until the user exits.
    main_menu(&accounts, &catalog)?;
    Ok(())
}
