//! Subcommand implementations.
//!
//! Each command builds the view it needs, drives it, and hands the
//! resulting view model to [`crate::render`].

pub mod auth;
pub mod dashboard;
pub mod listing;

use std::sync::Arc;

use marketplace_client::{
    ApiClient, ClientConfig, FileSessionStore, MarketplaceApi, Result, SessionStore,
};

/// Shared handles for every command.
pub struct Context {
    pub config: ClientConfig,
    pub api: MarketplaceApi,
    pub store: Arc<dyn SessionStore>,
}

impl Context {
    /// Build the context from `MARKETPLACE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let api = MarketplaceApi::new(ApiClient::new(&config)?);
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.session_file));
        tracing::debug!(
            api_url = %config.api_url,
            session_file = %config.session_file.display(),
            "Context ready"
        );
        Ok(Self { config, api, store })
    }
}
