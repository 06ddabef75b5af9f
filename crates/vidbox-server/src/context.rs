//! Application context shared by all request handlers via Axum state.

use std::sync::Arc;

use vidbox_core::config::Config;
use vidbox_core::token::StreamTokens;
use vidbox_core::MediaCatalog;

/// Immutable per-process state handed to every handler.
///
/// Cheaply cloneable because it only holds `Arc`s. There is no mutable state
/// here: the token secret, chunk size, and allowed roots are fixed at startup,
/// and the catalog synchronizes itself.
#[derive(Clone)]
pub struct AppContext {
    /// Application configuration snapshot.
    pub config: Arc<Config>,
    /// External media catalog (injected repository).
    pub catalog: Arc<dyn MediaCatalog>,
    /// Stream token authority, keyed with the configured secret.
    pub tokens: Arc<StreamTokens>,
}

impl AppContext {
    /// Build a context from a config and catalog, deriving the token
    /// authority from the configured secret.
    pub fn new(config: Config, catalog: Arc<dyn MediaCatalog>) -> Self {
        let tokens = Arc::new(StreamTokens::new(config.stream.secret.clone()));
        Self {
            config: Arc::new(config),
            catalog,
            tokens,
        }
    }
}
