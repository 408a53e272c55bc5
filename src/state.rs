//! Shared application state.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::ConfigV1;
use crate::store::Store;

/// Application state cloned into each HTTP handler. Handlers own no other
/// shared mutable state; every cross-request effect goes through the store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Issues and verifies session tokens.
    pub tokens: Arc<TokenService>,
    /// The injected document-store adapter.
    pub store: Arc<dyn Store>,
}
