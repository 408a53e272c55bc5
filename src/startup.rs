//! Application startup and server initialization.
//!
//! This module handles the creation and configuration of the HTTP server,
//! including the token service, the store backend, and route setup.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::auth::TokenService;
use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;
use crate::store::create_store;

/// Initializes and runs the application server.
///
/// Sets up the store backend and token service, binds to the address
/// specified in the configuration and starts serving requests.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(&config.store).await;
    let tokens = Arc::new(TokenService::new(config.jwt.clone()));

    info!("Starting server on {}", config.bind_address);

    let state = AppState {
        config: config.clone(),
        tokens,
        store,
    };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
