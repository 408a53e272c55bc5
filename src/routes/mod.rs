//! HTTP route definitions and handlers.
//!
//! This module organizes all HTTP endpoints into logical groups:
//! session (token issuance), donations, claim requests, and health checks.

mod claim_routes;
mod donation_routes;
mod health_routes;
mod session_routes;

use axum::Router;

use crate::state::AppState;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router and attaches
/// the application state for access in handlers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(session_routes::routes())
        .merge(donation_routes::routes())
        .merge(claim_routes::routes())
        .merge(health_routes::routes())
        .with_state(state)
}
