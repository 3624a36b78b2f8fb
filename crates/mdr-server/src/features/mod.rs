//! Feature modules implementing the registry API
//!
//! Each feature is a vertical slice with its own commands (writes), queries
//! (reads), and routes:
//!
//! - **entities**: registration and lookup of file entities
//!
//! Handlers are plain async functions taking the shared state and a
//! command/query value, so they are testable without HTTP.

pub mod entities;

use std::sync::Arc;

use axum::Router;

use crate::store::EntityStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Entity store backend shared by all handlers
    pub store: Arc<dyn EntityStore>,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/entities", entities::entities_routes().with_state(state))
}
