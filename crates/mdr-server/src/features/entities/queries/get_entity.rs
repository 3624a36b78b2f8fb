//! Get entity query

use mdr_common::Entity;
use serde::{Deserialize, Serialize};

use crate::store::{EntityStore, StoreError};

/// Query to get an entity by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEntityQuery {
    pub id: String,
}

/// Error type for entity lookups
#[derive(Debug, thiserror::Error)]
pub enum GetEntityError {
    #[error("Entity not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub async fn handle(
    store: &dyn EntityStore,
    query: GetEntityQuery,
) -> Result<Entity, GetEntityError> {
    store
        .find_by_id(&query.id)
        .await?
        .ok_or(GetEntityError::NotFound)
}

/// Existence probe backing `HEAD /entities/:id`.
pub async fn exists(store: &dyn EntityStore, id: &str) -> Result<bool, StoreError> {
    store.exists(id).await
}
