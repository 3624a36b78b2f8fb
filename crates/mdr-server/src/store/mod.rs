//! Entity store abstraction
//!
//! The registry treats persistence as an opaque mapping from entity id to
//! entity record with a secondary identity lookup. Uniqueness of
//! `(repository_id, file_name)` is enforced at the application layer (the
//! registration command), with a database unique index as defense in depth;
//! `save` is an upsert keyed by id so replayed writes are harmless.

pub mod memory;
pub mod postgres;

pub use memory::MemoryEntityStore;
pub use postgres::PgEntityStore;

use async_trait::async_trait;
use mdr_common::Entity;
use thiserror::Error;

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Filter criteria for entity listings.
///
/// Unset fields act as wildcards; set fields are matched exactly and
/// combined conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCriteria {
    pub repository_id: Option<String>,
    pub file_name: Option<String>,
    pub project_code: Option<String>,
}

/// A page window over an id-ordered listing.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-indexed page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// Persistent mapping from entity id to entity record.
///
/// No multi-record transactional guarantees are assumed: only the single-key
/// `save` is atomic. Implementations must keep `created_time` from the first
/// write when `save` is replayed with an id that already exists.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Look up an entity by its id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Entity>, StoreError>;

    /// Look up an entity by its identity pair.
    async fn find_by_identity(
        &self,
        repository_id: &str,
        file_name: &str,
    ) -> Result<Option<Entity>, StoreError>;

    /// Persist an entity. Upsert keyed by id: a second write with the same
    /// id returns the already-stored record unchanged.
    async fn save(&self, entity: Entity) -> Result<Entity, StoreError>;

    /// Check whether an entity with the given id exists.
    async fn exists(&self, id: &str) -> Result<bool, StoreError>;

    /// Filtered, id-ordered listing. Returns the requested page and the
    /// total number of matching entities.
    async fn find(
        &self,
        criteria: &EntityCriteria,
        page: PageRequest,
    ) -> Result<(Vec<Entity>, i64), StoreError>;

    /// Backend liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
