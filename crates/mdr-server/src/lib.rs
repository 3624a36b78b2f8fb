//! MDR Server Library
//!
//! HTTP server for the genomic file metadata registry.
//!
//! # Overview
//!
//! The registry server persists one entity record per unique
//! `(repository_id, file_name)` pair and assigns each record a
//! deterministic object id:
//!
//! - **Registration**: `POST /api/v1/entities` creates the entity or answers
//!   409 with the existing id in the `entity-id` response header
//! - **Lookup**: get by id, existence checks, and filtered listings where
//!   unset filters act as wildcards
//! - **Storage**: an [`store::EntityStore`] abstraction with PostgreSQL and
//!   in-memory backends
//!
//! # Concurrency
//!
//! Registration does not take locks. Two concurrent registrations of the
//! same identity derive the same id, so the second store write lands on the
//! first writer's record instead of creating a duplicate. A unique index on
//! `(repository_id, file_name)` backs this up at the database level.
//!
//! # Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tower**: middleware (tracing, CORS, compression)

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, ApiResult};
