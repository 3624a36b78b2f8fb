//! MDR Common Library
//!
//! Shared types, utilities, and error handling for the MDR workspace.
//!
//! # Overview
//!
//! This crate provides functionality used by both the registry server and the
//! registration client:
//!
//! - **Entity model**: the persisted registration record and its wire forms
//! - **Id derivation**: deterministic, name-based object id computation
//! - **Logging**: tracing initialization shared by all binaries
//!
//! # Example
//!
//! ```
//! use mdr_common::types::derive_entity_id;
//!
//! let id = derive_entity_id("bb44b6d8-010d-473b-8037-91530a01c24f", "sample.bam");
//! assert_eq!(id, derive_entity_id("bb44b6d8-010d-473b-8037-91530a01c24f", "sample.bam"));
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::{derive_entity_id, Entity, RegisterEntityRequest, ENTITY_ID_HEADER};
