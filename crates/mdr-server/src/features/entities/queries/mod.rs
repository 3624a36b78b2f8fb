//! Entity read operations

pub mod find_entities;
pub mod get_entity;

pub use find_entities::{FindEntitiesQuery, PageInfo};
pub use get_entity::GetEntityQuery;
