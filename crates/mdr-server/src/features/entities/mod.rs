//! Entity registration and lookup feature

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::entities_routes;
