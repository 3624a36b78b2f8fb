//! API surface shared by all feature routes

pub mod response;

pub use response::{ApiResponse, ErrorResponse};
