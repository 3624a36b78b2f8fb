//! CLI command implementations

pub mod register;
pub mod status;
