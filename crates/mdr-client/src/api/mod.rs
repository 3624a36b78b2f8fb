//! HTTP API client for the MDR server

pub mod client;

pub use client::{
    ApiClient, RegisterOutcome, RegistrationTransport, DEFAULT_API_TIMEOUT_SECS,
    DEFAULT_SERVER_URL,
};
