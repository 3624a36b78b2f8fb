//! Entity write operations

pub mod register;

pub use register::{RegisterEntityCommand, RegisterEntityError, Registration};
