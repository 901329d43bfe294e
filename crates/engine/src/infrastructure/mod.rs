//! Infrastructure implementations.
//!
//! Contains port trait implementations and host configuration.

pub mod clock;
pub mod ports;
pub mod settings;
