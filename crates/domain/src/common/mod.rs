//! Common utility functions shared across the domain.
//!
//! # Design Principles
//!
//! - **Pure functions only** - no side effects, no I/O
//! - **Deterministic** - nothing here reads the wall clock

pub mod datetime;

// Re-export commonly used functions at crate root for convenience
pub use datetime::{
    format_short_time, is_iso_timestamp, iso_string, offset_by_seconds, parse_datetime,
    seconds_for_duration_shorthand,
};
