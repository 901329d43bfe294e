//! Port traits for infrastructure boundaries.
//!
//! The engine core is pure. The only outside dependency it needs injected is
//! the current time, for hosts that apply actions "now".

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
