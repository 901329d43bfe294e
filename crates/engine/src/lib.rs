//! Tripkit engine library.
//!
//! Applies actions and events to a running trip and reports what changed.
//!
//! ## Structure
//!
//! - `actions/` - Op-producing implementation of every action kind
//! - `use_cases/` - The cascade pipeline, validation and the file runner
//! - `infrastructure/` - Clock port and settings

pub mod actions;
pub mod error;
pub mod infrastructure;
pub mod use_cases;

pub use error::EngineError;
pub use infrastructure::settings::EngineSettings;
pub use use_cases::{Pipeline, Runner};
