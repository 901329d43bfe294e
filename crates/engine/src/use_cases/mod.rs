//! Use cases - applying actions and events to a trip, and checking scripts.

pub mod pipeline;
pub mod runner;
pub mod validation;

pub use pipeline::Pipeline;
pub use runner::Runner;
pub use validation::{check_action, precheck_script, precheck_trigger, validate_action_at_run};
