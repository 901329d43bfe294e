//! Engine settings.
//!
//! Settings start from their defaults and are overridden from the
//! environment. Invalid overrides are logged and ignored.

use chrono_tz::Tz;
use serde::Deserialize;

pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 32;

const TIMEZONE_VAR: &str = "TRIPKIT_TIMEZONE";
const MAX_CASCADE_DEPTH_VAR: &str = "TRIPKIT_MAX_CASCADE_DEPTH";
const LOG_VAR: &str = "TRIPKIT_LOG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Zone used when rendering times into text
    pub timezone: Tz,
    /// Deepest event -> trigger -> action nesting allowed in one pass
    pub max_cascade_depth: usize,
    /// Tracing filter directive, overriding `RUST_LOG`
    pub log_filter: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
            log_filter: None,
        }
    }
}

impl EngineSettings {
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_max_cascade_depth(mut self, max_cascade_depth: usize) -> Self {
        self.max_cascade_depth = max_cascade_depth;
        self
    }

    /// Defaults overridden from process environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Supported variables:
    /// - TRIPKIT_TIMEZONE: IANA zone name, e.g. `America/Los_Angeles`
    /// - TRIPKIT_MAX_CASCADE_DEPTH: positive integer
    /// - TRIPKIT_LOG: tracing filter directive
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup(TIMEZONE_VAR) {
            match val.parse::<Tz>() {
                Ok(timezone) => {
                    self.timezone = timezone;
                    tracing::info!(timezone = %timezone, "Applied TRIPKIT_TIMEZONE environment variable");
                }
                Err(_) => {
                    tracing::warn!(val = %val, "TRIPKIT_TIMEZONE is not a known timezone, ignoring");
                }
            }
        }

        if let Some(val) = lookup(MAX_CASCADE_DEPTH_VAR) {
            match val.parse::<usize>() {
                Ok(depth) if depth > 0 => {
                    self.max_cascade_depth = depth;
                    tracing::info!(depth, "Applied TRIPKIT_MAX_CASCADE_DEPTH environment variable");
                }
                Ok(depth) => {
                    tracing::warn!(depth, "TRIPKIT_MAX_CASCADE_DEPTH must be positive, ignoring");
                }
                Err(_) => {
                    tracing::warn!(
                        val = %val,
                        "TRIPKIT_MAX_CASCADE_DEPTH is not a valid integer, ignoring"
                    );
                }
            }
        }

        if let Some(filter) = log_filter_override(&lookup) {
            self.log_filter = Some(filter);
        }

        self
    }
}

/// TRIPKIT_LOG from process environment variables.
///
/// Read on its own so logging can be set up before the other settings are
/// applied and their overrides logged.
pub fn log_filter_from_env() -> Option<String> {
    log_filter_override(|key| std::env::var(key).ok())
}

fn log_filter_override(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let val = lookup(LOG_VAR)?;
    let val = val.trim();
    (!val.is_empty()).then(|| val.to_string())
}
