//! File-based runner behind the `tripkit` binary.
//!
//! Loads a script, a trip context and one action or event from JSON files and
//! runs them through the pipeline.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tripkit_domain::common::iso_string;
use tripkit_domain::{Action, ActionResult, Context, Event, Script};

use crate::error::EngineError;
use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::pipeline::Pipeline;
use crate::use_cases::validation::precheck_script;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub struct Runner {
    settings: EngineSettings,
    clock: Arc<dyn ClockPort>,
}

impl Runner {
    pub fn new(settings: EngineSettings, clock: Arc<dyn ClockPort>) -> Self {
        Self { settings, clock }
    }

    /// Apply the action in `action_path`. Without `at`, the action runs now.
    ///
    /// An action file may leave out `scheduleAt`; it then defaults to the
    /// apply time.
    pub fn apply_action_file(
        &self,
        script_path: &Path,
        context_path: &Path,
        action_path: &Path,
        at: Option<DateTime<Utc>>,
    ) -> Result<ActionResult, EngineError> {
        let script: Script = read_json(script_path)?;
        let context: Context = read_json(context_path)?;
        let apply_at = at.unwrap_or_else(|| self.clock.now());

        let mut raw: Value = read_json(action_path)?;
        if let Value::Object(map) = &mut raw {
            map.entry("scheduleAt")
                .or_insert_with(|| Value::String(iso_string(apply_at)));
        }
        let action: Action = serde_json::from_value(raw)?;

        Pipeline::new(&script, &self.settings).apply_action(&action, &context, apply_at)
    }

    /// Apply the event in `event_path`. Without `at`, the event occurs now.
    pub fn apply_event_file(
        &self,
        script_path: &Path,
        context_path: &Path,
        event_path: &Path,
        at: Option<DateTime<Utc>>,
    ) -> Result<ActionResult, EngineError> {
        let script: Script = read_json(script_path)?;
        let context: Context = read_json(context_path)?;
        let event: Event = read_json(event_path)?;
        let apply_at = at.unwrap_or_else(|| self.clock.now());

        Pipeline::new(&script, &self.settings).apply_event(&event, &context, apply_at)
    }

    /// Static warnings for every trigger in a script file.
    pub fn check_file(&self, script_path: &Path) -> Result<Vec<String>, EngineError> {
        let script: Script = read_json(script_path)?;
        let warnings = precheck_script(&script);
        tracing::info!(
            triggers = script.triggers.len(),
            warnings = warnings.len(),
            "Checked script"
        );
        Ok(warnings)
    }
}
