//! Trip context - the evaluable state of a running trip
//!
//! A context is a JSON object. Player state lives under each role name, trip
//! values sit at the top level, and `schedule` / `history` hold timestamps by
//! name. While an event is being processed it is visible under `event`.
//!
//! Every mutation helper returns a new context; callers holding the old one
//! keep seeing the old state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::events::Event;

const EVENT_KEY: &str = "event";
const HISTORY_KEY: &str = "history";
const SCHEDULE_KEY: &str = "schedule";
const CURRENT_SCENE_KEY: &str = "currentSceneName";

/// Evaluable trip state, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a context from any JSON value. Non-objects yield an empty context.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a dotted path such as `Farmer.id` or `items.0.name`.
    ///
    /// Returns `None` as soon as any segment is missing. Numeric segments
    /// index into arrays.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Copy of this context with a single top-level key replaced.
    pub fn with_value(&self, key: impl Into<String>, value: Value) -> Self {
        let mut map = self.0.clone();
        map.insert(key.into(), value);
        Self(map)
    }

    /// Copy of this context with `event` set to the given event (or null).
    pub fn with_event(&self, event: Option<&Event>) -> Self {
        let value = event
            .and_then(|e| serde_json::to_value(e).ok())
            .unwrap_or(Value::Null);
        self.with_value(EVENT_KEY, value)
    }

    /// Shallow-merge fields into the top level.
    pub fn merge_fields(&self, fields: &Map<String, Value>) -> Self {
        let mut map = self.0.clone();
        for (key, value) in fields {
            map.insert(key.clone(), value.clone());
        }
        Self(map)
    }

    /// Shallow-merge fields into the player object stored under `role_name`.
    pub fn merge_player_fields(&self, role_name: &str, fields: &Map<String, Value>) -> Self {
        let mut player = match self.0.get(role_name) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        for (key, value) in fields {
            player.insert(key.clone(), value.clone());
        }
        self.with_value(role_name, Value::Object(player))
    }

    /// Shallow-merge entries into `history`.
    pub fn merge_history(&self, entries: &Map<String, Value>) -> Self {
        let mut history = match self.0.get(HISTORY_KEY) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        for (key, value) in entries {
            history.insert(key.clone(), value.clone());
        }
        self.with_value(HISTORY_KEY, Value::Object(history))
    }

    /// True when `history` records a firing for the given trigger.
    pub fn has_fired(&self, trigger_name: &str) -> bool {
        match self.0.get(HISTORY_KEY) {
            Some(Value::Object(history)) => history
                .get(trigger_name)
                .is_some_and(crate::value_objects::is_truthy),
            _ => false,
        }
    }

    pub fn schedule_entry(&self, name: &str) -> Option<&str> {
        match self.0.get(SCHEDULE_KEY) {
            Some(Value::Object(schedule)) => schedule.get(name).and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.0.get(CURRENT_SCENE_KEY).and_then(Value::as_str)
    }

    /// Type of the event currently merged into the context, if any.
    pub fn event_type(&self) -> Option<&str> {
        match self.0.get(EVENT_KEY) {
            Some(Value::Object(event)) => event.get("type").and_then(Value::as_str),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
