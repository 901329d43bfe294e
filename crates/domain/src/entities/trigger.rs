//! Trigger - a named rule that listens for events and resolves to actions
//!
//! A trigger body is a clause: an optional condition, the actions to run when
//! it holds, ordered `elseifs`, and an `else`. Action lists may nest further
//! clauses, which flatten into their parent's sequence when resolved.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::events::TriggerEvent;
use crate::value_objects::IfStatement;

// ============================================================================
// Action Nodes
// ============================================================================

/// An action written as an object instead of a phrase
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredAction {
    pub name: String,
    pub params: Map<String, Value>,
}

/// One entry of an authored action list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum ActionNode {
    /// `"in 3m, signal_cue CUE-1"`
    Phrase(String),
    /// `{"name": "signal_cue", "params": {"cue_name": "CUE-1"}}`
    Structured(StructuredAction),
    /// Nested conditional
    Clause(Box<Clause>),
}

impl ActionNode {
    pub fn phrase(text: impl Into<String>) -> Self {
        Self::Phrase(text.into())
    }
}

impl TryFrom<Value> for ActionNode {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(phrase) => Ok(Self::Phrase(phrase)),
            Value::Object(map) if map.contains_key("actions") || map.contains_key("if") => {
                let clause: Clause = serde_json::from_value(Value::Object(map))
                    .map_err(|e| DomainError::malformed_phrase("<clause>", e.to_string()))?;
                Ok(Self::Clause(Box::new(clause)))
            }
            Value::Object(mut map) => {
                let name = match map.remove("name") {
                    Some(Value::String(name)) => name,
                    _ => {
                        return Err(DomainError::malformed_phrase(
                            Value::Object(map).to_string(),
                            "structured action needs a \"name\"",
                        ))
                    }
                };
                let params = match map.remove("params") {
                    Some(Value::Object(params)) => params,
                    None | Some(Value::Null) => Map::new(),
                    Some(_) => {
                        return Err(DomainError::malformed_phrase(
                            name,
                            "\"params\" must be an object",
                        ))
                    }
                };
                Ok(Self::Structured(StructuredAction { name, params }))
            }
            other => Err(DomainError::malformed_phrase(
                other.to_string(),
                "expected a phrase, an action object or a clause",
            )),
        }
    }
}

/// Accept a single action or a list of actions.
fn action_list<'de, D>(deserializer: D) -> Result<Vec<ActionNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .map(|item| ActionNode::try_from(item).map_err(serde::de::Error::custom))
        .collect()
}

fn optional_action_list<'de, D>(deserializer: D) -> Result<Option<Vec<ActionNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    action_list(deserializer).map(Some)
}

// ============================================================================
// Clauses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElseIf {
    #[serde(rename = "if")]
    pub condition: IfStatement,
    #[serde(default, deserialize_with = "action_list")]
    pub actions: Vec<ActionNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Clause {
    #[serde(default, rename = "if")]
    pub condition: Option<IfStatement>,
    #[serde(default, deserialize_with = "action_list")]
    pub actions: Vec<ActionNode>,
    #[serde(default)]
    pub elseifs: Vec<ElseIf>,
    #[serde(default, rename = "else", deserialize_with = "optional_action_list")]
    pub otherwise: Option<Vec<ActionNode>>,
}

impl Clause {
    /// An unconditional clause running the given actions.
    pub fn of(actions: Vec<ActionNode>) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }
}

// ============================================================================
// Trigger
// ============================================================================

fn default_repeatable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trigger {
    pub name: String,
    /// Only active while this scene is active
    #[serde(default)]
    pub scene: Option<String>,
    /// Non-repeatable triggers fire at most once per trip
    #[serde(default = "default_repeatable")]
    pub repeatable: bool,
    #[serde(default)]
    pub events: Vec<TriggerEvent>,
    /// Condition, actions and branches. The condition also gates activity.
    #[serde(flatten)]
    pub body: Clause,
}

impl Trigger {
    pub fn condition(&self) -> Option<&IfStatement> {
        self.body.condition.as_ref()
    }
}
