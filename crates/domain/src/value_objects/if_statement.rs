//! Authored `if` conditions
//!
//! A condition is normally a single statement string. A list of conditions
//! means all of them must hold, and `{"or": [...]}` means any of them.
//! Any other shape is rejected when the script is loaded.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum IfStatement {
    /// A statement in the condition language, e.g. `not (a or b)`
    Text(String),
    /// Every nested condition must pass
    All(Vec<IfStatement>),
    /// At least one nested condition must pass
    Any(Vec<IfStatement>),
}

impl IfStatement {
    pub fn text(statement: impl Into<String>) -> Self {
        Self::Text(statement.into())
    }

    /// Every statement string contained in this condition, in order.
    pub fn statements(&self) -> Vec<&str> {
        match self {
            Self::Text(s) => vec![s.as_str()],
            Self::All(items) | Self::Any(items) => {
                items.iter().flat_map(|item| item.statements()).collect()
            }
        }
    }
}

impl TryFrom<Value> for IfStatement {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::All),
            Value::Object(mut map) if map.len() == 1 && map.contains_key("or") => {
                match map.remove("or") {
                    Some(Value::Array(items)) => items
                        .into_iter()
                        .map(Self::try_from)
                        .collect::<Result<Vec<_>, _>>()
                        .map(Self::Any),
                    _ => Err(DomainError::illegal_statement(
                        "\"or\" condition must be a list",
                    )),
                }
            }
            other => Err(DomainError::illegal_statement(format!(
                "expected a string or list, got {other}"
            ))),
        }
    }
}

impl From<&str> for IfStatement {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
