//! Result ops and action results
//!
//! A [`ResultOp`] is a replayable instruction for whatever applies trip state
//! to storage. The engine never touches storage itself; it folds each op into
//! the running [`Context`] so later steps see its effect, and hands the
//! ordered list back to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Action;
use crate::value_objects::Context;

// ============================================================================
// Result Ops
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailParams {
    /// Inbox address
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub cc: Option<Vec<String>>,
    #[serde(default)]
    pub bcc: Option<Vec<String>>,
    pub subject: String,
    pub body_markdown: String,
}

/// Call-control instruction for the telephony layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "clause", rename_all = "camelCase")]
pub enum TwimlClause {
    #[serde(rename_all = "camelCase")]
    Dial {
        from_role_name: String,
        to_role_name: String,
    },
    Play {
        media: String,
    },
    Say {
        voice: String,
        message: String,
    },
    /// Play the subclause and collect a response
    #[serde(rename_all = "camelCase")]
    Gather {
        query_name: String,
        query_type: String,
        query_hints: Option<Vec<String>>,
        subclause: Box<TwimlClause>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ResultOp {
    UpdateTripFields {
        fields: Map<String, Value>,
    },
    UpdateTripValues {
        values: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    UpdatePlayerFields {
        role_name: String,
        fields: Map<String, Value>,
    },
    /// Trigger name to the ISO time it fired
    UpdateTripHistory {
        history: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    CreateMessage {
        #[serde(default)]
        suppress_relay_id: Option<i64>,
        fields: Map<String, Value>,
    },
    Twiml(TwimlClause),
    #[serde(rename_all = "camelCase")]
    InitiateCall {
        to_role_name: String,
        as_role_name: String,
        detect_voicemail: bool,
    },
    SendEmail {
        params: EmailParams,
    },
    /// Audio values changed; players should resync
    UpdateAudio,
    Log {
        level: LogLevel,
        message: String,
    },
}

impl ResultOp {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Fold this op's effect into a context.
    ///
    /// Must stay in step with the external applier: ops that only produce
    /// side effects (messages, calls, email, logs) leave the context as is.
    pub fn apply_to(&self, context: &Context) -> Context {
        match self {
            Self::UpdateTripFields { fields } => context.merge_fields(fields),
            Self::UpdateTripValues { values } => context.merge_fields(values),
            Self::UpdatePlayerFields { role_name, fields } => {
                context.merge_player_fields(role_name, fields)
            }
            Self::UpdateTripHistory { history } => context.merge_history(history),
            Self::CreateMessage { .. }
            | Self::Twiml(_)
            | Self::InitiateCall { .. }
            | Self::SendEmail { .. }
            | Self::UpdateAudio
            | Self::Log { .. } => context.clone(),
        }
    }
}

/// Replay ops in order against a context.
pub fn replay<'a>(context: &Context, ops: impl IntoIterator<Item = &'a ResultOp>) -> Context {
    ops.into_iter()
        .fold(context.clone(), |acc, op| op.apply_to(&acc))
}

// ============================================================================
// Action Result
// ============================================================================

/// Outcome of a pipeline pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub next_context: Context,
    pub result_ops: Vec<ResultOp>,
    pub scheduled_actions: Vec<Action>,
}

impl ActionResult {
    /// A result that changes nothing.
    pub fn initial(context: Context) -> Self {
        Self {
            next_context: context,
            result_ops: Vec::new(),
            scheduled_actions: Vec::new(),
        }
    }

    /// Fold ops into the context and keep them as the result.
    pub fn from_ops(context: &Context, ops: Vec<ResultOp>) -> Self {
        Self {
            next_context: replay(context, &ops),
            result_ops: ops,
            scheduled_actions: Vec::new(),
        }
    }

    /// Append another result: its context wins, ops and scheduled actions
    /// are appended in order.
    pub fn concat(mut self, other: ActionResult) -> Self {
        self.next_context = other.next_context;
        self.result_ops.extend(other.result_ops);
        self.scheduled_actions.extend(other.scheduled_actions);
        self
    }

    /// Append an op and fold it into the running context.
    pub fn push_op(mut self, op: ResultOp) -> Self {
        self.next_context = op.apply_to(&self.next_context);
        self.result_ops.push(op);
        self
    }

    /// Defer an action without touching the context.
    pub fn schedule(mut self, action: Action) -> Self {
        self.scheduled_actions.push(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn ops_are_tagged_by_operation() {
            let op = ResultOp::UpdatePlayerFields {
                role_name: "Farmer".to_string(),
                fields: map(json!({"currentPageName": "P1"})),
            };
            assert_eq!(
                serde_json::to_value(&op).unwrap(),
                json!({
                    "operation": "updatePlayerFields",
                    "roleName": "Farmer",
                    "fields": {"currentPageName": "P1"}
                })
            );
            assert_eq!(
                serde_json::to_value(&ResultOp::UpdateAudio).unwrap(),
                json!({"operation": "updateAudio"})
            );
        }

        #[test]
        fn twiml_nests_clause_tag() {
            let op = ResultOp::Twiml(TwimlClause::Gather {
                query_name: "Q".to_string(),
                query_type: "normal".to_string(),
                query_hints: None,
                subclause: Box::new(TwimlClause::Play {
                    media: "a.mp3".to_string(),
                }),
            });
            let value = serde_json::to_value(&op).unwrap();
            assert_eq!(
                value,
                json!({
                    "operation": "twiml",
                    "clause": "gather",
                    "queryName": "Q",
                    "queryType": "normal",
                    "queryHints": null,
                    "subclause": {"clause": "play", "media": "a.mp3"}
                })
            );
            let back: ResultOp = serde_json::from_value(value).unwrap();
            assert_eq!(back, op);
        }
    }

    mod folding {
        use super::*;

        #[test]
        fn state_ops_merge_into_context() {
            let ctx = Context::from_value(json!({"Farmer": {"id": 1}, "history": {"A": "x"}}));
            let ops = vec![
                ResultOp::UpdateTripFields {
                    fields: map(json!({"currentSceneName": "S2"})),
                },
                ResultOp::UpdateTripValues {
                    values: map(json!({"score": 3})),
                },
                ResultOp::UpdatePlayerFields {
                    role_name: "Farmer".to_string(),
                    fields: map(json!({"currentPageName": "P"})),
                },
                ResultOp::UpdateTripHistory {
                    history: map(json!({"B": "y"})),
                },
            ];
            let next = replay(&ctx, &ops);
            assert_eq!(
                next,
                Context::from_value(json!({
                    "Farmer": {"id": 1, "currentPageName": "P"},
                    "history": {"A": "x", "B": "y"},
                    "currentSceneName": "S2",
                    "score": 3
                }))
            );
        }

        #[test]
        fn side_effect_ops_leave_context() {
            let ctx = Context::from_value(json!({"a": 1}));
            let op = ResultOp::log(LogLevel::Error, "boom");
            assert_eq!(op.apply_to(&ctx), ctx);
        }
    }

    mod results {
        use super::*;

        #[test]
        fn concat_takes_later_context_and_appends() {
            let first = ActionResult::from_ops(
                &Context::new(),
                vec![ResultOp::UpdateTripValues {
                    values: map(json!({"a": 1})),
                }],
            );
            let second = ActionResult::from_ops(
                &first.next_context,
                vec![ResultOp::UpdateTripValues {
                    values: map(json!({"b": 2})),
                }],
            );
            let combined = first.concat(second);
            assert_eq!(combined.result_ops.len(), 2);
            assert_eq!(combined.next_context, Context::from_value(json!({"a": 1, "b": 2})));
        }

        #[test]
        fn push_op_folds_immediately() {
            let result = ActionResult::initial(Context::new()).push_op(ResultOp::UpdateTripHistory {
                history: map(json!({"T": "2024-01-01T00:00:00.000Z"})),
            });
            assert!(result.next_context.has_fired("T"));
        }
    }
}
