//! Phone call actions.

use serde_json::{Map, Value};
use tripkit_domain::{render, Event, ResultOp, TwimlClause};

use super::{param, ActionContext};
use crate::error::EngineError;

const DEFAULT_VOICE: &str = "alice";
const DEFAULT_QUERY_TYPE: &str = "normal";

pub(super) fn initiate_call(params: &Map<String, Value>) -> Vec<ResultOp> {
    vec![ResultOp::InitiateCall {
        to_role_name: param(params, "to_role_name").to_string(),
        as_role_name: param(params, "as_role_name").to_string(),
        detect_voicemail: param(params, "detect_voicemail") == "detect_voicemail",
    }]
}

/// Dial a role into the call that set off this action. On an incoming call
/// the caller is `from`; on an answered outgoing call it is `to`.
pub(super) fn add_to_call(params: &Map<String, Value>, cx: &ActionContext<'_>) -> Vec<ResultOp> {
    let from_role_name = match cx.event {
        Some(Event::CallReceived { from, .. }) => from,
        Some(Event::CallAnswered { to, .. }) => to,
        _ => return Vec::new(),
    };
    vec![ResultOp::Twiml(TwimlClause::Dial {
        from_role_name: from_role_name.clone(),
        to_role_name: param(params, "role_name").to_string(),
    })]
}

/// Play a clip's recording, or read its transcript aloud. Clips with a query
/// wrap that in a gather.
pub(super) fn play_clip(
    params: &Map<String, Value>,
    cx: &ActionContext<'_>,
) -> Result<Vec<ResultOp>, EngineError> {
    let Some(clip) = cx.script.clip(param(params, "clip_name")) else {
        return Ok(Vec::new());
    };
    let play = match &clip.path {
        Some(path) => TwimlClause::Play { media: path.clone() },
        None => TwimlClause::Say {
            voice: clip.voice.clone().unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            message: render(
                cx.context,
                clip.transcript.as_deref().unwrap_or_default(),
                cx.timezone,
            )?,
        },
    };
    let clause = match &clip.query {
        Some(query) => TwimlClause::Gather {
            query_name: query.name.clone(),
            query_type: query
                .query_type
                .clone()
                .unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string()),
            query_hints: query.hints.clone(),
            subclause: Box::new(play),
        },
        None => play,
    };
    Ok(vec![ResultOp::Twiml(clause)])
}
