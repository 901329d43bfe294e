//! Messages between roles.

use serde_json::{Map, Value};
use tripkit_domain::common::iso_string;
use tripkit_domain::value_objects::{as_integer, as_number, number_value};
use tripkit_domain::{render, LogLevel, ResultOp};

use super::{fields, param, ActionContext};
use crate::error::EngineError;

fn optional_number(params: &Map<String, Value>, key: &str) -> Value {
    params
        .get(key)
        .and_then(as_number)
        .map(number_value)
        .unwrap_or(Value::Null)
}

/// A message written inline. Replies are needed when a participant writes to
/// an actor.
pub(super) fn custom_message(params: &Map<String, Value>, cx: &ActionContext<'_>) -> Vec<ResultOp> {
    let from = param(params, "from_role_name");
    let to = param(params, "to_role_name");
    let medium = param(params, "message_medium");
    let from_actor = cx.script.role(from).is_some_and(|role| role.actor);
    let to_actor = cx.script.role(to).is_some_and(|role| role.actor);

    vec![ResultOp::CreateMessage {
        suppress_relay_id: params
            .get("suppress_relay_id")
            .and_then(as_integer),
        fields: fields([
            ("sentById", cx.player_id(from)),
            ("sentToId", cx.player_id(to)),
            ("createdAt", Value::String(iso_string(cx.evaluate_at))),
            ("medium", Value::String(medium.to_string())),
            (
                "content",
                Value::String(param(params, "message_content").to_string()),
            ),
            ("sentFromLatitude", optional_number(params, "location_latitude")),
            ("sentFromLongitude", optional_number(params, "location_longitude")),
            ("sentFromAccuracy", optional_number(params, "location_accuracy")),
            ("isReplyNeeded", Value::Bool(to_actor && !from_actor)),
            ("isInGallery", Value::Bool(medium == "image")),
        ]),
    }]
}

/// A pre-authored message, rendered against the trip. Sends nothing when
/// neither the params nor the template name a recipient.
pub(super) fn send_message(
    params: &Map<String, Value>,
    cx: &ActionContext<'_>,
) -> Result<Vec<ResultOp>, EngineError> {
    let message_name = param(params, "message_name");
    let Some(template) = cx.script.message(message_name) else {
        return Ok(vec![ResultOp::log(
            LogLevel::Error,
            format!("Could not find message named \"{message_name}\"."),
        )]);
    };
    let to = match params.get("to_role_name").and_then(Value::as_str) {
        Some(to) => to,
        None => match template.to.as_deref() {
            Some(to) => to,
            None => return Ok(Vec::new()),
        },
    };
    let content = render(cx.context, &template.content, cx.timezone)?;
    let created_at = Value::String(iso_string(cx.evaluate_at));
    let read_at = if template.read {
        created_at.clone()
    } else {
        Value::Null
    };

    Ok(vec![ResultOp::CreateMessage {
        suppress_relay_id: None,
        fields: fields([
            ("sentById", cx.player_id(&template.from)),
            ("sentToId", cx.player_id(to)),
            ("createdAt", created_at),
            ("readAt", read_at),
            ("messageName", Value::String(message_name.to_string())),
            ("medium", Value::String(template.medium.clone())),
            ("content", Value::String(content)),
        ]),
    }])
}
