//! Scripted email.

use serde_json::{Map, Value};
use tripkit_domain::{render, EmailParams, LogLevel, ResultOp};

use super::{param, ActionContext};
use crate::error::EngineError;

/// Send an authored email from an inbox to a role's player. Anything missing
/// along the way is logged instead.
pub(super) fn send_email(
    params: &Map<String, Value>,
    cx: &ActionContext<'_>,
) -> Result<Vec<ResultOp>, EngineError> {
    let name = param(params, "email_name");
    let Some(email) = cx.script.email(name) else {
        return Ok(vec![ResultOp::log(
            LogLevel::Error,
            format!("Could not find email named \"{name}\"."),
        )]);
    };
    let Some(inbox) = cx.script.inbox(&email.from) else {
        return Ok(vec![ResultOp::log(
            LogLevel::Error,
            format!("Could not find inbox named \"{}\".", email.from),
        )]);
    };
    let Some(role) = cx.script.role(&email.to) else {
        return Ok(vec![ResultOp::log(
            LogLevel::Error,
            format!("Could not find role named \"{}\".", email.to),
        )]);
    };
    let Some(player) = cx.context.get(&role.name) else {
        return Ok(vec![ResultOp::log(
            LogLevel::Error,
            format!("Could not find player context for \"{}\".", role.name),
        )]);
    };
    let Some(address) = player.get("email").and_then(Value::as_str).filter(|a| !a.is_empty()) else {
        return Ok(vec![ResultOp::log(
            LogLevel::Warning,
            format!(
                "Tried to send email but player \"{}\" had no email address.",
                role.name
            ),
        )]);
    };

    Ok(vec![ResultOp::SendEmail {
        params: EmailParams {
            from: inbox.address.clone(),
            to: address.to_string(),
            cc: email.cc.clone(),
            bcc: email.bcc.clone(),
            subject: render(cx.context, &email.subject, cx.timezone)?,
            body_markdown: render(cx.context, &email.body, cx.timezone)?,
        },
    }])
}
