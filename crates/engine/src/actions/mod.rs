//! Action implementations.
//!
//! Each action kind turns its prepared params into result ops. Implementations
//! never touch storage and never see other actions; the pipeline folds their
//! ops into the running context.

mod audio;
mod calls;
mod email;
mod messages;
mod scenes;
mod values;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tripkit_domain::{ActionKind, Context, Event, ResultOp, Script};

use crate::error::EngineError;

/// Everything an action implementation may read.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub script: &'a Script,
    /// Trip state with the action's event merged in
    pub context: &'a Context,
    pub event: Option<&'a Event>,
    pub evaluate_at: DateTime<Utc>,
    pub timezone: Tz,
}

impl ActionContext<'_> {
    /// Player id for a role, or null when the player is unknown.
    fn player_id(&self, role_name: &str) -> Value {
        self.context
            .get(role_name)
            .and_then(|player| player.get("id"))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

fn param<'p>(params: &'p Map<String, Value>, key: &str) -> &'p str {
    params.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn fields(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Produce the ops for one action.
pub fn ops_for_action(
    kind: ActionKind,
    params: &Map<String, Value>,
    cx: &ActionContext<'_>,
) -> Result<Vec<ResultOp>, EngineError> {
    let ops = match kind {
        ActionKind::SignalCue => Vec::new(),
        ActionKind::SetValue => values::set_value(params, cx),
        ActionKind::IncrementValue => values::increment_value(params, cx),
        ActionKind::StartScene => scenes::start_scene(params, cx),
        ActionKind::SendToPage => scenes::send_to_page(params),
        ActionKind::CustomMessage => messages::custom_message(params, cx),
        ActionKind::SendMessage => messages::send_message(params, cx)?,
        ActionKind::InitiateCall => calls::initiate_call(params),
        ActionKind::AddToCall => calls::add_to_call(params, cx),
        ActionKind::PlayClip => calls::play_clip(params, cx)?,
        ActionKind::SendEmail => email::send_email(params, cx)?,
        ActionKind::PlayAudio => audio::play_audio(params, cx),
        ActionKind::PauseAudio => audio::pause_audio(cx),
        ActionKind::ResumeAudio => audio::resume_audio(cx),
        ActionKind::StopAudio => audio::stop_audio(),
    };
    Ok(ops)
}
