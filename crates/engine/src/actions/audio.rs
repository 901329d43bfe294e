//! Trip-wide audio playback.
//!
//! Playback state lives in trip values (`audio_*`). Every change is followed
//! by an `updateAudio` op so players resync.

use serde_json::{Map, Value};
use tripkit_domain::common::{iso_string, parse_datetime};
use tripkit_domain::value_objects::{as_number, is_truthy, number_value};
use tripkit_domain::ResultOp;

use super::{fields, param, ActionContext};

fn with_update(values: Map<String, Value>) -> Vec<ResultOp> {
    vec![ResultOp::UpdateTripValues { values }, ResultOp::UpdateAudio]
}

fn value(cx: &ActionContext<'_>, key: &str) -> Value {
    cx.context.get(key).cloned().unwrap_or(Value::Null)
}

pub(super) fn play_audio(params: &Map<String, Value>, cx: &ActionContext<'_>) -> Vec<ResultOp> {
    let Some(audio) = cx.script.audio(param(params, "audio_name")) else {
        return Vec::new();
    };
    with_update(fields([
        ("audio_name", Value::String(audio.name.clone())),
        ("audio_role", Value::String(param(params, "role_name").to_string())),
        ("audio_path", Value::String(audio.path.clone())),
        ("audio_started_at", Value::String(iso_string(cx.evaluate_at))),
        ("audio_started_time", number_value(0.0)),
        ("audio_paused_time", Value::Null),
        ("audio_is_playing", Value::Bool(true)),
    ]))
}

/// Pause, remembering how far into the track playback had got.
pub(super) fn pause_audio(cx: &ActionContext<'_>) -> Vec<ResultOp> {
    if !is_truthy(&value(cx, "audio_is_playing")) {
        return Vec::new();
    }
    let started_time = as_number(&value(cx, "audio_started_time")).unwrap_or(0.0);
    let elapsed = value(cx, "audio_started_at")
        .as_str()
        .and_then(|s| parse_datetime(s).ok())
        .map(|started_at| (cx.evaluate_at.timestamp() - started_at.timestamp()) as f64)
        .unwrap_or(0.0);
    with_update(fields([
        ("audio_is_playing", Value::Bool(false)),
        ("audio_paused_time", number_value(started_time + elapsed)),
    ]))
}

/// Resume from the paused position. Does nothing unless paused.
pub(super) fn resume_audio(cx: &ActionContext<'_>) -> Vec<ResultOp> {
    if is_truthy(&value(cx, "audio_is_playing")) {
        return Vec::new();
    }
    let paused_time = value(cx, "audio_paused_time");
    if !is_truthy(&paused_time) {
        return Vec::new();
    }
    with_update(fields([
        ("audio_is_playing", Value::Bool(true)),
        ("audio_started_at", Value::String(iso_string(cx.evaluate_at))),
        ("audio_started_time", paused_time),
        ("audio_paused_time", Value::Null),
    ]))
}

pub(super) fn stop_audio() -> Vec<ResultOp> {
    with_update(fields([
        ("audio_name", Value::Null),
        ("audio_role", Value::Null),
        ("audio_path", Value::Null),
        ("audio_started_at", Value::Null),
        ("audio_started_time", Value::Null),
        ("audio_paused_time", Value::Null),
        ("audio_is_playing", Value::Bool(false)),
    ]))
}
