//! Action phrases
//!
//! A phrase is a compact action written as text, optionally led by a
//! modifier before the first top-level comma:
//!
//! - `in 3m, signal_cue CUE-1`
//! - `at schedule.DINNER, send_message WELCOME`
//! - `1m after schedule.DINNER, start_scene AFTER-DINNER`
//! - `if Farmer.ready, send_to_page Farmer PAGE-2`
//!
//! Time modifiers set when the action runs. An `if` modifier never affects
//! timing; it is handed back for the caller to evaluate.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::actions::{Action, ActionKind};
use crate::common::{
    is_iso_timestamp, offset_by_seconds, parse_datetime, seconds_for_duration_shorthand,
};
use crate::error::DomainError;
use crate::eval::split_words;
use crate::value_objects::{lookup_str, Context};

/// Leading part of a phrase, before its comma
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier<'a> {
    /// Statement following the `if` keyword
    If(&'a str),
    /// Time shorthand
    When(&'a str),
}

/// A plain phrase bound to its action kind
#[derive(Debug, Clone, PartialEq)]
pub struct PlainAction {
    pub kind: ActionKind,
    pub params: Map<String, Value>,
}

/// A phrase expanded into a concrete action
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedAction {
    /// Statement from an `if` modifier
    pub condition: Option<String>,
    pub action: Action,
}

/// Split a phrase into its modifier (if any) and the plain action phrase.
///
/// Commas inside double quotes do not split.
pub fn extract_modifier(phrase: &str) -> (Option<Modifier<'_>>, &str) {
    let mut in_quote = false;
    let mut split_at = None;
    for (i, c) in phrase.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            ',' if !in_quote => {
                split_at = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(i) = split_at else {
        return (None, phrase.trim());
    };
    let modifier = phrase[..i].trim();
    let plain = phrase[i + 1..].trim();

    let mut words = modifier.splitn(2, char::is_whitespace);
    let first = words.next().unwrap_or_default();
    if first.eq_ignore_ascii_case("if") {
        let statement = words.next().unwrap_or_default().trim();
        return (Some(Modifier::If(statement)), plain);
    }
    (Some(Modifier::When(modifier)), plain)
}

fn resolve_time_ref(context: &Context, reference: &str) -> Result<DateTime<Utc>, DomainError> {
    let resolved = match lookup_str(context, reference) {
        Value::String(s) => s,
        Value::Null if is_iso_timestamp(reference) => reference.to_string(),
        _ => return Err(DomainError::UnresolvedTime(reference.to_string())),
    };
    parse_datetime(&resolved).map_err(|_| DomainError::UnresolvedTime(reference.to_string()))
}

fn shift(
    shorthand: &str,
    base: DateTime<Utc>,
    duration: &str,
    sign: f64,
) -> Result<DateTime<Utc>, DomainError> {
    offset_by_seconds(base, sign * seconds_for_duration_shorthand(duration))
        .ok_or_else(|| DomainError::malformed_phrase(shorthand, "time offset is out of range"))
}

/// Resolve a time shorthand relative to `evaluate_at`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tripkit_domain::rules::time_for_shorthand;
/// use tripkit_domain::Context;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let at = time_for_shorthand("in 3m", now, &Context::new()).unwrap();
/// assert_eq!(at, Utc.with_ymd_and_hms(2024, 1, 1, 12, 3, 0).unwrap());
/// ```
pub fn time_for_shorthand(
    shorthand: &str,
    evaluate_at: DateTime<Utc>,
    context: &Context,
) -> Result<DateTime<Utc>, DomainError> {
    let words = split_words(shorthand)?;
    let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    match lowered.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["in", _] => shift(shorthand, evaluate_at, &words[1], 1.0),
        ["at", _] => resolve_time_ref(context, &words[1]),
        [_, "after", _] => shift(shorthand, resolve_time_ref(context, &words[2])?, &words[0], 1.0),
        [_, "before", _] => shift(shorthand, resolve_time_ref(context, &words[2])?, &words[0], -1.0),
        _ => Err(DomainError::malformed_phrase(
            shorthand,
            "time modifier should be \"in <duration>\", \"at <time>\", or \"<duration> after|before <time>\"",
        )),
    }
}

/// Bind the words of a plain phrase to its action's phrase form.
///
/// Extra words are ignored; missing ones are left for validation to report.
pub fn expand_plain_phrase(plain: &str) -> Result<PlainAction, DomainError> {
    let words = split_words(plain)?;
    let Some((name, args)) = words.split_first() else {
        return Err(DomainError::malformed_phrase(plain, "phrase is empty"));
    };
    let kind: ActionKind = name.parse()?;
    let params = kind
        .phrase_form()
        .iter()
        .zip(args)
        .map(|(param, arg)| (param.to_string(), Value::String(arg.clone())))
        .collect();
    Ok(PlainAction { kind, params })
}

/// Expand a full phrase into an action scheduled relative to `evaluate_at`.
pub fn expand_action_phrase(
    phrase: &str,
    evaluate_at: DateTime<Utc>,
    context: &Context,
) -> Result<ExpandedAction, DomainError> {
    let (modifier, plain) = extract_modifier(phrase);
    let PlainAction { kind, params } = expand_plain_phrase(plain)?;
    let (condition, schedule_at) = match modifier {
        None => (None, evaluate_at),
        Some(Modifier::If(statement)) => (Some(statement.to_string()), evaluate_at),
        Some(Modifier::When(shorthand)) => (None, time_for_shorthand(shorthand, evaluate_at, context)?),
    };
    Ok(ExpandedAction {
        condition,
        action: Action::new(kind.as_str(), params, schedule_at),
    })
}
