//! Text templating
//!
//! Supports `{{path}}` interpolation and single-level
//! `{% if COND %}A{% else %}B{% endif %}` blocks. Raw values get special
//! formatting before interpolation: null renders empty, booleans as Yes/No,
//! UTC timestamps as short local times, and ten-digit strings as phone
//! numbers.

use std::sync::LazyLock;

use chrono_tz::Tz;
use regex_lite::{Captures, Regex};
use serde_json::Value;

use super::evaluate;
use crate::common::{format_short_time, is_iso_timestamp, parse_datetime};
use crate::error::DomainError;
use crate::value_objects::{lookup_str, number_to_string, Context};

static INTERPOLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w\-.:]+)\s*\}\}").expect("valid regex"));
static IF_ELSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{%\s*if\s+(.+?)\s*%\}(.*?)(?:\{%\s*else\s*%\}(.*?))?\{%\s*endif\s*%\}")
        .expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

/// Interpolated values may themselves contain templates; stop expanding past this.
const MAX_RENDER_DEPTH: usize = 16;

/// Render a raw value as display text.
pub fn render_value(context: &Context, value: &Value, tz: Tz) -> Result<String, DomainError> {
    render_at_depth(context, value, tz, 0)
}

/// Render template text.
pub fn render(context: &Context, text: &str, tz: Tz) -> Result<String, DomainError> {
    render_text(context, text, tz, 0)
}

fn render_at_depth(context: &Context, value: &Value, tz: Tz, depth: usize) -> Result<String, DomainError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(true) => Ok("Yes".to_string()),
        Value::Bool(false) => Ok("No".to_string()),
        Value::Number(n) => Ok(number_to_string(n)),
        Value::String(s) => render_text(context, s, tz, depth),
        composite => Ok(composite.to_string()),
    }
}

fn render_text(context: &Context, text: &str, tz: Tz, depth: usize) -> Result<String, DomainError> {
    if is_iso_timestamp(text) {
        if let Ok(dt) = parse_datetime(text) {
            return Ok(format_short_time(dt, tz));
        }
    }
    if PHONE_RE.is_match(text) {
        return Ok(format!("({}) {}-{}", &text[..3], &text[3..6], &text[6..]));
    }
    if depth >= MAX_RENDER_DEPTH {
        return Ok(text.to_string());
    }

    let interpolated = replace_all(&INTERPOLATE_RE, text, |caps| {
        let path = caps.get(1).map_or("", |m| m.as_str());
        render_at_depth(context, &lookup_str(context, path), tz, depth + 1)
    })?;

    replace_all(&IF_ELSE_RE, &interpolated, |caps| {
        let condition = caps.get(1).map_or("", |m| m.as_str());
        let branch = if evaluate(context, condition)? { 2 } else { 3 };
        Ok(caps.get(branch).map_or("", |m| m.as_str()).to_string())
    })
}

/// `Regex::replace_all` with a fallible replacer.
fn replace_all<F>(re: &Regex, text: &str, mut replacer: F) -> Result<String, DomainError>
where
    F: FnMut(&Captures<'_>) -> Result<String, DomainError>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacer(&caps)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}
