//! Reference resolution and value semantics for the condition language

use serde_json::{Number, Value};

use super::Context;

// ============================================================================
// Reference Resolution
// ============================================================================

/// Resolve a reference token against the context.
///
/// - booleans, numbers and null pass through
/// - numeric strings become numbers
/// - `true` / `false` / `null` become constants
/// - a single- or double-quoted token becomes the unquoted string
/// - anything else is a dotted path, defaulting to null when absent
pub fn lookup_ref(context: &Context, reference: &Value) -> Value {
    match reference {
        Value::Bool(_) | Value::Null | Value::Number(_) => reference.clone(),
        Value::String(s) => lookup_str(context, s),
        Value::Array(_) | Value::Object(_) => Value::Null,
    }
}

/// Resolve a reference token given as text. See [`lookup_ref`].
pub fn lookup_str(context: &Context, reference: &str) -> Value {
    if let Some(n) = parse_number(reference) {
        return number_value(n);
    }
    match reference {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Some(literal) = strip_quotes(reference) {
        return Value::String(literal.to_string());
    }
    context.lookup(reference).cloned().unwrap_or(Value::Null)
}

/// Strip a matching pair of single or double quotes.
pub fn strip_quotes(token: &str) -> Option<&str> {
    if token.len() < 2 {
        return None;
    }
    let quoted = (token.starts_with('"') && token.ends_with('"'))
        || (token.starts_with('\'') && token.ends_with('\''));
    quoted.then(|| &token[1..token.len() - 1])
}

// ============================================================================
// Numbers
// ============================================================================

/// Parse text the way a loosely-typed script expects numbers to parse.
///
/// Surrounding whitespace is ignored, blank text counts as zero, and `0x`
/// hex literals are accepted. Non-finite results are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    // Rust accepts spellings like "inf" and "NaN" that scripts never mean as numbers
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// JSON value for a number, preferring an integer representation.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Numeric reading of a value: numbers as-is, numeric strings parsed.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => parse_number(s),
        _ => None,
    }
}

/// Whole-number reading of a value. Fractions and values too large to hold
/// exactly are `None`.
pub fn as_integer(value: &Value) -> Option<i64> {
    let n = as_number(value)?;
    (n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
}

/// Text form of a number, without a trailing `.0` for whole values.
pub fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

// ============================================================================
// Truthiness and Equality
// ============================================================================

/// Loose truthiness: null, false, zero and the empty string are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strict equality: same type and same value. `"2"`, `2` and `true` all differ.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::from_value(json!({
            "a": true,
            "s": "hello",
            "player": {"name": "Jo", "score": 3},
        }))
    }

    mod lookup {
        use super::*;

        #[test]
        fn literals_pass_through() {
            let c = ctx();
            assert_eq!(lookup_ref(&c, &json!(true)), json!(true));
            assert_eq!(lookup_ref(&c, &json!(null)), json!(null));
            assert_eq!(lookup_ref(&c, &json!(4.5)), json!(4.5));
        }

        #[test]
        fn numeric_strings_become_numbers() {
            let c = ctx();
            assert_eq!(lookup_str(&c, "2"), json!(2));
            assert_eq!(lookup_str(&c, "-1.5"), json!(-1.5));
            assert_eq!(lookup_str(&c, "0x10"), json!(16));
        }

        #[test]
        fn constants() {
            let c = ctx();
            assert_eq!(lookup_str(&c, "true"), json!(true));
            assert_eq!(lookup_str(&c, "false"), json!(false));
            assert_eq!(lookup_str(&c, "null"), json!(null));
        }

        #[test]
        fn quoted_tokens_are_literals() {
            let c = ctx();
            assert_eq!(lookup_str(&c, "\"a b\""), json!("a b"));
            assert_eq!(lookup_str(&c, "'s'"), json!("s"));
        }

        #[test]
        fn paths_resolve_or_default_to_null() {
            let c = ctx();
            assert_eq!(lookup_str(&c, "player.name"), json!("Jo"));
            assert_eq!(lookup_str(&c, "player.missing"), json!(null));
            assert_eq!(lookup_str(&c, "nothing.at.all"), json!(null));
        }

        #[test]
        fn non_numeric_words_are_not_numbers() {
            assert_eq!(parse_number("inf"), None);
            assert_eq!(parse_number("NaN"), None);
            assert_eq!(parse_number("abc"), None);
            assert_eq!(parse_number("1e3"), Some(1000.0));
        }
    }

    mod semantics {
        use super::*;

        #[test]
        fn truthiness() {
            assert!(!is_truthy(&json!(null)));
            assert!(!is_truthy(&json!(0)));
            assert!(!is_truthy(&json!("")));
            assert!(is_truthy(&json!("0")));
            assert!(is_truthy(&json!([])));
            assert!(is_truthy(&json!({})));
        }

        #[test]
        fn strict_equality_checks_type() {
            assert!(strict_equals(&json!(2), &json!(2.0)));
            assert!(!strict_equals(&json!("2"), &json!(2)));
            assert!(!strict_equals(&json!(1), &json!(true)));
            assert!(strict_equals(&json!(null), &json!(null)));
        }

        #[test]
        fn numbers_render_without_trailing_zero() {
            assert_eq!(number_to_string(&Number::from(3)), "3");
            let half = Number::from_f64(2.5).unwrap();
            assert_eq!(number_to_string(&half), "2.5");
            let whole = Number::from_f64(4.0).unwrap();
            assert_eq!(number_to_string(&whole), "4");
        }
    }
}
