//! Typed action and event parameters
//!
//! Each action kind declares an ordered schema of [`ParamSpec`]s. Raw
//! parameters (usually words lifted out of an action phrase) are checked
//! against the schema, producing human-readable warnings, and then prepared
//! into their runtime form.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::{Map, Value};

use crate::common::seconds_for_duration_shorthand;
use crate::entities::{Collection, Script};
use crate::value_objects::value::{as_integer, as_number, number_value, parse_number};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:"?([^"]*)"?\s)?(?:<?(.+@[^>]+\.[^>]+)>?)"#).expect("valid regex")
});

// ============================================================================
// Schema
// ============================================================================

/// Value type a parameter must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Email,
    /// String, number or boolean
    SimpleValue,
    Number,
    /// Number with no fractional part
    Integer,
    Boolean,
    Enum(&'static [&'static str]),
    /// Duration shorthand such as `30s` or `2m`
    Duration,
    Name,
    /// Name of a resource in one of the script's collections
    Reference {
        collection: Collection,
        allow_null: bool,
    },
    /// Anything the condition language can resolve: a path or a quoted literal
    Lookupable,
    SimpleAttribute,
    NestedAttribute,
    /// `[lat, lng]`
    Coords,
}

impl ParamType {
    pub const fn reference(collection: Collection) -> Self {
        Self::Reference {
            collection,
            allow_null: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, param_type: ParamType) -> Self {
        Self {
            name,
            param_type,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, param_type: ParamType) -> Self {
        Self {
            name,
            param_type,
            required: false,
        }
    }
}

/// Ordered parameter schema of an action or event kind
pub type ParamsSchema = &'static [ParamSpec];

fn find_spec(schema: ParamsSchema, name: &str) -> Option<&'static ParamSpec> {
    schema.iter().find(|spec| spec.name == name)
}

// ============================================================================
// Validation
// ============================================================================

fn starts_with_letter(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn all_chars(s: &str, extra: &[char]) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || extra.contains(&c))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Check one raw parameter against its spec. Returns a warning when invalid.
pub fn validate_param(script: &Script, name: &str, spec: &ParamSpec, param: &Value) -> Option<String> {
    let shown = display(param);
    match spec.param_type {
        ParamType::String => match param {
            Value::String(s) if spec.required && s.is_empty() => {
                Some(format!("String param \"{name}\" should not be blank."))
            }
            Value::String(_) => None,
            _ => Some(format!("String param \"{name}\" should be a string.")),
        },
        ParamType::Email => match param {
            Value::String(s) if spec.required && s.is_empty() => {
                Some(format!("Email param \"{name}\" should not be blank."))
            }
            Value::String(s) if !EMAIL_RE.is_match(s) => {
                Some(format!("Email param \"{name}\" should be a valid email."))
            }
            Value::String(_) => None,
            _ => Some(format!("Email param \"{name}\" should be a string.")),
        },
        ParamType::SimpleValue => match param {
            Value::String(s) if spec.required && s.is_empty() => {
                Some(format!("Simple param \"{name}\" should not be blank."))
            }
            Value::String(_) | Value::Number(_) | Value::Bool(_) => None,
            _ => Some(format!(
                "Simple param \"{name}\" should be a string, number or boolean."
            )),
        },
        ParamType::Number => {
            let ok = match param {
                Value::Number(_) | Value::Bool(_) | Value::Null => true,
                Value::String(s) => parse_number(s).is_some(),
                _ => false,
            };
            (!ok).then(|| format!("Number param \"{name}\" should be a number."))
        }
        ParamType::Integer => {
            let ok = param.is_null() || as_integer(param).is_some();
            (!ok).then(|| format!("Integer param \"{name}\" (\"{shown}\") should be a whole number."))
        }
        ParamType::Boolean => (!param.is_boolean())
            .then(|| format!("Boolean param \"{name}\" (\"{shown}\") should be true or false.")),
        ParamType::Enum(options) => {
            let ok = param.as_str().is_some_and(|s| options.contains(&s));
            (!ok).then(|| {
                let listed: Vec<String> = options.iter().map(|o| format!("\"{o}\"")).collect();
                format!("Enum param \"{name}\" is not one of {}.", listed.join(", "))
            })
        }
        ParamType::Duration => {
            let seconds = param.as_str().map(seconds_for_duration_shorthand).unwrap_or(0.0);
            (seconds == 0.0).then(|| {
                format!("Duration param \"{name}\" (\"{shown}\") should be a number with \"m\" or \"s\".")
            })
        }
        ParamType::Name => match param.as_str() {
            None => Some(format!("Name param \"{name}\" (\"{shown}\") should be a string.")),
            Some(s) if !starts_with_letter(s) => Some(format!(
                "Name param \"{name}\" (\"{s}\") should start with a letter."
            )),
            Some(s) if !all_chars(s, &['-']) => Some(format!(
                "Name param \"{name}\" (\"{s}\") should be alphanumeric with dashes or underscores."
            )),
            Some(_) => None,
        },
        ParamType::Reference {
            collection,
            allow_null,
        } => match param.as_str() {
            Some("null") if allow_null => None,
            None => Some(format!(
                "Reference param \"{name}\" (\"{shown}\") should be a string."
            )),
            Some("") => Some(format!(
                "Reference attribute param \"{name}\" should not be blank."
            )),
            Some(s) if !starts_with_letter(s) => Some(format!(
                "Reference param \"{name}\" (\"{s}\") should start with a letter."
            )),
            Some(s) if !all_chars(s, &['-']) => Some(format!(
                "Reference param \"{name}\" (\"{s}\") should be alphanumeric with dashes or underscores."
            )),
            Some(s) if !script.has_resource(collection, s) => Some(format!(
                "Reference param \"{name}\" (\"{s}\") is not in collection \"{}\".",
                collection.as_str()
            )),
            Some(_) => None,
        },
        ParamType::Lookupable => match param.as_str() {
            None => Some(format!(
                "Lookupable param \"{name}\" (\"{shown}\") should be a string."
            )),
            Some("") => Some(format!(
                "Lookupable attribute param \"{name}\" should not be blank."
            )),
            Some(s) => {
                let inner = s.trim_start_matches(['"', '\'']).trim_end_matches(['"', '\'']);
                let ok = !inner.is_empty() && all_chars(inner, &['.', '-']);
                (!ok).then(|| {
                    format!("Lookupable param \"{name}\" (\"{s}\") should be alphanumeric with underscores, dashes and periods.")
                })
            }
        },
        ParamType::SimpleAttribute => match param.as_str() {
            None => Some(format!("Simple attribute param \"{name}\" should be a string.")),
            Some("") => Some(format!("Simple attribute param \"{name}\" should not be blank.")),
            Some(s) if !starts_with_letter(s) => Some(format!(
                "Simple attribute param \"{name}\" (\"{s}\") should start with a letter."
            )),
            Some(s) if !all_chars(s, &[]) => Some(format!(
                "Simple attribute param \"{name}\" (\"{s}\") should be alphanumeric with underscores."
            )),
            Some(_) => None,
        },
        ParamType::NestedAttribute => match param.as_str() {
            None => Some(format!("Nested attribute param \"{name}\" should be a string.")),
            Some("") => Some(format!("Nested attribute param \"{name}\" should not be blank.")),
            Some(s) if !starts_with_letter(s) => Some(format!(
                "Nested attribute param \"{name}\" (\"{s}\") should start with a letter."
            )),
            Some(s) if !all_chars(s, &['.']) => Some(format!(
                "Nested attribute param \"{name}\" (\"{s}\") should be alphanumeric with underscores and periods."
            )),
            Some(_) => None,
        },
        ParamType::Coords => {
            let pair: Option<Vec<f64>> = param
                .as_array()
                .filter(|items| items.len() == 2)
                .and_then(|items| items.iter().map(as_number).collect());
            match pair.as_deref() {
                None => Some(format!("Coords param \"{name}\" should be an array of two numbers.")),
                Some([lat, _]) if !(-180.0..=180.0).contains(lat) => Some(format!(
                    "Coords param \"{name}[0]\" should be between -180 and 180."
                )),
                Some([_, lng]) if !(-180.0..=180.0).contains(lng) => Some(format!(
                    "Coords param \"{name}[1]\" should be between -180 and 180."
                )),
                Some(_) => None,
            }
        }
    }
}

/// Check a parameter map against a schema.
///
/// Reports missing required params, invalid params, and params the schema
/// does not declare, in that order.
pub fn check_params(script: &Script, schema: ParamsSchema, params: &Map<String, Value>) -> Vec<String> {
    let mut warnings = Vec::new();
    for spec in schema {
        match params.get(spec.name) {
            None if spec.required => {
                warnings.push(format!("Required param \"{}\" not present.", spec.name));
            }
            None => {}
            Some(param) => warnings.extend(validate_param(script, spec.name, spec, param)),
        }
    }
    for key in params.keys() {
        if find_spec(schema, key).is_none() {
            let expected: Vec<&str> = schema.iter().map(|spec| spec.name).collect();
            warnings.push(format!(
                "Unexpected param \"{key}\" (expected one of: {}).",
                expected.join(", ")
            ));
        }
    }
    warnings
}

// ============================================================================
// Preparation
// ============================================================================

/// Coerce a raw parameter into its runtime form.
///
/// Strings lose a surrounding pair of double quotes, numbers are parsed, and
/// every other type passes through for the condition language to resolve.
pub fn prepare_param(spec: &ParamSpec, param: &Value) -> Value {
    match (spec.param_type, param) {
        (ParamType::String, Value::String(s))
            if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') =>
        {
            Value::String(s[1..s.len() - 1].to_string())
        }
        (ParamType::Number, Value::String(s)) => match parse_number(s) {
            Some(n) => number_value(n),
            None => param.clone(),
        },
        (ParamType::Integer, Value::String(_)) => match as_integer(param) {
            Some(n) => Value::Number(n.into()),
            None => param.clone(),
        },
        _ => param.clone(),
    }
}

/// Prepare every parameter that the schema declares; others are copied as-is.
pub fn prepare_params(schema: ParamsSchema, params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .map(|(key, value)| {
            let prepared = match find_spec(schema, key) {
                Some(spec) => prepare_param(spec, value),
                None => value.clone(),
            };
            (key.clone(), prepared)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: ParamsSchema = &[
        ParamSpec::required("role_name", ParamType::reference(Collection::Roles)),
        ParamSpec::required("content", ParamType::String),
        ParamSpec::optional("count", ParamType::Number),
    ];

    fn script() -> Script {
        serde_json::from_value(json!({
            "roles": [{"name": "Farmer"}, {"name": "Cowboy"}]
        }))
        .unwrap()
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    mod check {
        use super::*;

        #[test]
        fn valid_params_have_no_warnings() {
            let warnings = check_params(
                &script(),
                SCHEMA,
                &params(json!({"role_name": "Farmer", "content": "hi", "count": "3"})),
            );
            assert!(warnings.is_empty(), "{warnings:?}");
        }

        #[test]
        fn reports_missing_required() {
            let warnings = check_params(&script(), SCHEMA, &params(json!({"content": "hi"})));
            assert_eq!(warnings, vec!["Required param \"role_name\" not present."]);
        }

        #[test]
        fn reports_unexpected() {
            let warnings = check_params(
                &script(),
                SCHEMA,
                &params(json!({"role_name": "Farmer", "content": "hi", "extra": 1})),
            );
            assert_eq!(
                warnings,
                vec!["Unexpected param \"extra\" (expected one of: role_name, content, count)."]
            );
        }

        #[test]
        fn reports_reference_outside_collection() {
            let warnings = check_params(
                &script(),
                SCHEMA,
                &params(json!({"role_name": "Sheriff", "content": "hi"})),
            );
            assert_eq!(
                warnings,
                vec!["Reference param \"role_name\" (\"Sheriff\") is not in collection \"roles\"."]
            );
        }

        #[test]
        fn reports_bad_number() {
            let warnings = check_params(
                &script(),
                SCHEMA,
                &params(json!({"role_name": "Farmer", "content": "hi", "count": "lots"})),
            );
            assert_eq!(warnings, vec!["Number param \"count\" should be a number."]);
        }
    }

    mod validators {
        use super::*;

        fn check(param_type: ParamType, value: Value) -> Option<String> {
            let spec = ParamSpec::required("p", param_type);
            validate_param(&script(), "p", &spec, &value)
        }

        #[test]
        fn string_must_not_be_blank_when_required() {
            assert!(check(ParamType::String, json!("")).is_some());
            assert!(check(ParamType::String, json!(3)).is_some());
        }

        #[test]
        fn enum_lists_options() {
            let warning = check(ParamType::Enum(&["text", "image"]), json!("video")).unwrap();
            assert_eq!(warning, "Enum param \"p\" is not one of \"text\", \"image\".");
        }

        #[test]
        fn duration_must_be_positive_shorthand() {
            assert!(check(ParamType::Duration, json!("3m")).is_none());
            assert!(check(ParamType::Duration, json!("0s")).is_some());
            assert!(check(ParamType::Duration, json!("soon")).is_some());
        }

        #[test]
        fn attributes_and_names() {
            assert!(check(ParamType::SimpleAttribute, json!("score_1")).is_none());
            assert!(check(ParamType::SimpleAttribute, json!("a.b")).is_some());
            assert!(check(ParamType::NestedAttribute, json!("a.b")).is_none());
            assert!(check(ParamType::NestedAttribute, json!("1a")).is_some());
            assert!(check(ParamType::Name, json!("CUE-1")).is_none());
            assert!(check(ParamType::Name, json!("a b")).is_some());
        }

        #[test]
        fn lookupable_allows_quotes_and_paths() {
            assert!(check(ParamType::Lookupable, json!("player.score")).is_none());
            assert!(check(ParamType::Lookupable, json!("\"done\"")).is_none());
            assert!(check(ParamType::Lookupable, json!("a b")).is_some());
        }

        #[test]
        fn reference_allows_null_when_permitted() {
            let nullable = ParamType::Reference {
                collection: Collection::Roles,
                allow_null: true,
            };
            assert!(check(nullable, json!("null")).is_none());
            assert!(check(ParamType::reference(Collection::Roles), json!("null")).is_some());
        }

        #[test]
        fn integer_rejects_fractions_and_huge_values() {
            assert!(check(ParamType::Integer, json!(12)).is_none());
            assert!(check(ParamType::Integer, json!("12")).is_none());
            assert!(check(ParamType::Integer, json!(null)).is_none());
            assert!(check(ParamType::Integer, json!(1.5)).is_some());
            assert!(check(ParamType::Integer, json!(1e300)).is_some());
            assert!(check(ParamType::Integer, json!("abc")).is_some());
        }

        #[test]
        fn coords_range() {
            assert!(check(ParamType::Coords, json!([37.7, -122.4])).is_none());
            assert!(check(ParamType::Coords, json!([200, 0])).is_some());
            assert!(check(ParamType::Coords, json!([1])).is_some());
        }

        #[test]
        fn email_shape() {
            assert!(check(ParamType::Email, json!("Jo <jo@example.com>")).is_none());
            assert!(check(ParamType::Email, json!("nope")).is_some());
        }
    }

    mod prepare {
        use super::*;

        #[test]
        fn strips_double_quotes_only() {
            let spec = ParamSpec::required("s", ParamType::String);
            assert_eq!(prepare_param(&spec, &json!("\"hi there\"")), json!("hi there"));
            assert_eq!(prepare_param(&spec, &json!("'hi'")), json!("'hi'"));
            assert_eq!(prepare_param(&spec, &json!("abc\"")), json!("abc\""));
        }

        #[test]
        fn converts_numbers() {
            let spec = ParamSpec::required("n", ParamType::Number);
            assert_eq!(prepare_param(&spec, &json!("2")), json!(2));
            assert_eq!(prepare_param(&spec, &json!(2)), json!(2));
        }

        #[test]
        fn converts_integers() {
            let spec = ParamSpec::optional("id", ParamType::Integer);
            assert_eq!(prepare_param(&spec, &json!("12")), json!(12));
            assert_eq!(prepare_param(&spec, &json!(12)), json!(12));
        }

        #[test]
        fn other_types_pass_through() {
            let spec = ParamSpec::required("r", ParamType::Lookupable);
            assert_eq!(prepare_param(&spec, &json!("\"x\"")), json!("\"x\""));
        }

        #[test]
        fn prepares_whole_map() {
            let prepared = prepare_params(
                SCHEMA,
                &params(json!({"role_name": "Farmer", "content": "\"hi\"", "count": "4"})),
            );
            assert_eq!(
                Value::Object(prepared),
                json!({"role_name": "Farmer", "content": "hi", "count": 4})
            );
        }
    }
}
