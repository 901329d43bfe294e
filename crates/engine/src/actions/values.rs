//! Trip value actions.

use serde_json::{Map, Value};
use tripkit_domain::value_objects::{as_number, lookup_ref, number_value};
use tripkit_domain::ResultOp;

use super::{param, ActionContext};

pub(super) fn set_value(params: &Map<String, Value>, cx: &ActionContext<'_>) -> Vec<ResultOp> {
    let new_value = params
        .get("new_value_ref")
        .map(|reference| lookup_ref(cx.context, reference))
        .unwrap_or(Value::Null);
    let mut values = Map::new();
    values.insert(param(params, "value_ref").to_string(), new_value);
    vec![ResultOp::UpdateTripValues { values }]
}

/// Missing or non-numeric current values count as zero; delta defaults to one.
pub(super) fn increment_value(params: &Map<String, Value>, cx: &ActionContext<'_>) -> Vec<ResultOp> {
    let value_ref = param(params, "value_ref");
    let current = cx.context.get(value_ref).and_then(as_number).unwrap_or(0.0);
    let delta = params.get("delta").and_then(as_number).unwrap_or(1.0);
    let mut values = Map::new();
    values.insert(value_ref.to_string(), number_value(current + delta));
    vec![ResultOp::UpdateTripValues { values }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{cx, map, script};
    use serde_json::json;
    use tripkit_domain::Context;

    fn values_of(ops: Vec<ResultOp>) -> Value {
        match ops.as_slice() {
            [ResultOp::UpdateTripValues { values }] => Value::Object(values.clone()),
            other => panic!("unexpected ops {other:?}"),
        }
    }

    mod set {
        use super::*;

        #[test]
        fn resolves_literals_and_refs() {
            let s = script(json!({}));
            let ctx = Context::from_value(json!({"bananas": 10}));
            let cx = cx(&s, &ctx, None);
            for (reference, expected) in [
                (json!("2"), json!(2)),
                (json!("\"hi\""), json!("hi")),
                (json!("true"), json!(true)),
                (json!(false), json!(false)),
                (json!("bananas"), json!(10)),
                (json!("missing"), Value::Null),
            ] {
                let ops = set_value(&map(json!({"value_ref": "monkeys", "new_value_ref": reference})), &cx);
                assert_eq!(values_of(ops), json!({ "monkeys": expected }));
            }
        }
    }

    mod increment {
        use super::*;

        #[test]
        fn defaults_to_one_from_zero() {
            let s = script(json!({}));
            let ctx = Context::new();
            let ops = increment_value(&map(json!({"value_ref": "monkeys"})), &cx(&s, &ctx, None));
            assert_eq!(values_of(ops), json!({"monkeys": 1}));
        }

        #[test]
        fn adds_delta() {
            let s = script(json!({}));
            let ctx = Context::from_value(json!({"monkeys": 2}));
            let ops = increment_value(&map(json!({"value_ref": "monkeys", "delta": 10})), &cx(&s, &ctx, None));
            assert_eq!(values_of(ops), json!({"monkeys": 12}));
            let ops = increment_value(&map(json!({"value_ref": "monkeys", "delta": -0.5})), &cx(&s, &ctx, None));
            assert_eq!(values_of(ops), json!({"monkeys": 1.5}));
        }

        #[test]
        fn non_numeric_current_counts_as_zero() {
            let s = script(json!({}));
            let ctx = Context::from_value(json!({"monkeys": "lots"}));
            let ops = increment_value(&map(json!({"value_ref": "monkeys"})), &cx(&s, &ctx, None));
            assert_eq!(values_of(ops), json!({"monkeys": 1}));
        }
    }
}
