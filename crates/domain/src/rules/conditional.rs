//! Conditional resolution of a trigger's action tree

use chrono::{DateTime, Utc};

use super::phrase::expand_action_phrase;
use crate::actions::{Action, ActionKind};
use crate::entities::{ActionNode, Clause, Trigger};
use crate::error::DomainError;
use crate::eval::{evaluate, evaluate_if};
use crate::events::Event;
use crate::value_objects::Context;

/// Pick the branch of a clause that applies in this context.
fn select_branch<'a>(clause: &'a Clause, context: &Context) -> Result<&'a [ActionNode], DomainError> {
    let Some(condition) = &clause.condition else {
        return Ok(&clause.actions);
    };
    if evaluate_if(context, condition)? {
        return Ok(&clause.actions);
    }
    for elseif in &clause.elseifs {
        if evaluate_if(context, &elseif.condition)? {
            return Ok(&elseif.actions);
        }
    }
    Ok(clause.otherwise.as_deref().unwrap_or_default())
}

/// Resolve a clause into a flat, ordered list of phrases and structured
/// actions. Nested clauses are resolved in place.
pub fn resolve_clause<'a>(clause: &'a Clause, context: &Context) -> Result<Vec<&'a ActionNode>, DomainError> {
    let mut resolved = Vec::new();
    for node in select_branch(clause, context)? {
        match node {
            ActionNode::Clause(nested) => resolved.extend(resolve_clause(nested, context)?),
            leaf => resolved.push(leaf),
        }
    }
    Ok(resolved)
}

/// Resolve a trigger into concrete actions.
///
/// `context` is the state as it stood when the event occurred, with the event
/// merged in. Phrases whose `if` modifier fails are dropped. Every action is
/// tagged with the trigger name and the event.
pub fn actions_for_trigger(
    trigger: &Trigger,
    event: Option<&Event>,
    context: &Context,
    evaluate_at: DateTime<Utc>,
) -> Result<Vec<Action>, DomainError> {
    let mut actions = Vec::new();
    for node in resolve_clause(&trigger.body, context)? {
        let mut action = match node {
            ActionNode::Phrase(phrase) => {
                let expanded = expand_action_phrase(phrase, evaluate_at, context)?;
                if let Some(condition) = &expanded.condition {
                    if !evaluate(context, condition)? {
                        continue;
                    }
                }
                expanded.action
            }
            ActionNode::Structured(structured) => {
                let kind: ActionKind = structured.name.parse()?;
                Action::new(kind.as_str(), structured.params.clone(), evaluate_at)
            }
            ActionNode::Clause(_) => continue,
        };
        action.trigger_name = Some(trigger.name.clone());
        action.event = event.cloned();
        actions.push(action);
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Value};

    fn clause(value: Value) -> Clause {
        serde_json::from_value(value).unwrap()
    }

    fn phrases(nodes: Vec<&ActionNode>) -> Vec<&str> {
        nodes
            .into_iter()
            .map(|node| match node {
                ActionNode::Phrase(p) => p.as_str(),
                ActionNode::Structured(s) => s.name.as_str(),
                ActionNode::Clause(_) => "<clause>",
            })
            .collect()
    }

    mod branches {
        use super::*;

        fn tree() -> Clause {
            clause(json!({
                "if": "equals level 1",
                "actions": ["signal_cue ONE"],
                "elseifs": [
                    {"if": "equals level 2", "actions": ["signal_cue TWO"]},
                    {"if": "level", "actions": ["signal_cue ANY"]}
                ],
                "else": "signal_cue NONE"
            }))
        }

        #[test]
        fn selects_first_passing_branch() {
            let t = tree();
            for (level, expected) in [
                (json!(1), "signal_cue ONE"),
                (json!(2), "signal_cue TWO"),
                (json!(3), "signal_cue ANY"),
                (json!(0), "signal_cue NONE"),
            ] {
                let ctx = Context::from_value(json!({ "level": level }));
                assert_eq!(phrases(resolve_clause(&t, &ctx).unwrap()), vec![expected]);
            }
        }

        #[test]
        fn no_else_selects_nothing() {
            let c = clause(json!({"if": "flag", "actions": ["signal_cue X"]}));
            assert!(resolve_clause(&c, &Context::new()).unwrap().is_empty());
        }

        #[test]
        fn no_if_selects_actions() {
            let c = clause(json!({"actions": "signal_cue X"}));
            assert_eq!(phrases(resolve_clause(&c, &Context::new()).unwrap()), vec!["signal_cue X"]);
        }

        #[test]
        fn condition_errors_propagate() {
            let c = clause(json!({"if": "frobnicate a b", "actions": ["signal_cue X"]}));
            assert!(matches!(
                resolve_clause(&c, &Context::new()),
                Err(DomainError::UnknownCommand(_))
            ));
        }
    }

    mod flattening {
        use super::*;

        #[test]
        fn nested_clauses_splice_in_place() {
            let c = clause(json!({
                "actions": [
                    "signal_cue A",
                    {"if": "flag", "actions": ["signal_cue B", {"actions": ["signal_cue C"]}], "else": ["signal_cue X"]},
                    {"name": "signal_cue", "params": {"cue_name": "D"}},
                    "signal_cue E"
                ]
            }));
            let on = Context::from_value(json!({"flag": true}));
            assert_eq!(
                phrases(resolve_clause(&c, &on).unwrap()),
                vec!["signal_cue A", "signal_cue B", "signal_cue C", "signal_cue", "signal_cue E"]
            );
            let off = Context::new();
            assert_eq!(
                phrases(resolve_clause(&c, &off).unwrap()),
                vec!["signal_cue A", "signal_cue X", "signal_cue", "signal_cue E"]
            );
        }
    }

    mod trigger_actions {
        use super::*;

        fn trigger(value: Value) -> Trigger {
            serde_json::from_value(value).unwrap()
        }

        fn now() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
        }

        #[test]
        fn tags_actions_with_trigger_and_event() {
            let t = trigger(json!({
                "name": "T",
                "actions": [
                    "in 5m, signal_cue LATER",
                    {"name": "set_value", "params": {"value_ref": "x", "new_value_ref": "1"}}
                ]
            }));
            let event = Event::CueSignaled { cue: "GO".to_string() };
            let actions = actions_for_trigger(&t, Some(&event), &Context::new(), now()).unwrap();
            assert_eq!(actions.len(), 2);
            assert_eq!(actions[0].schedule_at, now() + Duration::minutes(5));
            assert_eq!(actions[1].schedule_at, now());
            for action in &actions {
                assert_eq!(action.trigger_name.as_deref(), Some("T"));
                assert_eq!(action.event.as_ref(), Some(&event));
            }
        }

        #[test]
        fn drops_phrases_whose_if_fails() {
            let t = trigger(json!({
                "name": "T",
                "actions": ["if flag, signal_cue A", "if not flag, signal_cue B"]
            }));
            let actions = actions_for_trigger(&t, None, &Context::new(), now()).unwrap();
            assert_eq!(actions.len(), 1);
            assert_eq!(actions[0].param_str("cue_name"), Some("B"));
        }

        #[test]
        fn unknown_structured_action_fails() {
            let t = trigger(json!({"name": "T", "actions": [{"name": "dance"}]}));
            assert!(matches!(
                actions_for_trigger(&t, None, &Context::new(), now()),
                Err(DomainError::UnknownAction(_))
            ));
        }
    }
}
