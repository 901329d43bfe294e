//! Action validation, at run time and ahead of time.

use serde_json::{Map, Value};
use tripkit_domain::rules::{expand_plain_phrase, extract_modifier, Modifier, PlainAction};
use tripkit_domain::{
    check_if, check_params, ActionKind, ActionNode, Clause, Context, EventKind, IfStatement,
    Script, Trigger,
};

use crate::error::EngineError;

fn quoted_kinds(kinds: &[EventKind]) -> String {
    kinds
        .iter()
        .map(|kind| format!("\"{}\"", kind.as_str()))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Parameter warnings for an action: missing, invalid, and unexpected params.
pub fn check_action(script: &Script, kind: ActionKind, params: &Map<String, Value>) -> Vec<String> {
    check_params(script, kind.params(), params)
}

/// Validate an action right before it is applied.
///
/// `context` must have the action's event merged in. Fails with the first
/// warning found.
pub fn validate_action_at_run(
    script: &Script,
    kind: ActionKind,
    params: &Map<String, Value>,
    context: &Context,
) -> Result<(), EngineError> {
    let mut warnings = check_action(script, kind, params);
    let required = kind.required_event_types();
    if !required.is_empty() {
        match context.event_type() {
            None => warnings.push(format!(
                "Required context {} but executed without event.",
                quoted_kinds(required)
            )),
            Some(event_type) if !required.iter().any(|kind| kind.as_str() == event_type) => {
                warnings.push(format!(
                    "Required context {} but executed with event \"{event_type}\".",
                    quoted_kinds(required)
                ))
            }
            Some(_) => {}
        }
    }
    match warnings.into_iter().next() {
        Some(warning) => Err(EngineError::validation(kind.as_str(), warning)),
        None => Ok(()),
    }
}

// =============================================================================
// Static trigger checks
// =============================================================================

struct TriggerCheck<'a> {
    script: &'a Script,
    trigger: &'a Trigger,
    warnings: Vec<String>,
}

impl TriggerCheck<'_> {
    fn check_condition(&mut self, path: &str, condition: &IfStatement) {
        if let Err(e) = check_if(condition) {
            self.warnings.push(format!("{path}.if: {e}"));
        }
    }

    fn check_action(&mut self, path: &str, kind: ActionKind, params: &Map<String, Value>) {
        let mut warnings = check_action(self.script, kind, params);
        let required = kind.required_event_types();
        let declared = &self.trigger.events;
        if !required.is_empty()
            && (declared.is_empty()
                || declared
                    .iter()
                    .any(|authored| !required.contains(&authored.spec.kind())))
        {
            warnings.push(format!("Required context {} not present.", quoted_kinds(required)));
        }
        self.warnings
            .extend(warnings.into_iter().map(|w| format!("{path} ({kind}): {w}")));
    }

    fn check_phrase(&mut self, path: &str, phrase: &str) {
        let (modifier, plain) = extract_modifier(phrase);
        if let Some(Modifier::If(statement)) = modifier {
            self.check_condition(path, &IfStatement::text(statement));
        }
        match expand_plain_phrase(plain) {
            Ok(PlainAction { kind, params }) => self.check_action(path, kind, &params),
            Err(e) => self.warnings.push(format!("{path}: {e}")),
        }
    }

    fn check_actions(&mut self, path: &str, nodes: &[ActionNode]) {
        for (i, node) in nodes.iter().enumerate() {
            let node_path = format!("{path}[{i}]");
            match node {
                ActionNode::Phrase(phrase) => self.check_phrase(&node_path, phrase),
                ActionNode::Structured(structured) => match structured.name.parse::<ActionKind>() {
                    Ok(kind) => self.check_action(&node_path, kind, &structured.params),
                    Err(e) => self.warnings.push(format!("{node_path}: {e}")),
                },
                ActionNode::Clause(clause) => self.check_clause(&node_path, clause),
            }
        }
    }

    fn check_clause(&mut self, path: &str, clause: &Clause) {
        if let Some(condition) = &clause.condition {
            self.check_condition(path, condition);
        }
        self.check_actions(&format!("{path}.actions"), &clause.actions);
        for (i, elseif) in clause.elseifs.iter().enumerate() {
            let elseif_path = format!("{path}.elseifs[{i}]");
            self.check_condition(&elseif_path, &elseif.condition);
            self.check_actions(&format!("{elseif_path}.actions"), &elseif.actions);
        }
        if let Some(otherwise) = &clause.otherwise {
            self.check_actions(&format!("{path}.else"), otherwise);
        }
    }
}

/// Warnings for one trigger, each prefixed with the path of the offending
/// part (`triggers[name=T].actions[0] (send_to_page): ...`).
pub fn precheck_trigger(script: &Script, trigger: &Trigger) -> Vec<String> {
    let path = format!("triggers[name={}]", trigger.name);
    let mut check = TriggerCheck {
        script,
        trigger,
        warnings: Vec::new(),
    };
    if let Some(scene) = &trigger.scene {
        if script.scene(scene).is_none() {
            check
                .warnings
                .push(format!("{path}.scene: Scene \"{scene}\" is not in collection \"scenes\"."));
        }
    }
    check.check_clause(&path, &trigger.body);
    for authored in &trigger.events {
        let kind = authored.spec.kind();
        check.warnings.extend(
            authored
                .check(script)
                .into_iter()
                .map(|w| format!("{path}.events[type={kind}]: {w}")),
        );
    }
    check.warnings
}

/// Warnings for every trigger in the script, in script order.
pub fn precheck_script(script: &Script) -> Vec<String> {
    script
        .triggers
        .iter()
        .flat_map(|trigger| precheck_trigger(script, trigger))
        .collect()
}
