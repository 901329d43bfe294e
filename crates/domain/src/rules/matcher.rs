//! Which triggers an event sets off

use crate::entities::{Script, Trigger};
use crate::error::DomainError;
use crate::eval::evaluate_if;
use crate::events::Event;
use crate::value_objects::Context;

/// A scene is active when its own `if` passes and it is either global or the
/// current scene. Unknown scenes are never active.
pub fn is_scene_active(script: &Script, scene_name: &str, context: &Context) -> Result<bool, DomainError> {
    let Some(scene) = script.scene(scene_name) else {
        return Ok(false);
    };
    if let Some(condition) = &scene.condition {
        if !evaluate_if(context, condition)? {
            return Ok(false);
        }
    }
    if scene.global {
        return Ok(true);
    }
    Ok(context.current_scene_name() == Some(scene_name))
}

/// Whether a trigger may fire at all in this context.
pub fn is_trigger_active(script: &Script, trigger: &Trigger, context: &Context) -> Result<bool, DomainError> {
    if let Some(scene) = &trigger.scene {
        if !is_scene_active(script, scene, context)? {
            return Ok(false);
        }
    }
    if let Some(condition) = trigger.condition() {
        if !evaluate_if(context, condition)? {
            return Ok(false);
        }
    }
    if !trigger.repeatable && context.has_fired(&trigger.name) {
        return Ok(false);
    }
    Ok(true)
}

/// Whether any of the trigger's event specs matches the event.
pub fn does_event_fire_trigger(script: &Script, trigger: &Trigger, event: &Event, context: &Context) -> bool {
    let Some(kind) = event.kind() else {
        return false;
    };
    trigger
        .events
        .iter()
        .filter(|authored| authored.spec.kind() == kind)
        .any(|authored| authored.spec.matches(event, script, context))
}

/// Active triggers set off by the event, in script order.
pub fn triggers_for_event<'a>(
    script: &'a Script,
    event: &Event,
    context: &Context,
) -> Result<Vec<&'a Trigger>, DomainError> {
    let mut matched = Vec::new();
    for trigger in &script.triggers {
        if !is_trigger_active(script, trigger, context)? {
            continue;
        }
        if does_event_fire_trigger(script, trigger, event, context) {
            matched.push(trigger);
        }
    }
    Ok(matched)
}
