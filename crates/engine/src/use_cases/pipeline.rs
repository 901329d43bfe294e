//! Action application pipeline.
//!
//! Applying an action validates it, turns it into result ops, folds those ops
//! into the context, and then cascades the event the action implies (if any)
//! through every trigger listening for it. Triggers resolve into further
//! actions, which are applied immediately or deferred to a scheduler.
//!
//! A pass is all-or-nothing: any error aborts it and no ops are returned.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tripkit_domain::common::iso_string;
use tripkit_domain::rules::{actions_for_trigger, triggers_for_event};
use tripkit_domain::{prepare_params, Action, ActionResult, Context, Event, ResultOp, Script, Trigger};

use crate::actions::{ops_for_action, ActionContext};
use crate::error::EngineError;
use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::validation::validate_action_at_run;

/// Applies actions and events to one trip's context.
///
/// Holds no state between calls. The host must not run two passes against the
/// same trip concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    script: &'a Script,
    timezone: Tz,
    max_depth: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(script: &'a Script, settings: &EngineSettings) -> Self {
        Self {
            script,
            timezone: settings.timezone,
            max_depth: settings.max_cascade_depth,
        }
    }

    /// Apply an action and everything it sets off at `apply_at`.
    pub fn apply_action(
        &self,
        action: &Action,
        context: &Context,
        apply_at: DateTime<Utc>,
    ) -> Result<ActionResult, EngineError> {
        let result = self.apply_action_at_depth(action, context, apply_at, 0)?;
        tracing::info!(
            action = %action.name,
            ops = result.result_ops.len(),
            scheduled = result.scheduled_actions.len(),
            "Applied action"
        );
        Ok(result)
    }

    /// Apply an external event: fire every trigger it matches.
    pub fn apply_event(
        &self,
        event: &Event,
        context: &Context,
        apply_at: DateTime<Utc>,
    ) -> Result<ActionResult, EngineError> {
        let result = self.apply_event_at_depth(event, context, apply_at, 0)?;
        tracing::info!(
            event = event.type_name(),
            ops = result.result_ops.len(),
            scheduled = result.scheduled_actions.len(),
            "Applied event"
        );
        Ok(result)
    }

    fn apply_action_at_depth(
        &self,
        action: &Action,
        context: &Context,
        apply_at: DateTime<Utc>,
        depth: usize,
    ) -> Result<ActionResult, EngineError> {
        if depth > self.max_depth {
            tracing::warn!(
                action = %action.name,
                trigger = action.trigger_name.as_deref().unwrap_or_default(),
                max_depth = self.max_depth,
                "Cascade too deep, aborting pass"
            );
            return Err(EngineError::CascadeDepthExceeded {
                max_depth: self.max_depth,
                action: action.name.clone(),
            });
        }

        let kind = action.kind()?;
        let event = action.event.as_ref();
        let eval_context = context.with_event(event);
        validate_action_at_run(self.script, kind, &action.params, &eval_context)?;

        let params = prepare_params(kind.params(), &action.params);
        let cx = ActionContext {
            script: self.script,
            context: &eval_context,
            event,
            evaluate_at: apply_at,
            timezone: self.timezone,
        };
        let ops = ops_for_action(kind, &params, &cx)?;
        tracing::debug!(action = %kind, depth, ops = ops.len(), "Applying action");

        // Ops fold into the context without the event.
        let result = ActionResult::from_ops(context, ops);
        let Some(derived) = kind.event_for_params(&params) else {
            return Ok(result);
        };
        let cascade = self.apply_event_at_depth(&derived, &result.next_context, apply_at, depth)?;
        Ok(result.concat(cascade))
    }

    fn apply_event_at_depth(
        &self,
        event: &Event,
        context: &Context,
        apply_at: DateTime<Utc>,
        depth: usize,
    ) -> Result<ActionResult, EngineError> {
        let triggers = triggers_for_event(self.script, event, &context.with_event(Some(event)))?;
        tracing::debug!(event = event.type_name(), depth, triggers = triggers.len(), "Matched triggers");

        let mut result = ActionResult::initial(context.clone());
        for trigger in triggers {
            if !trigger.repeatable && result.next_context.has_fired(&trigger.name) {
                tracing::debug!(trigger = %trigger.name, "Trigger already fired in this pass, skipping");
                continue;
            }
            let fired = self.apply_trigger(
                trigger,
                event,
                &result.next_context,
                context,
                apply_at,
                depth,
            )?;
            result = result.concat(fired);
        }
        Ok(result)
    }

    /// Fire one trigger. `context` is the running state; `event_context` is
    /// the state as it stood when the event occurred, which the trigger's
    /// actions are resolved against.
    fn apply_trigger(
        &self,
        trigger: &Trigger,
        event: &Event,
        context: &Context,
        event_context: &Context,
        apply_at: DateTime<Utc>,
        depth: usize,
    ) -> Result<ActionResult, EngineError> {
        tracing::debug!(trigger = %trigger.name, event = event.type_name(), depth, "Firing trigger");

        let mut history = Map::new();
        history.insert(trigger.name.clone(), Value::String(iso_string(apply_at)));
        let mut result =
            ActionResult::initial(context.clone()).push_op(ResultOp::UpdateTripHistory { history });

        let actions = actions_for_trigger(
            trigger,
            Some(event),
            &event_context.with_event(Some(event)),
            apply_at,
        )?;
        for action in actions {
            if action.schedule_at > apply_at {
                tracing::debug!(
                    action = %action.name,
                    trigger = %trigger.name,
                    schedule_at = %action.schedule_at,
                    "Scheduling action"
                );
                result = result.schedule(action);
                continue;
            }
            let applied = self.apply_action_at_depth(&action, &result.next_context, apply_at, depth + 1)?;
            result = result.concat(applied);
        }
        Ok(result)
    }
}
