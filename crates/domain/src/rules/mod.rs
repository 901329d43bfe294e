//! Trigger rules: action phrases, conditional action trees, and event matching

mod conditional;
mod matcher;
mod phrase;

pub use conditional::{actions_for_trigger, resolve_clause};
pub use matcher::{does_event_fire_trigger, is_scene_active, is_trigger_active, triggers_for_event};
pub use phrase::{
    expand_action_phrase, expand_plain_phrase, extract_modifier, time_for_shorthand, ExpandedAction,
    Modifier, PlainAction,
};
