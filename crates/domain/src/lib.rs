extern crate self as tripkit_domain;

pub mod common;

pub mod actions;
pub mod entities;
pub mod error;
pub mod eval;
pub mod events;
pub mod rules;
pub mod value_objects;

// Re-export the script model (explicit list in entities/mod.rs)
pub use entities::{
    ActionNode, Audio, Clause, Clip, ClipQuery, Collection, ElseIf, Email, Geofence, Inbox,
    MessageTemplate, Page, Role, Scene, Script, StructuredAction, Trigger, Waypoint,
};

pub use error::{DomainError, TokenizeError};

// Re-export the action catalog and result vocabulary
pub use actions::{
    replay, Action, ActionKind, ActionResult, EmailParams, LogLevel, ResultOp, TwimlClause,
};

// Re-export events and their specs
pub use events::{
    Event, EventKind, EventSpec, Location, MessageSentSpec, SentMessage, TriggerEvent,
};

// Re-export the condition language entry points
pub use eval::{check_if, evaluate, evaluate_if, render, render_value};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{
    check_params, lookup_ref, lookup_str, prepare_params, validate_param, Context, IfStatement,
    ParamSpec, ParamType, ParamsSchema,
};
