//! Entities - the authored script and its triggers

mod script;
mod trigger;

pub use script::{
    Audio, Clip, ClipQuery, Collection, Email, Geofence, Inbox, MessageTemplate, Page, Role,
    Scene, Script, Waypoint,
};
pub use trigger::{ActionNode, Clause, ElseIf, StructuredAction, Trigger};
