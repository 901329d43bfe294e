//! Runtime events
//!
//! Events arrive from outside (telephony, device location, operators) or are
//! derived from actions. Each event kind has a matching [`EventSpec`] variant
//! that triggers use to listen for it.

mod spec;

pub use spec::{EventSpec, MessageSentSpec, TriggerEvent};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

// ============================================================================
// Event Kinds
// ============================================================================

/// Closed catalog of event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CueSignaled,
    SceneStarted,
    MessageSent,
    GeofenceEntered,
    CallReceived,
    CallAnswered,
    CallEnded,
    QueryResponded,
    TimeOccurred,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        Self::CueSignaled,
        Self::SceneStarted,
        Self::MessageSent,
        Self::GeofenceEntered,
        Self::CallReceived,
        Self::CallAnswered,
        Self::CallEnded,
        Self::QueryResponded,
        Self::TimeOccurred,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CueSignaled => "cue_signaled",
            Self::SceneStarted => "scene_started",
            Self::MessageSent => "message_sent",
            Self::GeofenceEntered => "geofence_entered",
            Self::CallReceived => "call_received",
            Self::CallAnswered => "call_answered",
            Self::CallEnded => "call_ended",
            Self::QueryResponded => "query_responded",
            Self::TimeOccurred => "time_occurred",
        }
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownEvent(s.to_string()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    pub from: String,
    pub to: String,
    pub medium: String,
    pub content: String,
}

/// Where a message was sent from, when the device reported it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

/// A runtime event, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CueSignaled {
        cue: String,
    },
    SceneStarted {
        scene: String,
    },
    MessageSent {
        message: SentMessage,
        #[serde(default)]
        location: Location,
    },
    GeofenceEntered {
        role: String,
        geofence: String,
    },
    CallReceived {
        from: String,
        to: String,
    },
    CallAnswered {
        from: String,
        to: String,
    },
    CallEnded {
        roles: Vec<String>,
    },
    QueryResponded {
        query: String,
        #[serde(default)]
        partial: bool,
    },
    /// The scheduler's clock advanced from `last_timestamp` to `to_timestamp`
    /// (unix seconds)
    TimeOccurred {
        #[serde(default)]
        last_timestamp: Option<i64>,
        to_timestamp: i64,
    },
    /// An event type with no listeners in this catalog
    #[serde(other)]
    Unrecognized,
}

impl Event {
    /// Kind of this event, or `None` for unrecognized types.
    pub fn kind(&self) -> Option<EventKind> {
        Some(match self {
            Self::CueSignaled { .. } => EventKind::CueSignaled,
            Self::SceneStarted { .. } => EventKind::SceneStarted,
            Self::MessageSent { .. } => EventKind::MessageSent,
            Self::GeofenceEntered { .. } => EventKind::GeofenceEntered,
            Self::CallReceived { .. } => EventKind::CallReceived,
            Self::CallAnswered { .. } => EventKind::CallAnswered,
            Self::CallEnded { .. } => EventKind::CallEnded,
            Self::QueryResponded { .. } => EventKind::QueryResponded,
            Self::TimeOccurred { .. } => EventKind::TimeOccurred,
            Self::Unrecognized => return None,
        })
    }

    /// Type name as it appears in the `type` tag.
    pub fn type_name(&self) -> &'static str {
        self.kind().map_or("unrecognized", |kind| kind.as_str())
    }
}
