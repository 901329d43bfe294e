//! Actions - concrete operations on a trip
//!
//! The catalog of action kinds is closed. Each kind declares its parameter
//! schema, the positional form it takes in a phrase, the event types it must
//! be a consequence of (if any), and the event it implies once applied.

mod result;

pub use result::{replay, ActionResult, EmailParams, LogLevel, ResultOp, TwimlClause};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::Collection;
use crate::error::DomainError;
use crate::events::{Event, EventKind, Location, SentMessage};
use crate::value_objects::{as_number, ParamSpec, ParamType, ParamsSchema};

// ============================================================================
// Action
// ============================================================================

/// A named operation with its parameters and the instant it should run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(with = "crate::common::datetime::iso_millis")]
    pub schedule_at: DateTime<Utc>,
    /// Trigger whose resolution produced this action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_name: Option<String>,
    /// Event that set off the trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

impl Action {
    pub fn new(name: impl Into<String>, params: Map<String, Value>, schedule_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            params,
            schedule_at,
            trigger_name: None,
            event: None,
        }
    }

    /// Look up this action's kind in the catalog.
    pub fn kind(&self) -> Result<ActionKind, DomainError> {
        self.name.parse()
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SignalCue,
    SetValue,
    IncrementValue,
    StartScene,
    SendToPage,
    CustomMessage,
    SendMessage,
    InitiateCall,
    AddToCall,
    PlayClip,
    SendEmail,
    PlayAudio,
    PauseAudio,
    ResumeAudio,
    StopAudio,
}

const MESSAGE_MEDIUMS: &[&str] = &["text", "image", "audio"];

const ROLE_ONLY: ParamsSchema = &[ParamSpec::required(
    "role_name",
    ParamType::reference(Collection::Roles),
)];

const SIGNAL_CUE: ParamsSchema = &[ParamSpec::required("cue_name", ParamType::Name)];

const SET_VALUE: ParamsSchema = &[
    ParamSpec::required("value_ref", ParamType::SimpleAttribute),
    ParamSpec::required("new_value_ref", ParamType::Lookupable),
];

const INCREMENT_VALUE: ParamsSchema = &[
    ParamSpec::required("value_ref", ParamType::SimpleAttribute),
    ParamSpec::optional("delta", ParamType::Number),
];

const START_SCENE: ParamsSchema = &[ParamSpec::required(
    "scene_name",
    ParamType::reference(Collection::Scenes),
)];

const SEND_TO_PAGE: ParamsSchema = &[
    ParamSpec::required("role_name", ParamType::reference(Collection::Roles)),
    ParamSpec::required("page_name", ParamType::reference(Collection::Pages)),
];

const CUSTOM_MESSAGE: ParamsSchema = &[
    ParamSpec::required("from_role_name", ParamType::reference(Collection::Roles)),
    ParamSpec::required("to_role_name", ParamType::reference(Collection::Roles)),
    ParamSpec::required("message_medium", ParamType::Enum(MESSAGE_MEDIUMS)),
    ParamSpec::required("message_content", ParamType::String),
    ParamSpec::optional("location_latitude", ParamType::Number),
    ParamSpec::optional("location_longitude", ParamType::Number),
    ParamSpec::optional("location_accuracy", ParamType::Number),
    ParamSpec::optional("suppress_relay_id", ParamType::Integer),
];

const SEND_MESSAGE: ParamsSchema = &[
    ParamSpec::required("message_name", ParamType::reference(Collection::Messages)),
    ParamSpec::optional("to_role_name", ParamType::reference(Collection::Roles)),
];

const INITIATE_CALL: ParamsSchema = &[
    ParamSpec::required("to_role_name", ParamType::reference(Collection::Roles)),
    ParamSpec::required("as_role_name", ParamType::reference(Collection::Roles)),
    ParamSpec::optional("detect_voicemail", ParamType::Enum(&["detect_voicemail"])),
];

const PLAY_CLIP: ParamsSchema = &[ParamSpec::required(
    "clip_name",
    ParamType::reference(Collection::Clips),
)];

const SEND_EMAIL: ParamsSchema = &[ParamSpec::required(
    "email_name",
    ParamType::reference(Collection::Emails),
)];

const PLAY_AUDIO: ParamsSchema = &[
    ParamSpec::required("role_name", ParamType::reference(Collection::Roles)),
    ParamSpec::required("audio_name", ParamType::reference(Collection::Audio)),
];

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        Self::SignalCue,
        Self::SetValue,
        Self::IncrementValue,
        Self::StartScene,
        Self::SendToPage,
        Self::CustomMessage,
        Self::SendMessage,
        Self::InitiateCall,
        Self::AddToCall,
        Self::PlayClip,
        Self::SendEmail,
        Self::PlayAudio,
        Self::PauseAudio,
        Self::ResumeAudio,
        Self::StopAudio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignalCue => "signal_cue",
            Self::SetValue => "set_value",
            Self::IncrementValue => "increment_value",
            Self::StartScene => "start_scene",
            Self::SendToPage => "send_to_page",
            Self::CustomMessage => "custom_message",
            Self::SendMessage => "send_message",
            Self::InitiateCall => "initiate_call",
            Self::AddToCall => "add_to_call",
            Self::PlayClip => "play_clip",
            Self::SendEmail => "send_email",
            Self::PlayAudio => "play_audio",
            Self::PauseAudio => "pause_audio",
            Self::ResumeAudio => "resume_audio",
            Self::StopAudio => "stop_audio",
        }
    }

    pub fn params(&self) -> ParamsSchema {
        match self {
            Self::SignalCue => SIGNAL_CUE,
            Self::SetValue => SET_VALUE,
            Self::IncrementValue => INCREMENT_VALUE,
            Self::StartScene => START_SCENE,
            Self::SendToPage => SEND_TO_PAGE,
            Self::CustomMessage => CUSTOM_MESSAGE,
            Self::SendMessage => SEND_MESSAGE,
            Self::InitiateCall => INITIATE_CALL,
            Self::AddToCall => ROLE_ONLY,
            Self::PlayClip => PLAY_CLIP,
            Self::SendEmail => SEND_EMAIL,
            Self::PlayAudio => PLAY_AUDIO,
            Self::PauseAudio | Self::ResumeAudio | Self::StopAudio => ROLE_ONLY,
        }
    }

    /// Parameter names bound positionally from a phrase.
    pub fn phrase_form(&self) -> &'static [&'static str] {
        match self {
            Self::SignalCue => &["cue_name"],
            Self::SetValue => &["value_ref", "new_value_ref"],
            Self::IncrementValue => &["value_ref", "delta"],
            Self::StartScene => &["scene_name"],
            Self::SendToPage => &["role_name", "page_name"],
            Self::CustomMessage => &[
                "from_role_name",
                "to_role_name",
                "message_medium",
                "message_content",
            ],
            Self::SendMessage => &["message_name", "to_role_name"],
            Self::InitiateCall => &["to_role_name", "as_role_name", "detect_voicemail"],
            Self::AddToCall => &["role_name"],
            Self::PlayClip => &["clip_name"],
            Self::SendEmail => &["email_name"],
            Self::PlayAudio => &["role_name", "audio_name"],
            Self::PauseAudio | Self::ResumeAudio | Self::StopAudio => &["role_name"],
        }
    }

    /// Event types this action must be a direct consequence of. Empty means
    /// the action may run anywhere.
    pub fn required_event_types(&self) -> &'static [EventKind] {
        match self {
            Self::AddToCall => &[EventKind::CallReceived, EventKind::CallAnswered],
            Self::PlayClip => &[
                EventKind::CallReceived,
                EventKind::CallAnswered,
                EventKind::QueryResponded,
            ],
            _ => &[],
        }
    }

    /// The event implied by applying this action with the given (prepared)
    /// params, if the kind implies one.
    pub fn event_for_params(&self, params: &Map<String, Value>) -> Option<Event> {
        let text = |key: &str| {
            params
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let number = |key: &str| params.get(key).and_then(as_number);
        match self {
            Self::SignalCue => Some(Event::CueSignaled {
                cue: text("cue_name"),
            }),
            Self::StartScene => Some(Event::SceneStarted {
                scene: text("scene_name"),
            }),
            Self::CustomMessage => Some(Event::MessageSent {
                message: SentMessage {
                    from: text("from_role_name"),
                    to: text("to_role_name"),
                    medium: text("message_medium"),
                    content: text("message_content"),
                },
                location: Location {
                    latitude: number("location_latitude"),
                    longitude: number("location_longitude"),
                    accuracy: number("location_accuracy"),
                },
            }),
            _ => None,
        }
    }
}

impl FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
