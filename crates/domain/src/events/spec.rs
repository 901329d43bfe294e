//! Event specs - what a trigger listens for
//!
//! A spec is keyed by event type, e.g. `{"cue_signaled": {"cue": "GREET"}}`.
//! Each variant owns its matcher and its static reference checks.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{Event, EventKind, Location};
use crate::common::{offset_by_seconds, parse_datetime, seconds_for_duration_shorthand};
use crate::entities::{Collection, Script};
use crate::value_objects::Context;

/// Location accuracy wider than this is clamped, so a vague fix cannot set off
/// a distant geofence.
const MAX_ACCURACY_METERS: f64 = 15.0;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Filter for `message_sent`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageSentSpec {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    /// Case-insensitive substring of the content
    #[serde(default)]
    pub contains: Option<String>,
    /// Sender must be inside this geofence
    #[serde(default)]
    pub geofence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSpec {
    CueSignaled {
        cue: String,
    },
    SceneStarted {
        scene: String,
    },
    MessageSent(MessageSentSpec),
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
        role: String,
    },
    QueryResponded {
        query: String,
        /// Only match partial responses
        #[serde(default)]
        partial: Option<bool>,
        /// Only match final responses
        #[serde(default, rename = "final")]
        final_only: Option<bool>,
    },
    /// Fires when the clock passes `schedule[time]`, shifted by before/after
    TimeOccurred {
        time: String,
        #[serde(default)]
        before: Option<String>,
        #[serde(default)]
        after: Option<String>,
    },
}

impl EventSpec {
    /// Keys a spec of this kind may carry.
    pub fn fields(kind: EventKind) -> &'static [&'static str] {
        match kind {
            EventKind::CueSignaled => &["cue"],
            EventKind::SceneStarted => &["scene"],
            EventKind::MessageSent => &["from", "to", "medium", "contains", "geofence"],
            EventKind::GeofenceEntered => &["role", "geofence"],
            EventKind::CallReceived | EventKind::CallAnswered => &["from", "to"],
            EventKind::CallEnded => &["role"],
            EventKind::QueryResponded => &["query", "partial", "final"],
            EventKind::TimeOccurred => &["time", "before", "after"],
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::CueSignaled { .. } => EventKind::CueSignaled,
            Self::SceneStarted { .. } => EventKind::SceneStarted,
            Self::MessageSent(_) => EventKind::MessageSent,
            Self::GeofenceEntered { .. } => EventKind::GeofenceEntered,
            Self::CallReceived { .. } => EventKind::CallReceived,
            Self::CallAnswered { .. } => EventKind::CallAnswered,
            Self::CallEnded { .. } => EventKind::CallEnded,
            Self::QueryResponded { .. } => EventKind::QueryResponded,
            Self::TimeOccurred { .. } => EventKind::TimeOccurred,
        }
    }

    /// Does this event set off the spec? Events of another kind never do.
    pub fn matches(&self, event: &Event, script: &Script, context: &Context) -> bool {
        match (self, event) {
            (Self::CueSignaled { cue }, Event::CueSignaled { cue: fired }) => cue == fired,
            (Self::SceneStarted { scene }, Event::SceneStarted { scene: started }) => scene == started,
            (Self::MessageSent(spec), Event::MessageSent { message, location }) => {
                if spec.medium.as_ref().is_some_and(|m| *m != message.medium) {
                    return false;
                }
                if spec.from.as_ref().is_some_and(|f| *f != message.from) {
                    return false;
                }
                if spec.to.as_ref().is_some_and(|t| *t != message.to) {
                    return false;
                }
                if let Some(needle) = &spec.contains {
                    if !message.content.to_lowercase().contains(&needle.to_lowercase()) {
                        return false;
                    }
                }
                match &spec.geofence {
                    Some(geofence) => is_within_geofence(script, geofence, location),
                    None => true,
                }
            }
            (
                Self::GeofenceEntered { role, geofence },
                Event::GeofenceEntered {
                    role: entered_role,
                    geofence: entered,
                },
            ) => role == entered_role && geofence == entered,
            (Self::CallReceived { from, to }, Event::CallReceived { from: f, to: t })
            | (Self::CallAnswered { from, to }, Event::CallAnswered { from: f, to: t }) => {
                from == f && to == t
            }
            (Self::CallEnded { role }, Event::CallEnded { roles }) => roles.contains(role),
            (
                Self::QueryResponded {
                    query,
                    partial,
                    final_only,
                },
                Event::QueryResponded {
                    query: responded,
                    partial: is_partial,
                },
            ) => {
                if *partial == Some(true) && !is_partial {
                    return false;
                }
                if *final_only == Some(true) && *is_partial {
                    return false;
                }
                query == responded
            }
            (
                Self::TimeOccurred { time, before, after },
                Event::TimeOccurred {
                    last_timestamp,
                    to_timestamp,
                },
            ) => {
                let Some(at) = time_for_spec(context, time, before.as_deref(), after.as_deref()) else {
                    return false;
                };
                // Anything at or before the last check already fired
                if let Some(last) = last_timestamp.and_then(unix_time) {
                    if at <= last {
                        return false;
                    }
                }
                unix_time(*to_timestamp).is_some_and(|to| at <= to)
            }
            _ => false,
        }
    }

    /// Static reference checks against the script.
    pub fn check(&self, script: &Script) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut reference = |field: &str, collection: Collection, name: &str| {
            if !script.has_resource(collection, name) {
                warnings.push(format!(
                    "Event \"{}\" param \"{field}\" (\"{name}\") is not in collection \"{}\".",
                    self.kind(),
                    collection.as_str()
                ));
            }
        };
        match self {
            Self::CueSignaled { .. } | Self::QueryResponded { .. } => {}
            Self::SceneStarted { scene } => reference("scene", Collection::Scenes, scene),
            Self::MessageSent(spec) => {
                if let Some(from) = &spec.from {
                    reference("from", Collection::Roles, from);
                }
                if let Some(to) = &spec.to {
                    reference("to", Collection::Roles, to);
                }
                if let Some(geofence) = &spec.geofence {
                    reference("geofence", Collection::Geofences, geofence);
                }
            }
            Self::GeofenceEntered { role, geofence } => {
                reference("role", Collection::Roles, role);
                reference("geofence", Collection::Geofences, geofence);
            }
            Self::CallReceived { from, to } | Self::CallAnswered { from, to } => {
                reference("from", Collection::Roles, from);
                reference("to", Collection::Roles, to);
            }
            Self::CallEnded { role } => reference("role", Collection::Roles, role),
            Self::TimeOccurred { before, after, .. } => {
                for (field, value) in [("before", before), ("after", after)] {
                    if let Some(duration) = value {
                        if seconds_for_duration_shorthand(duration) == 0.0 {
                            warnings.push(format!(
                                "Event \"time_occurred\" param \"{field}\" (\"{duration}\") should be a number with \"m\" or \"s\"."
                            ));
                        }
                    }
                }
            }
        }
        warnings
    }
}

// ============================================================================
// Trigger Events
// ============================================================================

/// An event spec as authored on a trigger.
///
/// Keys the spec's kind does not declare are kept so static checks can
/// report them; they play no part in matching.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct TriggerEvent {
    pub spec: EventSpec,
    pub unexpected: Vec<String>,
}

impl TriggerEvent {
    /// Static checks: references plus undeclared keys.
    pub fn check(&self, script: &Script) -> Vec<String> {
        let kind = self.spec.kind();
        let mut warnings: Vec<String> = self
            .unexpected
            .iter()
            .map(|key| {
                format!(
                    "Event \"{kind}\" has unexpected param \"{key}\" (expected one of: {}).",
                    EventSpec::fields(kind).join(", ")
                )
            })
            .collect();
        warnings.extend(self.spec.check(script));
        warnings
    }
}

impl TryFrom<Value> for TriggerEvent {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let unexpected = match value.as_object().and_then(|map| map.iter().next()) {
            Some((name, Value::Object(fields))) => match name.parse::<EventKind>() {
                Ok(kind) => {
                    let known = EventSpec::fields(kind);
                    fields
                        .keys()
                        .filter(|key| !known.contains(&key.as_str()))
                        .cloned()
                        .collect()
                }
                Err(_) => Vec::new(),
            },
            _ => Vec::new(),
        };
        let spec = serde_json::from_value(value)?;
        Ok(Self { spec, unexpected })
    }
}

fn unix_time(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

/// Resolve the instant a `time_occurred` spec refers to.
fn time_for_spec(
    context: &Context,
    time: &str,
    before: Option<&str>,
    after: Option<&str>,
) -> Option<DateTime<Utc>> {
    let offset_secs = match (after, before) {
        (Some(after), _) => seconds_for_duration_shorthand(after),
        (None, Some(before)) => -seconds_for_duration_shorthand(before),
        (None, None) => 0.0,
    };
    let base = parse_datetime(context.schedule_entry(time)?).ok()?;
    offset_by_seconds(base, offset_secs)
}

fn is_within_geofence(script: &Script, geofence_name: &str, location: &Location) -> bool {
    let (Some(lat), Some(lng)) = (location.latitude, location.longitude) else {
        return false;
    };
    let Some(geofence) = script.geofence(geofence_name) else {
        return false;
    };
    let Some(center) = script.waypoint(&geofence.center) else {
        return false;
    };
    let accuracy = location.accuracy.unwrap_or(0.0).min(MAX_ACCURACY_METERS);
    let distance = distance_meters(lat, lng, center.coords[0], center.coords[1]);
    distance <= geofence.distance + accuracy
}

/// Great-circle distance by the haversine formula.
fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SentMessage;
    use serde_json::json;

    fn script() -> Script {
        serde_json::from_value(json!({
            "roles": [{"name": "Farmer"}, {"name": "Cowboy"}],
            "scenes": [{"name": "MAIN"}],
            "waypoints": [{"name": "SALOON", "coords": [37.7749, -122.4194]}],
            "geofences": [{"name": "NEAR-SALOON", "center": "SALOON", "distance": 50.0}]
        }))
        .unwrap()
    }

    fn spec(value: serde_json::Value) -> EventSpec {
        serde_json::from_value(value).unwrap()
    }

    fn message(content: &str, location: Location) -> Event {
        Event::MessageSent {
            message: SentMessage {
                from: "Farmer".to_string(),
                to: "Cowboy".to_string(),
                medium: "text".to_string(),
                content: content.to_string(),
            },
            location,
        }
    }

    mod deserialize {
        use super::*;

        #[test]
        fn keyed_by_event_type() {
            assert_eq!(
                spec(json!({"cue_signaled": {"cue": "GREET"}})),
                EventSpec::CueSignaled {
                    cue: "GREET".to_string()
                }
            );
            assert_eq!(
                spec(json!({"message_sent": {}})),
                EventSpec::MessageSent(MessageSentSpec::default())
            );
        }

        #[test]
        fn unknown_type_fails() {
            assert!(serde_json::from_value::<EventSpec>(json!({"door_opened": {}})).is_err());
        }

        #[test]
        fn missing_required_field_fails() {
            assert!(serde_json::from_value::<EventSpec>(json!({"call_received": {"from": "A"}})).is_err());
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn cue_compares_names() {
            let s = spec(json!({"cue_signaled": {"cue": "GREET"}}));
            let hit = Event::CueSignaled { cue: "GREET".to_string() };
            let miss = Event::CueSignaled { cue: "BYE".to_string() };
            assert!(s.matches(&hit, &script(), &Context::new()));
            assert!(!s.matches(&miss, &script(), &Context::new()));
        }

        #[test]
        fn different_kind_never_matches() {
            let s = spec(json!({"cue_signaled": {"cue": "MAIN"}}));
            let event = Event::SceneStarted { scene: "MAIN".to_string() };
            assert!(!s.matches(&event, &script(), &Context::new()));
        }

        #[test]
        fn message_filters() {
            let sc = script();
            let ctx = Context::new();
            let event = message("Howdy partner", Location::default());
            assert!(spec(json!({"message_sent": {"from": "Farmer", "contains": "HOWDY"}}))
                .matches(&event, &sc, &ctx));
            assert!(!spec(json!({"message_sent": {"to": "Farmer"}})).matches(&event, &sc, &ctx));
            assert!(!spec(json!({"message_sent": {"medium": "image"}})).matches(&event, &sc, &ctx));
            assert!(!spec(json!({"message_sent": {"contains": "bye"}})).matches(&event, &sc, &ctx));
        }

        #[test]
        fn message_geofence_uses_capped_accuracy() {
            let sc = script();
            let ctx = Context::new();
            let s = spec(json!({"message_sent": {"geofence": "NEAR-SALOON"}}));

            // About 55m north of the waypoint
            let near = Location {
                latitude: Some(37.7754),
                longitude: Some(-122.4194),
                accuracy: Some(10.0),
            };
            assert!(s.matches(&message("hi", near.clone()), &sc, &ctx));

            // About 67m north; a 1km accuracy is capped at 15m
            let far = Location {
                latitude: Some(37.7755),
                longitude: Some(-122.4194),
                accuracy: Some(1000.0),
            };
            assert!(!s.matches(&message("hi", far), &sc, &ctx));

            assert!(!s.matches(&message("hi", Location::default()), &sc, &ctx));
        }

        #[test]
        fn call_ended_checks_membership() {
            let s = spec(json!({"call_ended": {"role": "Farmer"}}));
            let event = Event::CallEnded {
                roles: vec!["Cowboy".to_string(), "Farmer".to_string()],
            };
            assert!(s.matches(&event, &script(), &Context::new()));
        }

        #[test]
        fn query_partial_and_final() {
            let sc = script();
            let ctx = Context::new();
            let partial = Event::QueryResponded { query: "Q".to_string(), partial: true };
            let done = Event::QueryResponded { query: "Q".to_string(), partial: false };
            let only_final = spec(json!({"query_responded": {"query": "Q", "final": true}}));
            let only_partial = spec(json!({"query_responded": {"query": "Q", "partial": true}}));
            assert!(only_final.matches(&done, &sc, &ctx));
            assert!(!only_final.matches(&partial, &sc, &ctx));
            assert!(only_partial.matches(&partial, &sc, &ctx));
            assert!(!only_partial.matches(&done, &sc, &ctx));
        }

        #[test]
        fn time_occurred_window_is_half_open() {
            let sc = script();
            // 1_700_000_000 == 2023-11-14T22:13:20Z
            let ctx = Context::from_value(json!({
                "schedule": {"DINNER": "2023-11-14T22:13:20.000Z"}
            }));
            let at = spec(json!({"time_occurred": {"time": "DINNER"}}));
            let window = |last: Option<i64>, to: i64| Event::TimeOccurred {
                last_timestamp: last,
                to_timestamp: to,
            };
            assert!(at.matches(&window(Some(1_699_999_990), 1_700_000_000), &sc, &ctx));
            assert!(!at.matches(&window(Some(1_700_000_000), 1_700_000_010), &sc, &ctx));
            assert!(!at.matches(&window(Some(1_699_999_980), 1_699_999_990), &sc, &ctx));
            assert!(at.matches(&window(None, 1_700_000_000), &sc, &ctx));

            let early = spec(json!({"time_occurred": {"time": "DINNER", "before": "1m"}}));
            assert!(early.matches(&window(Some(1_699_999_900), 1_699_999_940), &sc, &ctx));

            let unscheduled = spec(json!({"time_occurred": {"time": "LUNCH"}}));
            assert!(!unscheduled.matches(&window(None, 1_800_000_000), &sc, &ctx));
        }

        #[test]
        fn time_occurred_offset_out_of_range_never_matches() {
            let sc = script();
            let ctx = Context::from_value(json!({
                "schedule": {"DINNER": "2023-11-14T22:13:20.000Z"}
            }));
            let event = Event::TimeOccurred {
                last_timestamp: None,
                to_timestamp: 1_800_000_000,
            };
            for key in ["after", "before"] {
                let far = spec(json!({"time_occurred": {"time": "DINNER", key: "999999999999m"}}));
                assert!(!far.matches(&event, &sc, &ctx), "{key}");
            }
        }
    }

    mod checks {
        use super::*;

        #[test]
        fn reports_missing_references() {
            let s = spec(json!({"call_received": {"from": "Farmer", "to": "Sheriff"}}));
            assert_eq!(
                s.check(&script()),
                vec!["Event \"call_received\" param \"to\" (\"Sheriff\") is not in collection \"roles\"."]
            );
        }

        #[test]
        fn reports_bad_durations() {
            let s = spec(json!({"time_occurred": {"time": "X", "after": "soon"}}));
            assert_eq!(s.check(&script()).len(), 1);
        }

        #[test]
        fn authored_spec_keeps_undeclared_keys() {
            let authored: TriggerEvent =
                serde_json::from_value(json!({"message_sent": {"mediun": "image", "from": "Farmer"}}))
                    .unwrap();
            assert_eq!(authored.spec, EventSpec::MessageSent(MessageSentSpec {
                from: Some("Farmer".to_string()),
                ..MessageSentSpec::default()
            }));
            assert_eq!(authored.unexpected, vec!["mediun".to_string()]);
            assert_eq!(
                authored.check(&script()),
                vec!["Event \"message_sent\" has unexpected param \"mediun\" (expected one of: from, to, medium, contains, geofence)."]
            );
        }

        #[test]
        fn declared_keys_are_not_reported() {
            let authored: TriggerEvent = serde_json::from_value(
                json!({"query_responded": {"query": "Q", "partial": true, "final": false}}),
            )
            .unwrap();
            assert!(authored.unexpected.is_empty());
        }
    }
}
