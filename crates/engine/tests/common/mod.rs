//! Shared fixtures for pipeline scenarios.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};
use tripkit_domain::{Action, Script};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()
}

pub fn t0_iso() -> &'static str {
    "2024-03-01T18:30:00.000Z"
}

pub fn script(value: Value) -> Script {
    serde_json::from_value(value).unwrap()
}

pub fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn signal_cue(cue: &str) -> Action {
    Action::new("signal_cue", params(json!({ "cue_name": cue })), t0())
}

/// Cowboy greets the farmer five minutes after the GREET cue.
pub fn greeting_script() -> Script {
    script(json!({
        "roles": [{"name": "Farmer"}, {"name": "Cowboy", "actor": true}],
        "triggers": [{
            "name": "T",
            "events": [{"cue_signaled": {"cue": "GREET"}}],
            "actions": ["in 5m, custom_message Cowboy Farmer text howdy"]
        }]
    }))
}

/// T1 replies to the greeting cue; T2 only answers once T1 has fired.
pub fn reply_chain_script() -> Script {
    script(json!({
        "roles": [{"name": "Farmer"}, {"name": "Cowboy"}],
        "triggers": [
            {
                "name": "T1",
                "events": [{"cue_signaled": {"cue": "CUE-GREET"}}],
                "actions": ["signal_cue CUE-GREET-REPLY"]
            },
            {
                "name": "T2",
                "events": [{"cue_signaled": {"cue": "CUE-GREET-REPLY"}}],
                "if": "history.T1",
                "actions": ["custom_message Cowboy Farmer text \"well howdy\""]
            }
        ]
    }))
}
