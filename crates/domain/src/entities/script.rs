//! Script - the authored, read-only definition of a trip

use serde::Deserialize;

use super::Trigger;
use crate::value_objects::IfStatement;

// ============================================================================
// Collections
// ============================================================================

/// Named resource collections that parameters may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Roles,
    Scenes,
    Pages,
    Messages,
    Clips,
    Audio,
    Emails,
    Inboxes,
    Geofences,
    Waypoints,
    Triggers,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::Scenes => "scenes",
            Self::Pages => "pages",
            Self::Messages => "messages",
            Self::Clips => "clips",
            Self::Audio => "audio",
            Self::Emails => "emails",
            Self::Inboxes => "inboxes",
            Self::Geofences => "geofences",
            Self::Waypoints => "waypoints",
            Self::Triggers => "triggers",
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Played by the trip's staff rather than a participant
    #[serde(default)]
    pub actor: bool,
    #[serde(default)]
    pub interface: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Global scenes are active regardless of the current scene
    #[serde(default)]
    pub global: bool,
    #[serde(default, rename = "if")]
    pub condition: Option<IfStatement>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
}

/// Pre-authored message, sent by `send_message`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageTemplate {
    pub name: String,
    #[serde(default = "default_medium")]
    pub medium: String,
    #[serde(default)]
    pub content: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    /// Delivered already marked as read
    #[serde(default)]
    pub read: bool,
}

fn default_medium() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClipQuery {
    pub name: String,
    #[serde(default, rename = "type")]
    pub query_type: Option<String>,
    #[serde(default)]
    pub hints: Option<Vec<String>>,
}

/// Phone clip: recorded audio, or a transcript read out by a voice
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Clip {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub query: Option<ClipQuery>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Audio {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Email {
    pub name: String,
    /// Inbox name
    pub from: String,
    /// Role name
    pub to: String,
    #[serde(default)]
    pub cc: Option<Vec<String>>,
    #[serde(default)]
    pub bcc: Option<Vec<String>>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Inbox {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geofence {
    pub name: String,
    /// Waypoint name
    pub center: String,
    /// Radius in meters
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Waypoint {
    pub name: String,
    /// `[latitude, longitude]`
    pub coords: [f64; 2],
}

// ============================================================================
// Script
// ============================================================================

/// The authored trip definition. Collections keep their document order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Script {
    pub roles: Vec<Role>,
    pub scenes: Vec<Scene>,
    pub pages: Vec<Page>,
    pub triggers: Vec<Trigger>,
    pub messages: Vec<MessageTemplate>,
    pub clips: Vec<Clip>,
    pub audio: Vec<Audio>,
    pub emails: Vec<Email>,
    pub inboxes: Vec<Inbox>,
    pub geofences: Vec<Geofence>,
    pub waypoints: Vec<Waypoint>,
}

impl Script {
    /// True when the named collection has a resource with this name.
    pub fn has_resource(&self, collection: Collection, name: &str) -> bool {
        match collection {
            Collection::Roles => self.roles.iter().any(|r| r.name == name),
            Collection::Scenes => self.scenes.iter().any(|r| r.name == name),
            Collection::Pages => self.pages.iter().any(|r| r.name == name),
            Collection::Messages => self.messages.iter().any(|r| r.name == name),
            Collection::Clips => self.clips.iter().any(|r| r.name == name),
            Collection::Audio => self.audio.iter().any(|r| r.name == name),
            Collection::Emails => self.emails.iter().any(|r| r.name == name),
            Collection::Inboxes => self.inboxes.iter().any(|r| r.name == name),
            Collection::Geofences => self.geofences.iter().any(|r| r.name == name),
            Collection::Waypoints => self.waypoints.iter().any(|r| r.name == name),
            Collection::Triggers => self.triggers.iter().any(|r| r.name == name),
        }
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name == name)
    }

    pub fn message(&self, name: &str) -> Option<&MessageTemplate> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn clip(&self, name: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.name == name)
    }

    pub fn audio(&self, name: &str) -> Option<&Audio> {
        self.audio.iter().find(|a| a.name == name)
    }

    pub fn email(&self, name: &str) -> Option<&Email> {
        self.emails.iter().find(|e| e.name == name)
    }

    pub fn inbox(&self, name: &str) -> Option<&Inbox> {
        self.inboxes.iter().find(|i| i.name == name)
    }

    pub fn geofence(&self, name: &str) -> Option<&Geofence> {
        self.geofences.iter().find(|g| g.name == name)
    }

    pub fn waypoint(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.name == name)
    }

    /// Pages for an interface within a scene, sorted by name.
    pub fn pages_for(&self, interface: &str, scene: &str) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self
            .pages
            .iter()
            .filter(|p| p.interface.as_deref() == Some(interface) && p.scene.as_deref() == Some(scene))
            .collect();
        pages.sort_by(|a, b| a.name.cmp(&b.name));
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn script() -> Script {
        serde_json::from_value(json!({
            "roles": [
                {"name": "Farmer", "interface": "FarmerUI"},
                {"name": "Cowboy", "actor": true}
            ],
            "scenes": [{"name": "MAIN"}, {"name": "GLOBAL", "global": true, "if": "flag"}],
            "pages": [
                {"name": "P-B", "scene": "MAIN", "interface": "FarmerUI"},
                {"name": "P-A", "scene": "MAIN", "interface": "FarmerUI"},
                {"name": "P-C", "scene": "OTHER", "interface": "FarmerUI"}
            ],
            "waypoints": [{"name": "W", "coords": [37.77, -122.41]}],
            "unknownCollection": [1, 2, 3]
        }))
        .unwrap()
    }

    #[test]
    fn missing_collections_default_empty() {
        let s = script();
        assert!(s.triggers.is_empty());
        assert!(s.emails.is_empty());
    }

    #[test]
    fn has_resource_checks_collection() {
        let s = script();
        assert!(s.has_resource(Collection::Roles, "Farmer"));
        assert!(!s.has_resource(Collection::Scenes, "Farmer"));
        assert!(s.has_resource(Collection::Waypoints, "W"));
    }

    #[test]
    fn scene_condition_is_parsed() {
        let s = script();
        let global = s.scene("GLOBAL").unwrap();
        assert!(global.global);
        assert_eq!(global.condition, Some(IfStatement::text("flag")));
    }

    #[test]
    fn pages_for_are_sorted() {
        let s = script();
        let names: Vec<&str> = s.pages_for("FarmerUI", "MAIN").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P-A", "P-B"]);
    }
}
