//! Scene and page navigation.

use serde_json::{Map, Value};
use tripkit_domain::{LogLevel, ResultOp};

use super::{fields, param, ActionContext};

/// Move the trip into a scene and send each role with an interface to the
/// first page of that scene.
///
/// Starting the current scene or a global scene changes nothing.
pub(super) fn start_scene(params: &Map<String, Value>, cx: &ActionContext<'_>) -> Vec<ResultOp> {
    let scene_name = param(params, "scene_name");
    let Some(scene) = cx.script.scene(scene_name) else {
        return vec![ResultOp::log(
            LogLevel::Error,
            format!("Could not find scene named \"{scene_name}\"."),
        )];
    };
    if scene.global || cx.context.current_scene_name() == Some(scene_name) {
        return Vec::new();
    }

    let mut ops = vec![ResultOp::UpdateTripFields {
        fields: fields([("currentSceneName", Value::String(scene_name.to_string()))]),
    }];
    for role in &cx.script.roles {
        let Some(interface) = &role.interface else {
            continue;
        };
        if let Some(page) = cx.script.pages_for(interface, scene_name).first() {
            ops.push(ResultOp::UpdatePlayerFields {
                role_name: role.name.clone(),
                fields: fields([("currentPageName", Value::String(page.name.clone()))]),
            });
        }
    }
    ops
}

pub(super) fn send_to_page(params: &Map<String, Value>) -> Vec<ResultOp> {
    vec![ResultOp::UpdatePlayerFields {
        role_name: param(params, "role_name").to_string(),
        fields: fields([(
            "currentPageName",
            Value::String(param(params, "page_name").to_string()),
        )]),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{cx, map, script};
    use serde_json::json;
    use tripkit_domain::{Context, Script};

    fn fixture() -> Script {
        script(json!({
            "roles": [
                {"name": "Farmer", "interface": "FarmerUI"},
                {"name": "Cowboy", "interface": "CowboyUI"},
                {"name": "Narrator"}
            ],
            "scenes": [{"name": "MAIN"}, {"name": "BARN"}, {"name": "ALWAYS", "global": true}],
            "pages": [
                {"name": "BARN-2", "scene": "BARN", "interface": "FarmerUI"},
                {"name": "BARN-1", "scene": "BARN", "interface": "FarmerUI"},
                {"name": "MAIN-1", "scene": "MAIN", "interface": "CowboyUI"}
            ]
        }))
    }

    #[test]
    fn switches_scene_and_navigates_players() {
        let s = fixture();
        let ctx = Context::from_value(json!({"currentSceneName": "MAIN"}));
        let ops = start_scene(&map(json!({"scene_name": "BARN"})), &cx(&s, &ctx, None));
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!([
                {"operation": "updateTripFields", "fields": {"currentSceneName": "BARN"}},
                {"operation": "updatePlayerFields", "roleName": "Farmer", "fields": {"currentPageName": "BARN-1"}}
            ])
        );
    }

    #[test]
    fn current_or_global_scene_is_a_no_op() {
        let s = fixture();
        let ctx = Context::from_value(json!({"currentSceneName": "MAIN"}));
        assert!(start_scene(&map(json!({"scene_name": "MAIN"})), &cx(&s, &ctx, None)).is_empty());
        assert!(start_scene(&map(json!({"scene_name": "ALWAYS"})), &cx(&s, &ctx, None)).is_empty());
    }

    #[test]
    fn unknown_scene_logs_error() {
        let s = fixture();
        let ctx = Context::new();
        let ops = start_scene(&map(json!({"scene_name": "ATTIC"})), &cx(&s, &ctx, None));
        assert_eq!(
            ops,
            vec![ResultOp::log(LogLevel::Error, "Could not find scene named \"ATTIC\".")]
        );
    }

    #[test]
    fn send_to_page_updates_player() {
        let ops = send_to_page(&map(json!({"role_name": "Farmer", "page_name": "BARN-2"})));
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!([{"operation": "updatePlayerFields", "roleName": "Farmer", "fields": {"currentPageName": "BARN-2"}}])
        );
    }
}
