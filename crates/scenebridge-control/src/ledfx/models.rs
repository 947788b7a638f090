use scenebridge_core::{SceneAction, SceneTrigger};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `PUT /api/scenes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRequest {
    pub id: String,
    pub action: SceneAction,
}

impl From<&SceneTrigger> for SceneRequest {
    fn from(trigger: &SceneTrigger) -> Self {
        Self {
            id: trigger.scene.clone(),
            action: trigger.action,
        }
    }
}

/// Body of `GET /api/scenes`
#[derive(Debug, Default, Deserialize)]
pub struct ScenesResponse {
    #[serde(default)]
    pub scenes: HashMap<String, SceneInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneInfo {
    #[serde(default)]
    pub name: Option<String>,
}

impl ScenesResponse {
    /// Scene ids in sorted order
    pub fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.scenes.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scene_request_body() {
        let body = SceneRequest::from(&SceneTrigger::activate("baseocean"));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"id": "baseocean", "action": "activate"})
        );

        let body = SceneRequest::from(&SceneTrigger::deactivate("orangehigh"));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"id": "orangehigh", "action": "deactivate"})
        );
    }

    #[test]
    fn test_parse_scene_list() {
        let json = json!({
            "status": "success",
            "scenes": {
                "orangehigh": {"name": "Orange High", "virtuals": {}},
                "baseocean": {"name": "Base Ocean"},
                "blank": {}
            }
        });

        let response: ScenesResponse = serde_json::from_value(json).unwrap();
        assert_eq!(
            response.sorted_ids(),
            vec!["baseocean", "blank", "orangehigh"]
        );
        assert_eq!(
            response.scenes["baseocean"].name.as_deref(),
            Some("Base Ocean")
        );
    }
}
