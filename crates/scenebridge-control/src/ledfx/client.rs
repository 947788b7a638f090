use super::error::LedFxError;
use super::models::{SceneRequest, ScenesResponse};
use scenebridge_core::{BridgeConfig, SceneTrigger};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the LedFx scene API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct LedFxClient {
    http: reqwest::Client,
    base_url: String,
}

impl LedFxClient {
    /// Create a client for `base_url`, e.g. `http://127.0.0.1:8888`
    pub fn new(base_url: &str) -> Result<Self, LedFxError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LedFxError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self, LedFxError> {
        Self::new(&config.controller_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn scenes_url(&self) -> String {
        format!("{}/api/scenes", self.base_url)
    }

    /// Activate or deactivate a scene
    pub async fn set_scene(&self, trigger: &SceneTrigger) -> Result<(), LedFxError> {
        let body = SceneRequest::from(trigger);
        let resp = self.http.put(self.scenes_url()).json(&body).send().await?;

        if !resp.status().is_success() {
            return Err(LedFxError::ApiError(format!(
                "Failed to {} scene '{}': HTTP {}",
                trigger.action,
                trigger.scene,
                resp.status()
            )));
        }

        debug!("LedFx accepted {}", trigger);
        Ok(())
    }

    /// Fetch the ids of all scenes known to LedFx, sorted
    pub async fn list_scenes(&self) -> Result<Vec<String>, LedFxError> {
        let resp = self.http.get(self.scenes_url()).send().await?;

        if !resp.status().is_success() {
            return Err(LedFxError::ApiError(format!(
                "Failed to list scenes: HTTP {}",
                resp.status()
            )));
        }

        let scenes: ScenesResponse = resp.json().await?;
        Ok(scenes.sorted_ids())
    }

    /// Send `trigger` on a background task without waiting for the outcome.
    ///
    /// Failures are logged and otherwise dropped.
    pub fn dispatch(&self, trigger: SceneTrigger) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            match client.set_scene(&trigger).await {
                Ok(()) => info!("Scene {}", trigger),
                Err(e) => warn!("Scene {} failed: {}", trigger, e),
            }
        })
    }
}
