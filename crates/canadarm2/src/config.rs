//! Settings sections of the viewer.
//!
//! Defaults reproduce the public ISS Live feed and the original page layout;
//! the settings file only needs the fields someone changed.

use std::time::Duration;

use lightstreamer::ClientConfig;
use serde::{Deserialize, Serialize};
use settings::Settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub server_address: String,
    pub adapter_set: String,
    pub client_id: String,
    pub reconnect: bool,
    pub reconnect_delay_secs: u64,
    pub keepalive_margin_secs: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            server_address: client.server_address,
            adapter_set: client.adapter_set,
            client_id: client.client_id,
            reconnect: client.reconnect,
            reconnect_delay_secs: client.reconnect_delay.as_secs(),
            keepalive_margin_secs: client.keepalive_margin.as_secs(),
        }
    }
}

impl Settings for StreamSettings {
    const SECTION: &'static str = "stream";
}

impl StreamSettings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server_address: self.server_address.clone(),
            adapter_set: self.adapter_set.clone(),
            client_id: self.client_id.clone(),
            reconnect: self.reconnect,
            reconnect_delay: Duration::from_secs(self.reconnect_delay_secs),
            keepalive_margin: Duration::from_secs(self.keepalive_margin_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Relative to the asset folder.
    pub model_path: String,
    pub model_offset: [f32; 3],
    pub model_flip_x_degrees: f32,
    pub model_color: u32,
    pub camera_position: [f32; 3],
    pub camera_focus: [f32; 3],
    pub ambient_brightness: f32,
    pub light_position: [f32; 3],
    pub light_illuminance: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            model_path: "models/canadarm2Vertical.glb".to_string(),
            model_offset: [0.0, 3.0, 0.0],
            model_flip_x_degrees: 180.0,
            model_color: 0xffffff,
            camera_position: [-100.0, 20.0, 5.0],
            camera_focus: [0.0, 30.0, 0.0],
            ambient_brightness: 250.0,
            light_position: [-1000.0, 1000.0, 1000.0],
            light_illuminance: 3_000.0,
            grid_size: 50.0,
            grid_divisions: 10,
        }
    }
}

impl Settings for SceneSettings {
    const SECTION: &'static str = "scene";
}

impl SceneSettings {
    /// `model_color` split into sRGB bytes.
    pub fn model_rgb(&self) -> [u8; 3] {
        let [_, r, g, b] = self.model_color.to_be_bytes();
        [r, g, b]
    }
}
