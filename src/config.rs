//! Session configuration.

use serde::Deserialize;

/// Tunables of a [`Session`](crate::session::Session).
///
/// The defaults match what the plotting producer emits, so most callers only
/// construct this through `SessionConfig::default()` or read it from JSON.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Texture payload that stands for the session's shared atlas buffer.
    pub atlas_token: String,
    /// Uniform update name that is emitted as an initial placeholder and must be ignored.
    pub ignored_update_name: String,
    /// Bounding radius given to every geometry so it is never culled.
    pub bounding_radius: f32,
    /// Expand 3-channel 1-D/2-D textures to 4 channels on creation.
    pub upconvert_rgb: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            atlas_token: "texture_atlas".to_string(),
            ignored_update_name: "none".to_string(),
            bounding_radius: 1e13,
            upconvert_rgb: true,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
