//! Configuration options for the backdrop compositor.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::staging::MAX_TEXTURE_DIM;

/// Global configuration options for a compositing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Color the target is cleared to before the backdrop is drawn.
    pub clear_color: Vec3,

    /// Ceiling on either padded texture dimension. Clamped to the hard
    /// limit of 2048.
    pub max_texture_dim: u32,

    /// Linear filtering on magnification. Minification always uses nearest
    /// sampling; the camera image is only ever shown at or above its native
    /// resolution.
    pub linear_magnify: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            clear_color: Vec3::ZERO,
            max_texture_dim: MAX_TEXTURE_DIM,
            linear_magnify: true,
        }
    }
}

impl Options {
    /// Serializes the options as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.clear_color, Vec3::ZERO);
        assert_eq!(options.max_texture_dim, 2048);
        assert!(options.linear_magnify);
    }

    #[test]
    fn test_json_round_trip() {
        let mut options = Options::default();
        options.clear_color = Vec3::new(0.1, 0.2, 0.3);
        options.linear_magnify = false;

        let json = options.to_json().unwrap();
        let parsed = Options::from_json(&json).unwrap();
        assert_eq!(parsed.clear_color, options.clear_color);
        assert_eq!(parsed.max_texture_dim, options.max_texture_dim);
        assert!(!parsed.linear_magnify);
    }
}
