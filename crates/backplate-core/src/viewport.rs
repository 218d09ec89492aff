//! Display viewport geometry.

use crate::rotation::ScreenRotation;

/// Pixel dimensions and rotation of the display, in the current orientation.
///
/// Width and height are the platform's values for the *current* orientation,
/// i.e. they swap when the device rotates. Mutated on resize and rotation
/// notifications; read on every draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportGeometry {
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
    /// Current screen rotation.
    pub rotation: ScreenRotation,
}

impl ViewportGeometry {
    /// Creates a viewport in the natural orientation.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rotation: ScreenRotation::Deg0,
        }
    }

    /// Sets the rotation, builder style.
    #[must_use]
    pub fn with_rotation(mut self, rotation: ScreenRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Width over height. A zero dimension is clamped to 1 so downstream
    /// aspect math never divides by zero.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// Updates the pixel dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Updates the rotation.
    pub fn set_rotation(&mut self, rotation: ScreenRotation) {
        self.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        let viewport = ViewportGeometry::new(800, 480);
        assert!((viewport.aspect_ratio() - 800.0 / 480.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_dimension_clamps_to_one() {
        let viewport = ViewportGeometry::new(800, 0);
        assert!((viewport.aspect_ratio() - 800.0).abs() < 1e-6);

        let viewport = ViewportGeometry::new(0, 0);
        assert!((viewport.aspect_ratio() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_and_rotation() {
        let mut viewport = ViewportGeometry::new(480, 800);
        viewport.resize(800, 480);
        viewport.set_rotation(ScreenRotation::Deg90);
        assert_eq!(viewport.width, 800);
        assert_eq!(viewport.rotation, ScreenRotation::Deg90);
    }
}
