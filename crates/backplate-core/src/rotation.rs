//! Screen rotation states and their backdrop transforms.

use glam::Mat4;

/// Discrete screen rotation in 90-degree steps.
///
/// Each variant carries its own backdrop model matrix, so drawing code has
/// no default-case fallthrough; unrecognized platform values are resolved at
/// the conversion boundary by [`ScreenRotation::from_degrees_or_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenRotation {
    /// Natural orientation.
    #[default]
    Deg0,
    /// Rotated 90 degrees.
    Deg90,
    /// Upside down.
    Deg180,
    /// Rotated 270 degrees.
    Deg270,
}

impl ScreenRotation {
    /// Model matrix applied to the fullscreen backdrop quad.
    #[must_use]
    pub fn model_matrix(self) -> Mat4 {
        match self {
            ScreenRotation::Deg0 => Mat4::IDENTITY,
            ScreenRotation::Deg90 => Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2),
            ScreenRotation::Deg180 => Mat4::from_rotation_z(std::f32::consts::PI),
            ScreenRotation::Deg270 => Mat4::from_rotation_z(-std::f32::consts::FRAC_PI_2),
        }
    }

    /// Whether texture-space axes are transposed relative to screen space.
    ///
    /// True for the two orientations drawn with a quarter-turn quad; the
    /// camera image must then be reasoned about in the rotated frame.
    #[must_use]
    pub fn transposes_axes(self) -> bool {
        matches!(self, ScreenRotation::Deg90 | ScreenRotation::Deg270)
    }

    /// Parses the raw degree value reported by the platform.
    #[must_use]
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(ScreenRotation::Deg0),
            90 => Some(ScreenRotation::Deg90),
            180 => Some(ScreenRotation::Deg180),
            270 => Some(ScreenRotation::Deg270),
            _ => None,
        }
    }

    /// Like [`from_degrees`](Self::from_degrees), but logs an unrecognized
    /// value and falls back to the identity orientation.
    #[must_use]
    pub fn from_degrees_or_default(degrees: u32) -> Self {
        Self::from_degrees(degrees).unwrap_or_else(|| {
            log::error!("Unknown screen rotation {degrees}, treating as 0");
            ScreenRotation::Deg0
        })
    }

    /// The rotation as degrees.
    #[must_use]
    pub fn degrees(self) -> u32 {
        match self {
            ScreenRotation::Deg0 => 0,
            ScreenRotation::Deg90 => 90,
            ScreenRotation::Deg180 => 180,
            ScreenRotation::Deg270 => 270,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_model_matrix_quarter_turns() {
        let x = Vec4::new(1.0, 0.0, 0.0, 1.0);

        assert_eq!(ScreenRotation::Deg0.model_matrix(), Mat4::IDENTITY);

        // +90 degrees about Z maps +X onto +Y
        let rotated = ScreenRotation::Deg90.model_matrix() * x;
        assert!(rotated.x.abs() < 1e-6);
        assert!((rotated.y - 1.0).abs() < 1e-6);

        // -90 degrees maps +X onto -Y
        let rotated = ScreenRotation::Deg270.model_matrix() * x;
        assert!(rotated.x.abs() < 1e-6);
        assert!((rotated.y + 1.0).abs() < 1e-6);

        let rotated = ScreenRotation::Deg180.model_matrix() * x;
        assert!((rotated.x + 1.0).abs() < 1e-6);
        assert!(rotated.y.abs() < 1e-6);
    }

    #[test]
    fn test_transposes_axes() {
        assert!(!ScreenRotation::Deg0.transposes_axes());
        assert!(ScreenRotation::Deg90.transposes_axes());
        assert!(!ScreenRotation::Deg180.transposes_axes());
        assert!(ScreenRotation::Deg270.transposes_axes());
    }

    #[test]
    fn test_from_degrees() {
        assert_eq!(ScreenRotation::from_degrees(90), Some(ScreenRotation::Deg90));
        assert_eq!(ScreenRotation::from_degrees(45), None);
        // Unknown values resolve to the identity orientation
        assert_eq!(
            ScreenRotation::from_degrees_or_default(45),
            ScreenRotation::Deg0
        );
    }

    #[test]
    fn test_degrees_round_trip() {
        for rotation in [
            ScreenRotation::Deg0,
            ScreenRotation::Deg90,
            ScreenRotation::Deg180,
            ScreenRotation::Deg270,
        ] {
            assert_eq!(ScreenRotation::from_degrees(rotation.degrees()), Some(rotation));
        }
    }
}
