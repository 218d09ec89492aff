//! Aspect and rotation correction for the camera backdrop.
//!
//! Maps a camera image of one aspect ratio onto a viewport of another by
//! uniform, centered cropping along a single axis (the image is never
//! stretched) and derives the scale factors a separately rendered 3D
//! overlay must apply to its projection matrix to stay aligned with the
//! cropped background.

use crate::viewport::ViewportGeometry;

/// Texture-space crop offsets and overlay scale factors for one frame.
///
/// An atomic snapshot derived from the camera dimensions and the current
/// viewport geometry. Always recomputed whole, never partially updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Horizontal crop offset in normalized camera-image space.
    pub offset_u: f32,
    /// Vertical crop offset in normalized camera-image space.
    pub offset_v: f32,
    /// Factor the overlay projection must scale X by. Greater than 1 when
    /// the camera image is displayed with its width cropped.
    pub scale_x: f32,
    /// Factor the overlay projection must scale Y by. Greater than 1 when
    /// the camera image is displayed with its height cropped.
    pub scale_y: f32,
    /// Whether the rotation transposes texture and screen axes.
    pub transposed: bool,
}

impl Correction {
    /// Computes the crop and overlay correction for a camera image shown on
    /// the given viewport.
    #[must_use]
    pub fn compute(camera_width: u32, camera_height: u32, viewport: &ViewportGeometry) -> Self {
        let raw_aspect = camera_width.max(1) as f32 / camera_height.max(1) as f32;
        let transposed = viewport.rotation.transposes_axes();
        // Under a quarter-turn the sensor image is reasoned about in the
        // rotated frame, so the effective aspect is the reciprocal.
        let camera_aspect = if transposed {
            1.0 / raw_aspect
        } else {
            raw_aspect
        };
        let screen_aspect = viewport.aspect_ratio();

        let mut offset_u;
        let mut offset_v;
        let scale_x;
        let scale_y;

        if camera_aspect > screen_aspect {
            // Camera image is relatively wider, so crop its width.
            let ratio = screen_aspect / camera_aspect;
            offset_u = 0.5 * (1.0 - ratio);
            offset_v = 0.0;
            scale_x = camera_aspect / screen_aspect;
            scale_y = 1.0;
        } else {
            // Screen is wider, so crop the height.
            let ratio = camera_aspect / screen_aspect;
            offset_v = 0.5 * (1.0 - ratio);
            offset_u = 0.0;
            scale_x = 1.0;
            scale_y = screen_aspect / camera_aspect;
        }

        if transposed {
            // The quad is drawn with a quarter-turn rotation; texture U runs
            // along screen Y, so the crop offsets switch axes.
            std::mem::swap(&mut offset_u, &mut offset_v);
        }

        Self {
            offset_u,
            offset_v,
            scale_x,
            scale_y,
            transposed,
        }
    }

    /// Builds the four triangle-strip UV coordinates for the backdrop quad.
    ///
    /// `x_ratio`/`y_ratio` are the fractional occupancy of the camera image
    /// inside the padded power-of-two texture; the crop offsets apply within
    /// that occupied region. Vertex order matches the quad: bottom-left,
    /// bottom-right, top-left, top-right.
    #[must_use]
    pub fn uv_quad(&self, x_ratio: f32, y_ratio: f32) -> [[f32; 2]; 4] {
        let u0 = self.offset_u * x_ratio;
        let u1 = (1.0 - self.offset_u) * x_ratio;
        let v0 = self.offset_v * y_ratio;
        let v1 = (1.0 - self.offset_v) * y_ratio;
        [[u0, v1], [u1, v1], [u0, v0], [u1, v0]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::ScreenRotation;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_portrait_viewport_crops_width() {
        // 640x480 camera (aspect 1.3333) on a 480x800 display (aspect 0.6):
        // camera is wider, crop its width.
        let viewport = ViewportGeometry::new(480, 800);
        let c = Correction::compute(640, 480, &viewport);

        assert!((c.offset_u - 0.275).abs() < EPS);
        assert!(c.offset_v.abs() < EPS);
        assert!((c.scale_x - (640.0 / 480.0) / 0.6).abs() < EPS);
        assert!((c.scale_y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_landscape_viewport_crops_height() {
        // 640x480 camera on an 800x480 display (aspect 1.6667): screen is
        // wider, crop the camera image's height.
        let viewport = ViewportGeometry::new(800, 480);
        let c = Correction::compute(640, 480, &viewport);

        assert!(c.offset_u.abs() < EPS);
        assert!((c.offset_v - 0.1).abs() < EPS);
        assert!((c.scale_x - 1.0).abs() < EPS);
        assert!((c.scale_y - (800.0 / 480.0) / (640.0 / 480.0)).abs() < EPS);
    }

    #[test]
    fn test_matching_aspects_need_no_crop() {
        let viewport = ViewportGeometry::new(1280, 960);
        let c = Correction::compute(640, 480, &viewport);

        assert!(c.offset_u.abs() < EPS);
        assert!(c.offset_v.abs() < EPS);
        assert!((c.scale_x - 1.0).abs() < EPS);
        assert!((c.scale_y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_quarter_turn_uses_reciprocal_aspect_and_swaps_offsets() {
        let upright = ViewportGeometry::new(480, 800);
        let turned = ViewportGeometry::new(480, 800).with_rotation(ScreenRotation::Deg90);

        let c0 = Correction::compute(640, 480, &upright);
        let c90 = Correction::compute(640, 480, &turned);

        assert!(!c0.transposed);
        assert!(c90.transposed);

        // Effective aspect 480/640 = 0.75 still exceeds 0.6, so the width is
        // cropped, but the offset lands on the V axis after the swap.
        assert!(c90.offset_u.abs() < EPS);
        assert!((c90.offset_v - 0.5 * (1.0 - 0.6 / 0.75)).abs() < EPS);
        assert!((c90.scale_x - 0.75 / 0.6).abs() < EPS);
        assert!((c90.scale_y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_uv_quad_respects_occupancy() {
        let viewport = ViewportGeometry::new(800, 480);
        let c = Correction::compute(640, 480, &viewport);
        // 640x480 image in a 1024x512 texture.
        let quad = c.uv_quad(640.0 / 1024.0, 480.0 / 512.0);

        let x_ratio = 640.0 / 1024.0;
        let y_ratio = 480.0 / 512.0;
        // Bottom-left vertex samples the lowest included row.
        assert!((quad[0][0] - 0.0).abs() < EPS);
        assert!((quad[0][1] - 0.9 * y_ratio).abs() < EPS);
        // Top-right vertex.
        assert!((quad[3][0] - x_ratio).abs() < EPS);
        assert!((quad[3][1] - 0.1 * y_ratio).abs() < EPS);
    }

    proptest! {
        /// Exactly one overlay scale is unity; the other is the ratio of the
        /// larger aspect to the smaller, oriented by the wider-crops-width
        /// law.
        #[test]
        fn prop_one_scale_is_unity(
            cw in 1u32..4096,
            ch in 1u32..4096,
            vw in 1u32..4096,
            vh in 1u32..4096,
        ) {
            let viewport = ViewportGeometry::new(vw, vh);
            let c = Correction::compute(cw, ch, &viewport);

            let camera_aspect = cw as f32 / ch as f32;
            let screen_aspect = viewport.aspect_ratio();
            let expected = camera_aspect.max(screen_aspect) / camera_aspect.min(screen_aspect);

            if camera_aspect > screen_aspect {
                prop_assert!((c.scale_y - 1.0).abs() < EPS);
                prop_assert!((c.scale_x - expected).abs() < expected * EPS);
            } else {
                prop_assert!((c.scale_x - 1.0).abs() < EPS);
                prop_assert!((c.scale_y - expected).abs() < expected * EPS);
            }
        }

        /// The cropped UV rectangle always lies within the unit square.
        #[test]
        fn prop_uv_quad_inside_unit_square(
            cw in 1u32..2048,
            ch in 1u32..2048,
            vw in 1u32..4096,
            vh in 1u32..4096,
            turned in proptest::bool::ANY,
        ) {
            let rotation = if turned { ScreenRotation::Deg90 } else { ScreenRotation::Deg0 };
            let viewport = ViewportGeometry::new(vw, vh).with_rotation(rotation);
            let c = Correction::compute(cw, ch, &viewport);

            let tw = crate::staging::next_power_of_two(cw, crate::staging::MAX_TEXTURE_DIM).unwrap();
            let th = crate::staging::next_power_of_two(ch, crate::staging::MAX_TEXTURE_DIM).unwrap();
            let quad = c.uv_quad(cw as f32 / tw as f32, ch as f32 / th as f32);

            for [u, v] in quad {
                prop_assert!((-EPS..=1.0 + EPS).contains(&u));
                prop_assert!((-EPS..=1.0 + EPS).contains(&v));
            }
        }

        /// A quarter-turn swaps which offset axis carries the crop relative
        /// to the upright orientation of the same camera and display.
        #[test]
        fn prop_quarter_turn_swaps_offsets(
            cw in 1u32..4096,
            ch in 1u32..4096,
            vw in 1u32..4096,
            vh in 1u32..4096,
        ) {
            let upright = ViewportGeometry::new(vw, vh);
            let turned = upright.with_rotation(ScreenRotation::Deg270);

            let c_turned = Correction::compute(cw, ch, &turned);
            // Transposing the camera dimensions in the upright orientation
            // must produce the same crop, on swapped axes.
            let c_swapped = Correction::compute(ch, cw, &upright);

            prop_assert!((c_turned.offset_u - c_swapped.offset_v).abs() < EPS);
            prop_assert!((c_turned.offset_v - c_swapped.offset_u).abs() < EPS);
        }
    }
}
