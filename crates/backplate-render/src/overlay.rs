//! Overlay projection alignment.

use glam::Mat4;

/// Adjusts a projection matrix so separately rendered 3D content tracks the
/// cropped camera backdrop.
///
/// Multiplies the X/Y diagonal entries by the scale factors exposed by
/// [`BackdropPass`](crate::BackdropPass): when the camera image is shown
/// with its width cropped, the visible horizontal field of view shrinks and
/// the overlay must magnify X to match (`scale_x > 1`), and symmetrically
/// for a cropped height.
#[must_use]
pub fn scaled_projection(proj: Mat4, scale_x: f32, scale_y: f32) -> Mat4 {
    let mut matrix = proj;
    matrix.x_axis.x *= scale_x;
    matrix.y_axis.y *= scale_y;
    matrix
}
