//! backplate: aspect-correct camera backdrop compositing for AR overlays.
//!
//! A tracking SDK delivers camera frames and pose data; backplate renders
//! the camera feed across the whole target as an undistorted background and
//! hands the overlay renderer the scale factors it needs to stay visually
//! aligned with the cropped image.
//!
//! # Quick Start
//!
//! ```no_run
//! use backplate::*;
//!
//! fn main() -> Result<()> {
//!     // One session per render target, sized to the display
//!     let mut session = Session::new(480, 800, &Options::default())?;
//!
//!     // Hand this to the SDK's frame callback; it is Send + Clone
//!     let sink = session.frame_sink();
//!     let frame = OwnedFrame::rgba8(640, 480, vec![0; 640 * 480 * 4])?;
//!     sink.submit(&frame)?;
//!
//!     // On the render thread
//!     session.render_frame();
//!     let (scale_x, scale_y) = session.scale_factors();
//!     let proj = session.align_projection(Mat4::IDENTITY * scale_x.max(scale_y));
//!     let _ = proj;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`FrameStaging`] is the hand-off between the SDK's frame-delivery
//!   thread and the render thread (double-buffered, at most one frame
//!   pending).
//! - [`BackdropPass`] owns the GPU texture (allocated once at the padded
//!   power-of-two size, updated by sub-image uploads) and the crop math.
//! - [`Session`] wires a [`TrackingSource`] hook, the viewport state, and
//!   the backdrop pass to one render target.

mod session;
mod tracking;

pub use session::Session;
pub use tracking::{NullTracking, TrackingSource};

// Re-export core types
pub use backplate_core::{
    BackplateError, CameraFrame, ColorFormat, Correction, FrameOrigin, FrameStaging, Options,
    OwnedFrame, Result, ScreenRotation, ViewportGeometry,
};

// Re-export render types
pub use backplate_render::{scaled_projection, BackdropPass, RenderEngine, RenderError};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec3};
