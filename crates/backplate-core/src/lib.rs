//! Core abstractions for backplate-rs.
//!
//! This crate provides the GPU-free half of the camera backdrop compositor:
//! - [`CameraFrame`] trait abstracting frames delivered by a tracking SDK
//! - [`FrameStaging`] double-buffered hand-off between the frame-delivery
//!   thread and the render thread
//! - [`Correction`] aspect/rotation correction math for cropping the camera
//!   image to the viewport without distortion
//! - [`ScreenRotation`] and [`ViewportGeometry`] display state
//! - Configuration options and error types

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod correction;
pub mod error;
pub mod frame;
pub mod options;
pub mod rotation;
pub mod staging;
pub mod viewport;

pub use correction::Correction;
pub use error::{BackplateError, Result};
pub use frame::{CameraFrame, ColorFormat, FrameOrigin, OwnedFrame};
pub use options::Options;
pub use rotation::ScreenRotation;
pub use staging::{next_power_of_two, padded_extent, FrameStaging, StagedFrame, MAX_TEXTURE_DIM};
pub use viewport::ViewportGeometry;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec3};
