//! Rendering backend for backplate-rs.
//!
//! This crate provides the wgpu-based half of the compositor:
//! - A headless-capable [`RenderEngine`] owning the device and color target
//! - The [`BackdropPass`], which manages the camera texture and blits the
//!   aspect-corrected camera image as the scene background
//! - The overlay projection helper for aligning 3D content with the
//!   cropped backdrop

pub mod backdrop;
pub mod engine;
pub mod error;
pub mod overlay;

pub use backdrop::{BackdropPass, BackdropUniforms};
pub use engine::{RenderEngine, TARGET_FORMAT};
pub use error::{RenderError, RenderResult};
pub use overlay::scaled_projection;
