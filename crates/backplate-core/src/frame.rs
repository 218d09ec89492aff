//! Camera frame abstraction.
//!
//! The tracking SDK delivers raw pixel buffers on its own thread. The
//! compositor never depends on a concrete SDK frame type; it only sees the
//! [`CameraFrame`] trait, whose pixel bytes stay owned by the caller for the
//! duration of the call.

use crate::error::{BackplateError, Result};

/// Pixel format tag attached to a delivered camera frame.
///
/// Only [`ColorFormat::Rgba8`] can be uploaded; frames in any other format
/// are dropped with a log message. The remaining tags exist because capture
/// stacks deliver them, and rejecting them must be explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// 32-bit interleaved RGBA, 8 bits per channel. The only supported format.
    Rgba8,
    /// 32-bit interleaved BGRA. Rejected.
    Bgra8,
    /// Planar YUV 4:2:0 (NV21), the usual mobile capture format. Rejected.
    Nv21,
    /// 8-bit grayscale. Rejected.
    Gray8,
}

impl ColorFormat {
    /// Bytes per pixel for interleaved formats, `None` for planar ones.
    #[must_use]
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            ColorFormat::Rgba8 | ColorFormat::Bgra8 => Some(4),
            ColorFormat::Gray8 => Some(1),
            ColorFormat::Nv21 => None,
        }
    }

    /// Whether the compositor can upload this format directly.
    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, ColorFormat::Rgba8)
    }
}

/// Row origin convention of a delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// First row is the top of the image. The only accepted convention.
    UpperLeft,
    /// First row is the bottom of the image. Dropped; flipping is not
    /// implemented.
    LowerLeft,
}

/// A camera frame as delivered by the tracking SDK.
///
/// Implementations must copy pixels out synchronously in
/// [`copy_pixels_into`](CameraFrame::copy_pixels_into); the compositor takes
/// no ownership of the underlying buffer and never touches it after the call
/// returns.
pub trait CameraFrame {
    /// Frame width in pixels. Always positive.
    fn width(&self) -> u32;

    /// Frame height in pixels. Always positive.
    fn height(&self) -> u32;

    /// Pixel format of the raw bytes.
    fn format(&self) -> ColorFormat;

    /// Row origin convention.
    fn origin(&self) -> FrameOrigin;

    /// Copies the raw pixel bytes into `dest`, which is sized to exactly
    /// `width * height * bytes_per_pixel`.
    fn copy_pixels_into(&self, dest: &mut [u8]);
}

/// A camera frame backed by an owned byte vector.
///
/// Useful for tests and for embedders that already hold a copied buffer.
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    width: u32,
    height: u32,
    format: ColorFormat,
    origin: FrameOrigin,
    pixels: Vec<u8>,
}

impl OwnedFrame {
    /// Creates a frame, validating that the pixel buffer matches the
    /// declared dimensions and format.
    pub fn new(
        width: u32,
        height: u32,
        format: ColorFormat,
        origin: FrameOrigin,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        let bpp = format
            .bytes_per_pixel()
            .ok_or(BackplateError::UnsizedFormat(format))?;
        let expected = width as usize * height as usize * bpp;
        if pixels.len() != expected {
            return Err(BackplateError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            origin,
            pixels,
        })
    }

    /// Convenience constructor for the supported top-left RGBA layout.
    pub fn rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::new(
            width,
            height,
            ColorFormat::Rgba8,
            FrameOrigin::UpperLeft,
            pixels,
        )
    }
}

impl CameraFrame for OwnedFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> ColorFormat {
        self.format
    }

    fn origin(&self) -> FrameOrigin {
        self.origin
    }

    fn copy_pixels_into(&self, dest: &mut [u8]) {
        dest.copy_from_slice(&self.pixels);
    }
}
