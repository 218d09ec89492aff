//! Double-buffered CPU staging for incoming camera frames.
//!
//! The tracking SDK delivers frames on its own thread while the render
//! thread consumes them. Ingest copies each accepted frame into the back
//! buffer and marks it dirty; the render thread swaps the buffers under the
//! lock and uploads from the front buffer. A frame arriving before the
//! previous one was consumed simply overwrites it: at most one frame is
//! ever pending, and drops are acceptable.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{BackplateError, Result};
use crate::frame::{CameraFrame, FrameOrigin};

/// Hard ceiling on either padded texture dimension (2^11).
pub const MAX_TEXTURE_DIM: u32 = 1 << 11;

/// Returns the smallest power of two >= `value`, failing above `max`.
pub fn next_power_of_two(value: u32, max: u32) -> Result<u32> {
    let mut dim = 1;
    while dim < value {
        dim <<= 1;
        if dim > max {
            return Err(BackplateError::TextureTooLarge { required: dim, max });
        }
    }
    Ok(dim)
}

/// Padded power-of-two texture extent for a camera image.
pub fn padded_extent(width: u32, height: u32, max_dim: u32) -> Result<(u32, u32)> {
    Ok((
        next_power_of_two(width, max_dim)?,
        next_power_of_two(height, max_dim)?,
    ))
}

#[derive(Debug)]
struct StagingInner {
    /// Written by the ingest thread.
    back: Vec<u8>,
    /// Read by the render thread after a swap.
    front: Vec<u8>,
    camera_extent: (u32, u32),
    texture_extent: (u32, u32),
    dirty: bool,
    initialized: bool,
}

/// Shared staging area between the frame-delivery thread and the render
/// thread.
///
/// Cloning yields another handle to the same staging area; the ingest side
/// holds no GPU state and may live on any thread.
#[derive(Debug, Clone)]
pub struct FrameStaging {
    inner: Arc<Mutex<StagingInner>>,
    max_texture_dim: u32,
}

impl Default for FrameStaging {
    fn default() -> Self {
        Self::new(MAX_TEXTURE_DIM)
    }
}

impl FrameStaging {
    /// Creates an empty staging area with the given texture dimension cap.
    #[must_use]
    pub fn new(max_texture_dim: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StagingInner {
                back: Vec::new(),
                front: Vec::new(),
                camera_extent: (0, 0),
                texture_extent: (0, 0),
                dirty: false,
                initialized: false,
            })),
            max_texture_dim: max_texture_dim.min(MAX_TEXTURE_DIM),
        }
    }

    /// Accepts a camera frame from the delivery thread.
    ///
    /// Frames with an unsupported pixel format or a lower-left origin are
    /// logged and dropped without touching any state; this is expected to
    /// recur harmlessly if the SDK is misconfigured. The first accepted
    /// frame fixes the padded texture extent for the lifetime of the
    /// staging; a later frame with different dimensions is dropped. The only
    /// hard failure is a camera image whose padded dimension would exceed
    /// the cap.
    pub fn submit(&self, frame: &dyn CameraFrame) -> Result<()> {
        if !frame.format().is_supported() {
            log::error!(
                "Dropping camera frame with unsupported color format {:?}",
                frame.format()
            );
            return Ok(());
        }
        if frame.origin() != FrameOrigin::UpperLeft {
            log::error!("Dropping lower-left origin camera frame: flipping is not implemented");
            return Ok(());
        }

        let width = frame.width();
        let height = frame.height();
        let byte_len = width as usize * height as usize * 4;

        let mut inner = self.lock();

        if inner.initialized {
            if inner.camera_extent != (width, height) {
                log::error!(
                    "Dropping {width}x{height} camera frame: staging is fixed at {}x{}",
                    inner.camera_extent.0,
                    inner.camera_extent.1
                );
                return Ok(());
            }
        } else {
            inner.texture_extent = padded_extent(width, height, self.max_texture_dim)?;
            inner.camera_extent = (width, height);
            inner.back = vec![0; byte_len];
            inner.front = vec![0; byte_len];
            inner.initialized = true;
        }

        frame.copy_pixels_into(&mut inner.back);
        inner.dirty = true;
        Ok(())
    }

    /// Takes the most recent pending frame, if any.
    ///
    /// Swaps the double buffer under the lock and clears the dirty flag. The
    /// returned view holds the staging lock, blocking ingest until it is
    /// dropped, so keep it only for the duration of the GPU upload.
    #[must_use]
    pub fn acquire(&self) -> Option<StagedFrame<'_>> {
        let mut guard = self.lock();
        if !guard.dirty {
            return None;
        }
        let inner = &mut *guard;
        std::mem::swap(&mut inner.back, &mut inner.front);
        inner.dirty = false;
        Some(StagedFrame { guard })
    }

    /// Whether a frame is waiting to be consumed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Camera image dimensions, once the first frame has been accepted.
    #[must_use]
    pub fn camera_extent(&self) -> Option<(u32, u32)> {
        let inner = self.lock();
        inner.initialized.then_some(inner.camera_extent)
    }

    /// Padded power-of-two texture dimensions, once the first frame has
    /// been accepted.
    #[must_use]
    pub fn texture_extent(&self) -> Option<(u32, u32)> {
        let inner = self.lock();
        inner.initialized.then_some(inner.texture_extent)
    }

    fn lock(&self) -> MutexGuard<'_, StagingInner> {
        self.inner.lock().expect("staging lock poisoned")
    }
}

/// A consumed frame, valid until dropped.
pub struct StagedFrame<'a> {
    guard: MutexGuard<'a, StagingInner>,
}

impl StagedFrame<'_> {
    /// Tightly packed RGBA bytes of the camera image.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.guard.front
    }

    /// Camera image dimensions.
    #[must_use]
    pub fn camera_extent(&self) -> (u32, u32) {
        self.guard.camera_extent
    }

    /// Padded texture dimensions the GPU storage must be allocated at.
    #[must_use]
    pub fn texture_extent(&self) -> (u32, u32) {
        self.guard.texture_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ColorFormat, OwnedFrame};

    fn rgba_frame(width: u32, height: u32, value: u8) -> OwnedFrame {
        OwnedFrame::rgba8(width, height, vec![value; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(1, MAX_TEXTURE_DIM).unwrap(), 1);
        assert_eq!(next_power_of_two(480, MAX_TEXTURE_DIM).unwrap(), 512);
        assert_eq!(next_power_of_two(512, MAX_TEXTURE_DIM).unwrap(), 512);
        assert_eq!(next_power_of_two(640, MAX_TEXTURE_DIM).unwrap(), 1024);
        assert_eq!(next_power_of_two(2048, MAX_TEXTURE_DIM).unwrap(), 2048);
        assert!(matches!(
            next_power_of_two(2049, MAX_TEXTURE_DIM),
            Err(BackplateError::TextureTooLarge { required: 4096, .. })
        ));
    }

    #[test]
    fn test_first_frame_fixes_extents() {
        let staging = FrameStaging::default();
        assert_eq!(staging.texture_extent(), None);

        staging.submit(&rgba_frame(640, 480, 1)).unwrap();
        assert_eq!(staging.camera_extent(), Some((640, 480)));
        assert_eq!(staging.texture_extent(), Some((1024, 512)));

        // Repeated same-sized submissions leave the extents untouched.
        staging.submit(&rgba_frame(640, 480, 2)).unwrap();
        assert_eq!(staging.texture_extent(), Some((1024, 512)));
    }

    #[test]
    fn test_unsupported_format_is_a_no_op() {
        let staging = FrameStaging::default();
        let frame = OwnedFrame::new(
            4,
            4,
            ColorFormat::Bgra8,
            FrameOrigin::UpperLeft,
            vec![0; 64],
        )
        .unwrap();

        staging.submit(&frame).unwrap();
        assert!(!staging.is_dirty());
        assert_eq!(staging.texture_extent(), None);
    }

    #[test]
    fn test_lower_left_origin_is_dropped() {
        let staging = FrameStaging::default();
        let frame = OwnedFrame::new(
            4,
            4,
            ColorFormat::Rgba8,
            FrameOrigin::LowerLeft,
            vec![0; 64],
        )
        .unwrap();

        staging.submit(&frame).unwrap();
        assert!(!staging.is_dirty());
        assert_eq!(staging.texture_extent(), None);
    }

    #[test]
    fn test_oversized_frame_is_a_typed_error() {
        let staging = FrameStaging::default();
        let frame = rgba_frame(2060, 16, 0);
        assert!(matches!(
            staging.submit(&frame),
            Err(BackplateError::TextureTooLarge { .. })
        ));
        // The failed submission leaves the staging uninitialized.
        assert_eq!(staging.texture_extent(), None);
        assert!(!staging.is_dirty());
    }

    #[test]
    fn test_resolution_change_is_dropped() {
        let staging = FrameStaging::default();
        staging.submit(&rgba_frame(640, 480, 1)).unwrap();
        let _ = staging.acquire();

        staging.submit(&rgba_frame(320, 240, 2)).unwrap();
        assert!(!staging.is_dirty());
        assert_eq!(staging.camera_extent(), Some((640, 480)));
    }

    #[test]
    fn test_acquire_swaps_and_clears_dirty() {
        let staging = FrameStaging::default();
        staging.submit(&rgba_frame(4, 2, 9)).unwrap();
        assert!(staging.is_dirty());

        {
            let staged = staging.acquire().unwrap();
            assert_eq!(staged.camera_extent(), (4, 2));
            assert_eq!(staged.texture_extent(), (4, 2));
            assert_eq!(staged.pixels().len(), 4 * 2 * 4);
            assert!(staged.pixels().iter().all(|&b| b == 9));
        }

        assert!(!staging.is_dirty());
        assert!(staging.acquire().is_none());
    }

    #[test]
    fn test_newer_frame_overwrites_pending_one() {
        let staging = FrameStaging::default();
        staging.submit(&rgba_frame(4, 2, 1)).unwrap();
        staging.submit(&rgba_frame(4, 2, 2)).unwrap();

        let staged = staging.acquire().unwrap();
        assert!(staged.pixels().iter().all(|&b| b == 2));
    }

    #[test]
    fn test_handles_share_state_across_threads() {
        let staging = FrameStaging::default();
        let sink = staging.clone();

        let handle = std::thread::spawn(move || {
            sink.submit(&rgba_frame(8, 8, 5)).unwrap();
        });
        handle.join().unwrap();

        let staged = staging.acquire().unwrap();
        assert_eq!(staged.camera_extent(), (8, 8));
        assert!(staged.pixels().iter().all(|&b| b == 5));
    }
}
