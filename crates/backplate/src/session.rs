//! Session lifecycle: engine, backdrop pass, viewport, and the tracking
//! hook, wired to one render target.

use pollster::FutureExt;

use backplate_core::{
    BackplateError, FrameStaging, Options, Result, ScreenRotation, ViewportGeometry,
};
use backplate_render::{BackdropPass, RenderEngine};
use glam::Mat4;

use crate::tracking::{NullTracking, TrackingSource};

/// A compositing session: one render target, one camera feed.
pub struct Session {
    engine: RenderEngine,
    backdrop: BackdropPass,
    viewport: ViewportGeometry,
    tracking: Box<dyn TrackingSource>,
}

impl Session {
    /// Creates a headless session sized to the display's current
    /// orientation.
    ///
    /// # Errors
    ///
    /// Fails if no GPU adapter or device is available, or if the backdrop
    /// pipeline does not validate.
    pub fn new(width: u32, height: u32, options: &Options) -> Result<Self> {
        let _ = env_logger::try_init();

        let engine = RenderEngine::new_headless(width, height)
            .block_on()
            .map_err(|e| BackplateError::RenderError(e.to_string()))?;
        let backdrop = BackdropPass::new(&engine.device, backplate_render::TARGET_FORMAT, options)
            .map_err(|e| BackplateError::RenderError(e.to_string()))?;

        log::info!("backplate session created ({width}x{height})");

        Ok(Self {
            engine,
            backdrop,
            viewport: ViewportGeometry::new(width, height),
            tracking: Box::new(NullTracking),
        })
    }

    /// Installs the tracking hook invoked before each draw.
    pub fn set_tracking_source(&mut self, source: Box<dyn TrackingSource>) {
        self.tracking = source;
    }

    /// Handle for the SDK's frame-delivery thread.
    #[must_use]
    pub fn frame_sink(&self) -> FrameStaging {
        self.backdrop.staging()
    }

    /// Applies a screen-rotation notification.
    pub fn set_rotation(&mut self, rotation: ScreenRotation) {
        self.viewport.set_rotation(rotation);
    }

    /// Rotation notification carrying the raw platform degree value.
    /// Unrecognized values are logged and treated as the identity
    /// orientation.
    pub fn notify_rotation(&mut self, degrees: u32) {
        self.viewport
            .set_rotation(ScreenRotation::from_degrees_or_default(degrees));
    }

    /// Resizes the render target. Display metrics are for the current
    /// orientation, so callers pass the swapped values after a rotation.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.engine.resize(width, height);
    }

    /// Renders one frame: the tracking hook, then the backdrop blit.
    pub fn render_frame(&mut self) {
        self.tracking.update();

        let mut encoder =
            self.engine
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("session encoder"),
                });
        self.backdrop.draw(
            &self.engine.device,
            &self.engine.queue,
            &mut encoder,
            self.engine.target_view(),
            &self.viewport,
        );
        self.engine.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Overlay correction factors for the most recently drawn frame.
    #[must_use]
    pub fn scale_factors(&self) -> (f32, f32) {
        (self.backdrop.scale_x(), self.backdrop.scale_y())
    }

    /// Adjusts an overlay projection matrix to match the cropped backdrop.
    #[must_use]
    pub fn align_projection(&self, proj: Mat4) -> Mat4 {
        backplate_render::scaled_projection(proj, self.backdrop.scale_x(), self.backdrop.scale_y())
    }

    /// Renders one frame and reads the target back as tightly packed RGBA
    /// bytes. Blocking; intended for tests and batch use.
    pub fn render_to_image(&mut self) -> Result<Vec<u8>> {
        self.render_frame();
        self.engine
            .read_target()
            .map_err(|e| BackplateError::RenderError(e.to_string()))
    }

    /// Current viewport geometry.
    #[must_use]
    pub fn viewport(&self) -> &ViewportGeometry {
        &self.viewport
    }

    /// The underlying engine, for overlay renderers that share the device.
    #[must_use]
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// The backdrop pass.
    #[must_use]
    pub fn backdrop(&self) -> &BackdropPass {
        &self.backdrop
    }
}
