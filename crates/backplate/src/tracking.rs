//! Tracking-source hook.

/// Per-draw hook for the pose-tracking SDK.
///
/// Invoked once per rendered frame, before the backdrop is drawn, so the
/// SDK can advance its tracking state. No rendering side effects are
/// expected from the hook in this configuration.
pub trait TrackingSource {
    /// Advances tracking for the frame about to be rendered.
    fn update(&mut self);
}

/// A tracking source that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracking;

impl TrackingSource for NullTracking {
    fn update(&mut self) {}
}
