use crate::models::error::CaptureError;
use crate::models::state::{PublishedState, SessionPhase};

/// Event delegate for session notifications.
///
/// All methods are called on the thread that processes session events.
/// Implementations should marshal to a UI thread if needed.
pub trait TrackObserver: Send + Sync {
    /// Called after every change of the published audio/video pair.
    fn on_published(&self, state: &PublishedState);

    /// Called when the session phase changes.
    fn on_phase_changed(&self, _phase: SessionPhase) {}

    /// Called when a required acquisition fails.
    fn on_error(&self, _error: &CaptureError) {}
}
