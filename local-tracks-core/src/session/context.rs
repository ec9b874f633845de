use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::state::PublishedState;
use crate::session::events::{EventQueue, TrackEvent};
use crate::traits::track_handle::SharedTrack;

/// Read-only view handed to rendering consumers.
///
/// Reads always see the latest published snapshot. `swap_camera()` only
/// enqueues a command; its effect shows up in a later snapshot.
#[derive(Clone)]
pub struct TracksContext {
    snapshot: Arc<RwLock<PublishedState>>,
    queue: EventQueue,
}

impl TracksContext {
    pub(crate) fn new(snapshot: Arc<RwLock<PublishedState>>, queue: EventQueue) -> Self {
        Self { snapshot, queue }
    }

    pub fn local_audio_track(&self) -> Option<SharedTrack> {
        self.snapshot.read().audio_track().cloned()
    }

    pub fn local_video_track(&self) -> Option<SharedTrack> {
        self.snapshot.read().video_track().cloned()
    }

    pub fn snapshot(&self) -> PublishedState {
        self.snapshot.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_ready()
    }

    /// Toggle between the front and back camera.
    pub fn swap_camera(&self) {
        if !self.queue.push(TrackEvent::SwapCamera) {
            log::debug!("swap requested after teardown, ignoring");
        }
    }
}
