use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::error::CaptureError;
use crate::models::state::{PublishedState, SessionPhase};
use crate::store::media_store::{MediaEntry, MediaStore, LOCAL_UID};
use crate::traits::track_observer::TrackObserver;

/// Writes the published snapshot and fans it out.
///
/// The shared snapshot is the single source of truth read by
/// `TracksContext`; observers and the media store are notified after it
/// has been replaced.
pub struct Publisher {
    snapshot: Arc<RwLock<PublishedState>>,
    observers: Vec<Arc<dyn TrackObserver>>,
    media_store: Option<MediaStore>,
}

impl Publisher {
    pub fn new(snapshot: Arc<RwLock<PublishedState>>) -> Self {
        Self {
            snapshot,
            observers: Vec::new(),
            media_store: None,
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn TrackObserver>) {
        self.observers.push(observer);
    }

    pub fn set_media_store(&mut self, store: MediaStore) {
        self.media_store = Some(store);
    }

    pub fn current(&self) -> PublishedState {
        self.snapshot.read().clone()
    }

    /// Replace the snapshot. Returns false (and notifies nobody) when
    /// `state` carries the same tracks, readiness and error as the current one.
    pub fn publish(&self, state: PublishedState) -> bool {
        if self.snapshot.read().same_as(&state) {
            return false;
        }
        *self.snapshot.write() = state.clone();
        log::info!("published {:?}", state);

        if let Some(ref store) = self.media_store {
            let entry = MediaEntry {
                audio_track: state.audio_track().cloned(),
                video_track: state.video_track().cloned(),
            };
            if entry.is_empty() {
                store.remove(LOCAL_UID);
            } else {
                store.set(LOCAL_UID, entry);
            }
        }

        for observer in &self.observers {
            observer.on_published(&state);
        }
        true
    }

    pub fn phase_changed(&self, phase: SessionPhase) {
        for observer in &self.observers {
            observer.on_phase_changed(phase);
        }
    }

    pub fn error(&self, error: &CaptureError) {
        for observer in &self.observers {
            observer.on_error(error);
        }
    }
}
