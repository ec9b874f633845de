use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::traits::track_handle::SharedTrack;

/// Participant identifier used by layout consumers.
pub type Uid = u32;

/// The local participant always lives under uid 0.
pub const LOCAL_UID: Uid = 0;

/// Tracks registered for one participant.
#[derive(Clone, Default)]
pub struct MediaEntry {
    pub audio_track: Option<SharedTrack>,
    pub video_track: Option<SharedTrack>,
}

impl MediaEntry {
    pub fn is_empty(&self) -> bool {
        self.audio_track.is_none() && self.video_track.is_none()
    }
}

impl fmt::Debug for MediaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaEntry")
            .field("audio", &self.audio_track.as_ref().map(|t| t.id()))
            .field("video", &self.video_track.as_ref().map(|t| t.id()))
            .finish()
    }
}

/// Shared uid → tracks registry read by layout components.
///
/// Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct MediaStore {
    entries: Arc<RwLock<HashMap<Uid, MediaEntry>>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, uid: Uid, entry: MediaEntry) {
        self.entries.write().insert(uid, entry);
    }

    pub fn get(&self, uid: Uid) -> Option<MediaEntry> {
        self.entries.read().get(&uid).cloned()
    }

    pub fn remove(&self, uid: Uid) -> Option<MediaEntry> {
        self.entries.write().remove(&uid)
    }

    pub fn local(&self) -> Option<MediaEntry> {
        self.get(LOCAL_UID)
    }

    /// Registered uids in ascending order.
    pub fn uids(&self) -> Vec<Uid> {
        let mut uids: Vec<Uid> = self.entries.read().keys().copied().collect();
        uids.sort_unstable();
        uids
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTrack;

    #[test]
    fn clones_share_entries() {
        let store = MediaStore::new();
        let view = store.clone();

        store.set(
            LOCAL_UID,
            MediaEntry {
                audio_track: Some(FakeTrack::new("a1")),
                video_track: None,
            },
        );
        store.set(42, MediaEntry::default());

        assert_eq!(view.uids(), vec![LOCAL_UID, 42]);
        let local = view.local().unwrap();
        assert_eq!(local.audio_track.unwrap().id(), "a1");
        assert!(local.video_track.is_none());
        assert!(view.get(42).unwrap().is_empty());
    }

    #[test]
    fn remove_entry() {
        let store = MediaStore::new();
        store.set(7, MediaEntry::default());
        assert_eq!(store.len(), 1);

        assert!(store.remove(7).is_some());
        assert!(store.remove(7).is_none());
        assert!(store.is_empty());
    }
}
