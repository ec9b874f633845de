use std::collections::HashMap;

use crate::models::request::{DeviceClass, FacingMode};
use crate::traits::track_handle::SharedTrack;

/// Key of an owned track in the handle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackSlot {
    Audio,
    Video(FacingMode),
}

impl TrackSlot {
    pub fn device_class(&self) -> DeviceClass {
        match self {
            Self::Audio => DeviceClass::Audio,
            Self::Video(_) => DeviceClass::Video,
        }
    }
}

/// Tracks owned by the session, i.e. open and not yet closed.
///
/// Only the publication machine mutates it. Removing a track hands ownership
/// back to the caller, who is then responsible for closing it.
#[derive(Default)]
pub struct HandleTable {
    slots: HashMap<TrackSlot, SharedTrack>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `track` in `slot`, returning the track it displaced.
    pub fn install(&mut self, slot: TrackSlot, track: SharedTrack) -> Option<SharedTrack> {
        self.slots.insert(slot, track)
    }

    pub fn get(&self, slot: TrackSlot) -> Option<&SharedTrack> {
        self.slots.get(&slot)
    }

    pub fn take(&mut self, slot: TrackSlot) -> Option<SharedTrack> {
        self.slots.remove(&slot)
    }

    /// Any open video track, whichever facing mode it belongs to.
    pub fn any_video(&self) -> Option<&SharedTrack> {
        self.get(TrackSlot::Video(FacingMode::User))
            .or_else(|| self.get(TrackSlot::Video(FacingMode::Environment)))
    }

    /// Remove every video track except the one for `keep`.
    pub fn take_video_except(&mut self, keep: Option<FacingMode>) -> Vec<SharedTrack> {
        [FacingMode::User, FacingMode::Environment]
            .into_iter()
            .filter(|mode| Some(*mode) != keep)
            .filter_map(|mode| self.take(TrackSlot::Video(mode)))
            .collect()
    }

    pub fn count(&self, class: DeviceClass) -> usize {
        self.slots.keys().filter(|slot| slot.device_class() == class).count()
    }

    /// Remove every track.
    pub fn drain(&mut self) -> Vec<(TrackSlot, SharedTrack)> {
        self.slots.drain().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::traits::track_handle::TrackHandle;

    struct Named(&'static str);

    impl TrackHandle for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn close(&self) {}
    }

    fn track(id: &'static str) -> SharedTrack {
        Arc::new(Named(id))
    }

    #[test]
    fn install_returns_displaced() {
        let mut table = HandleTable::new();
        assert!(table.install(TrackSlot::Audio, track("a1")).is_none());

        let displaced = table.install(TrackSlot::Audio, track("a2")).unwrap();
        assert_eq!(displaced.id(), "a1");
        assert_eq!(table.get(TrackSlot::Audio).unwrap().id(), "a2");
    }

    #[test]
    fn take_video_except_keeps_selected() {
        let mut table = HandleTable::new();
        table.install(TrackSlot::Audio, track("a1"));
        table.install(TrackSlot::Video(FacingMode::User), track("v1"));
        table.install(TrackSlot::Video(FacingMode::Environment), track("v2"));
        assert_eq!(table.count(DeviceClass::Video), 2);

        let removed = table.take_video_except(Some(FacingMode::Environment));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), "v1");
        assert_eq!(table.count(DeviceClass::Video), 1);
        assert_eq!(table.count(DeviceClass::Audio), 1);
        assert_eq!(table.any_video().unwrap().id(), "v2");

        let removed = table.take_video_except(None);
        assert_eq!(removed.len(), 1);
        assert!(table.any_video().is_none());
    }

    #[test]
    fn drain_empties_table() {
        let mut table = HandleTable::new();
        table.install(TrackSlot::Audio, track("a1"));
        table.install(TrackSlot::Video(FacingMode::User), track("v1"));

        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert!(table.is_empty());
    }
}
