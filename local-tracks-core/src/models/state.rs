use std::fmt;

use serde::Serialize;

use super::error::CaptureError;
use super::request::FacingMode;
use crate::traits::track_handle::{same_optional_track, SharedTrack};

/// Track publication state machine phases.
///
/// ```text
/// idle → acquiring → ready ⇄ swapping
///            ↓          ↓        ↓
///                    closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Acquiring,
    Ready,
    Swapping,
    Closed,
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Ready => "ready",
            Self::Swapping => "swapping",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally visible audio/video pair.
///
/// Only the session writes it; consumers get clones. `ready` is true iff
/// both tracks are present and nothing failed.
#[derive(Clone, Default)]
pub struct PublishedState {
    audio_track: Option<SharedTrack>,
    video_track: Option<SharedTrack>,
    facing_mode: FacingMode,
    ready: bool,
    error: Option<CaptureError>,
}

impl PublishedState {
    pub(crate) fn new(
        audio_track: Option<SharedTrack>,
        video_track: Option<SharedTrack>,
        facing_mode: FacingMode,
        error: Option<CaptureError>,
    ) -> Self {
        let ready = audio_track.is_some() && video_track.is_some() && error.is_none();
        Self {
            audio_track,
            video_track,
            facing_mode,
            ready,
            error,
        }
    }

    /// Snapshot with no tracks, used before mount and after teardown.
    pub(crate) fn empty(facing_mode: FacingMode) -> Self {
        Self {
            facing_mode,
            ..Self::default()
        }
    }

    pub fn audio_track(&self) -> Option<&SharedTrack> {
        self.audio_track.as_ref()
    }

    pub fn video_track(&self) -> Option<&SharedTrack> {
        self.video_track.as_ref()
    }

    pub fn audio_track_id(&self) -> Option<&str> {
        self.audio_track.as_ref().map(|t| t.id())
    }

    pub fn video_track_id(&self) -> Option<&str> {
        self.video_track.as_ref().map(|t| t.id())
    }

    /// Facing mode currently requested for the camera.
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn error(&self) -> Option<&CaptureError> {
        self.error.as_ref()
    }

    /// Not ready because something failed: show retry/permission UI.
    pub fn needs_user_action(&self) -> bool {
        !self.ready && self.error.is_some()
    }

    /// Not ready and nothing failed yet: show loading UI.
    pub fn is_loading(&self) -> bool {
        !self.ready && self.error.is_none()
    }

    /// Same tracks (by id), same readiness, same error.
    pub fn same_as(&self, other: &Self) -> bool {
        same_optional_track(self.audio_track.as_ref(), other.audio_track.as_ref())
            && same_optional_track(self.video_track.as_ref(), other.video_track.as_ref())
            && self.facing_mode == other.facing_mode
            && self.ready == other.ready
            && self.error == other.error
    }
}

impl fmt::Debug for PublishedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishedState")
            .field("audio", &self.audio_track_id())
            .field("video", &self.video_track_id())
            .field("facing_mode", &self.facing_mode)
            .field("ready", &self.ready)
            .field("error", &self.error)
            .finish()
    }
}

/// Counters for debugging a track session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionDiagnostics {
    pub requests_issued: u64,
    pub results_received: u64,
    pub handles_closed: u64,
    /// Tracks that resolved for a superseded request or after teardown.
    pub stale_handles_closed: u64,
    pub swaps_requested: u64,
    pub swaps_coalesced: u64,
    pub publications: u64,
}
