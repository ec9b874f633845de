//! Test-driven capture provider.
//!
//! Requests are parked until the caller decides how they resolve, which
//! makes ordering races (swap vs. resolution vs. teardown) reproducible.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use local_tracks_core::{
    AcquireCallback, AudioTrackConfig, CaptureError, CaptureKind, CaptureProvider,
    CaptureRequest, DeviceClass, FacingMode, RequestId, SharedTrack, TrackHandle,
    VideoTrackConfig,
};

/// Misuse of the manual provider's scripting API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("request {0} is not pending")]
    NotPending(RequestId),

    #[error("no pending {0} request")]
    NothingPending(String),
}

/// Track handed out by `ManualProvider`. Counts its `close()` calls.
pub struct ManualTrack {
    id: String,
    kind: CaptureKind,
    closes: AtomicUsize,
}

impl ManualTrack {
    pub fn new(id: impl Into<String>, kind: CaptureKind) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            kind,
            closes: AtomicUsize::new(0),
        })
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl fmt::Debug for ManualTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("closes", &self.close_count())
            .finish()
    }
}

impl TrackHandle for ManualTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn close(&self) {
        if self.closes.fetch_add(1, Ordering::SeqCst) == 0 {
            log::debug!("manual track {} closed", self.id);
        }
    }
}

struct ParkedRequest {
    request: CaptureRequest,
    done: AcquireCallback,
}

/// Capture provider whose requests resolve only when the caller says so.
pub struct ManualProvider {
    parked: Mutex<Vec<ParkedRequest>>,
    issued: Mutex<Vec<CaptureRequest>>,
    cancelled: Mutex<Vec<RequestId>>,
    tracks: Mutex<Vec<Arc<ManualTrack>>>,
    next_track: AtomicU64,
    concurrent_cameras: bool,
    honour_cancel: bool,
}

impl ManualProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(true, false))
    }

    /// A provider that allows only one open camera session.
    pub fn single_camera() -> Arc<Self> {
        Arc::new(Self::build(false, false))
    }

    /// A provider that drops cancelled requests without resolving them.
    pub fn honouring_cancel() -> Arc<Self> {
        Arc::new(Self::build(true, true))
    }

    fn build(concurrent_cameras: bool, honour_cancel: bool) -> Self {
        Self {
            parked: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            tracks: Mutex::new(Vec::new()),
            next_track: AtomicU64::new(0),
            concurrent_cameras,
            honour_cancel,
        }
    }

    /// Requests still waiting for an answer, oldest first.
    pub fn pending(&self) -> Vec<(RequestId, CaptureKind)> {
        self.parked
            .lock()
            .iter()
            .map(|p| (p.request.id(), p.request.kind()))
            .collect()
    }

    pub fn pending_camera(&self, facing_mode: FacingMode) -> Option<RequestId> {
        self.pending()
            .into_iter()
            .find(|(_, kind)| kind.facing_mode() == Some(facing_mode))
            .map(|(id, _)| id)
    }

    pub fn pending_microphone(&self) -> Option<RequestId> {
        self.pending()
            .into_iter()
            .find(|(_, kind)| *kind == CaptureKind::Microphone)
            .map(|(id, _)| id)
    }

    /// Every request ever received, in order.
    pub fn issued(&self) -> Vec<CaptureRequest> {
        self.issued.lock().clone()
    }

    pub fn cancelled(&self) -> Vec<RequestId> {
        self.cancelled.lock().clone()
    }

    /// Resolve `id` with a fresh track.
    pub fn grant(&self, id: RequestId) -> Result<Arc<ManualTrack>, ScriptError> {
        let parked = self.take(id)?;
        let kind = parked.request.kind();
        let serial = self.next_track.fetch_add(1, Ordering::SeqCst) + 1;
        let name = match kind {
            CaptureKind::Microphone => format!("mic-{}", serial),
            CaptureKind::Camera { facing_mode } => format!("cam-{}-{}", facing_mode, serial),
        };
        let track = ManualTrack::new(name, kind);
        self.tracks.lock().push(Arc::clone(&track));
        let shared: SharedTrack = track.clone();
        (parked.done)(Ok(shared));
        Ok(track)
    }

    pub fn grant_microphone(&self) -> Result<Arc<ManualTrack>, ScriptError> {
        let id = self
            .pending_microphone()
            .ok_or_else(|| ScriptError::NothingPending("microphone".into()))?;
        self.grant(id)
    }

    pub fn grant_camera(&self, facing_mode: FacingMode) -> Result<Arc<ManualTrack>, ScriptError> {
        let id = self
            .pending_camera(facing_mode)
            .ok_or_else(|| ScriptError::NothingPending(format!("camera({})", facing_mode)))?;
        self.grant(id)
    }

    /// Resolve `id` with an error.
    pub fn fail(&self, id: RequestId, error: CaptureError) -> Result<(), ScriptError> {
        let parked = self.take(id)?;
        (parked.done)(Err(error));
        Ok(())
    }

    /// Tracks granted so far that nobody has closed.
    pub fn open_tracks(&self, class: DeviceClass) -> usize {
        self.tracks
            .lock()
            .iter()
            .filter(|t| t.kind().device_class() == class && !t.is_closed())
            .count()
    }

    /// Every track granted so far.
    pub fn tracks(&self) -> Vec<Arc<ManualTrack>> {
        self.tracks.lock().clone()
    }

    fn take(&self, id: RequestId) -> Result<ParkedRequest, ScriptError> {
        let mut parked = self.parked.lock();
        let index = parked
            .iter()
            .position(|p| p.request.id() == id)
            .ok_or(ScriptError::NotPending(id))?;
        Ok(parked.remove(index))
    }

    fn park(&self, request: &CaptureRequest, done: AcquireCallback) {
        log::debug!("manual provider parked {} ({})", request.id(), request.kind());
        self.issued.lock().push(request.clone());
        self.parked.lock().push(ParkedRequest {
            request: request.clone(),
            done,
        });
    }
}

impl CaptureProvider for ManualProvider {
    fn acquire_microphone_track(
        &self,
        request: &CaptureRequest,
        _config: &AudioTrackConfig,
        done: AcquireCallback,
    ) {
        self.park(request, done);
    }

    fn acquire_camera_track(
        &self,
        request: &CaptureRequest,
        _config: &VideoTrackConfig,
        _facing_mode: FacingMode,
        done: AcquireCallback,
    ) {
        self.park(request, done);
    }

    fn cancel(&self, request: RequestId) {
        self.cancelled.lock().push(request);
        if self.honour_cancel && self.take(request).is_ok() {
            log::debug!("manual provider dropped cancelled {}", request);
        }
    }

    fn supports_concurrent_cameras(&self) -> bool {
        self.concurrent_cameras
    }
}
