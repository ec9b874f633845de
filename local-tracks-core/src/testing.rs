//! Test doubles shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::{AudioTrackConfig, VideoTrackConfig};
use crate::models::error::CaptureError;
use crate::models::request::{CaptureKind, CaptureRequest, FacingMode, RequestId};
use crate::traits::capture_provider::{AcquireCallback, CaptureProvider};
use crate::traits::track_handle::{SharedTrack, TrackHandle};

pub struct FakeTrack {
    id: String,
    closes: AtomicUsize,
}

impl FakeTrack {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl TrackHandle for FakeTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct Parked {
    request: CaptureRequest,
    done: AcquireCallback,
}

/// Provider that parks every request until the test resolves it.
pub struct FakeProvider {
    parked: Mutex<Vec<Parked>>,
    cancelled: Mutex<Vec<RequestId>>,
    concurrent_cameras: bool,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Self::with_concurrent_cameras(true)
    }

    pub fn with_concurrent_cameras(concurrent_cameras: bool) -> Arc<Self> {
        Arc::new(Self {
            parked: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            concurrent_cameras,
        })
    }

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

    pub fn cancelled(&self) -> Vec<RequestId> {
        self.cancelled.lock().clone()
    }

    pub fn resolve(&self, id: RequestId, outcome: Result<SharedTrack, CaptureError>) {
        let parked = {
            let mut parked = self.parked.lock();
            let index = parked
                .iter()
                .position(|p| p.request.id() == id)
                .expect("request is not pending");
            parked.remove(index)
        };
        (parked.done)(outcome);
    }

    fn park(&self, request: &CaptureRequest, done: AcquireCallback) {
        self.parked.lock().push(Parked {
            request: request.clone(),
            done,
        });
    }
}

impl CaptureProvider for FakeProvider {
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
    }

    fn supports_concurrent_cameras(&self) -> bool {
        self.concurrent_cameras
    }
}
