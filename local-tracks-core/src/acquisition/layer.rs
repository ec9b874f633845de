use std::collections::HashMap;

use crate::models::config::TrackConfiguration;
use crate::models::error::CaptureError;
use crate::models::request::{CaptureKind, CaptureRequest, FacingMode, RequestId};
use crate::models::result::CaptureResult;
use crate::session::events::{EventQueue, TrackEvent};
use crate::traits::capture_provider::{AcquireCallback, CaptureProvider};
use crate::traits::track_handle::SharedTrack;

/// Turns capture requests into asynchronous results.
///
/// Every request is fire-and-forget: the provider's completion is routed
/// into the session's event queue as a `TrackEvent::Resolved`, so results
/// are only ever observed by the state machine, one at a time.
///
/// ```text
/// acquire_*() → [Provider] → completion → [EventQueue] → resolve()
/// ```
pub struct AcquisitionLayer<P: CaptureProvider> {
    provider: P,
    config: TrackConfiguration,
    queue: EventQueue,
    next_id: u64,
    microphone_issued: bool,
    outstanding: HashMap<RequestId, CaptureRequest>,
    closed: bool,
}

impl<P: CaptureProvider> AcquisitionLayer<P> {
    pub fn new(provider: P, config: TrackConfiguration, queue: EventQueue) -> Self {
        Self {
            provider,
            config,
            queue,
            next_id: 0,
            microphone_issued: false,
            outstanding: HashMap::new(),
            closed: false,
        }
    }

    pub fn config(&self) -> &TrackConfiguration {
        &self.config
    }

    pub fn supports_concurrent_cameras(&self) -> bool {
        self.provider.supports_concurrent_cameras()
    }

    /// Request the microphone. Issued at most once per layer lifetime.
    pub fn acquire_microphone(&mut self) -> Option<RequestId> {
        if self.closed {
            log::debug!("acquisition closed, not requesting microphone");
            return None;
        }
        if self.microphone_issued {
            log::warn!("microphone already requested for this session");
            return None;
        }
        self.microphone_issued = true;

        let request = self.issue(CaptureKind::Microphone);
        let done = self.completion(request.id());
        self.provider
            .acquire_microphone_track(&request, &self.config.microphone, done);
        Some(request.id())
    }

    /// Request the camera facing `facing_mode`.
    pub fn acquire_camera(&mut self, facing_mode: FacingMode) -> Option<RequestId> {
        if self.closed {
            log::debug!("acquisition closed, not requesting camera({})", facing_mode);
            return None;
        }

        let request = self.issue(CaptureKind::Camera { facing_mode });
        let done = self.completion(request.id());
        self.provider
            .acquire_camera_track(&request, &self.config.camera, facing_mode, done);
        Some(request.id())
    }

    /// Record the outcome of `id`.
    ///
    /// Returns the originating request if it was outstanding, plus the
    /// normalized result. A request resolves at most once; a repeated or
    /// unknown id yields `None` and the caller owns whatever track came with it.
    pub fn resolve(
        &mut self,
        id: RequestId,
        outcome: Result<SharedTrack, CaptureError>,
    ) -> (Option<CaptureRequest>, CaptureResult) {
        let request = self.outstanding.remove(&id);
        if let Some(ref request) = request {
            let waited = chrono::Utc::now() - request.issued_at();
            log::debug!(
                "{} {} resolved after {} ms",
                id,
                request.kind(),
                waited.num_milliseconds()
            );
        }
        (request, CaptureResult::from_outcome(outcome))
    }

    /// View of a request by id: `Pending` while outstanding.
    pub fn status(&self, id: RequestId) -> Option<CaptureResult> {
        self.outstanding.get(&id).map(|_| CaptureResult::Pending)
    }

    pub fn is_outstanding(&self, id: RequestId) -> bool {
        self.outstanding.contains_key(&id)
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    /// Number of requests issued so far.
    pub fn issued_count(&self) -> u64 {
        self.next_id
    }

    /// Stop issuing requests and ask the provider to cancel outstanding ones.
    ///
    /// Outstanding entries are kept so late arrivals are still recognized.
    pub fn cancel_all(&mut self) -> usize {
        self.closed = true;
        for id in self.outstanding.keys() {
            self.provider.cancel(*id);
        }
        self.outstanding.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn issue(&mut self, kind: CaptureKind) -> CaptureRequest {
        self.next_id += 1;
        let request = CaptureRequest::new(RequestId::new(self.next_id), kind);
        log::debug!("issuing {} for {}", request.id(), kind);
        self.outstanding.insert(request.id(), request.clone());
        request
    }

    fn completion(&self, id: RequestId) -> AcquireCallback {
        let queue = self.queue.clone();
        Box::new(move |outcome| {
            queue.push(TrackEvent::Resolved {
                request: id,
                outcome,
            });
        })
    }
}
