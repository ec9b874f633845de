use std::collections::HashMap;

use crate::acquisition::layer::AcquisitionLayer;
use crate::models::error::CaptureError;
use crate::models::request::{CaptureKind, DeviceClass, FacingMode, RequestId};
use crate::models::result::CaptureResult;
use crate::models::state::{PublishedState, SessionDiagnostics, SessionPhase};
use crate::session::events::TrackEvent;
use crate::session::handle_table::{HandleTable, TrackSlot};
use crate::session::publisher::Publisher;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::track_handle::{same_track, SharedTrack};

/// Track publication state machine.
///
/// Owns every open track through the handle table and decides which audio
/// and video track are published. All mutation happens inside `mount()` and
/// `apply()`, each of which runs to completion.
///
/// Every transition ends in `settle()`:
/// ```text
/// mutate table → publish snapshot → close retired tracks → request camera if needed
/// ```
/// so a consumer never sees a snapshot that points at a closed track.
pub struct PublicationMachine<P: CaptureProvider> {
    session_id: String,
    acquisition: AcquisitionLayer<P>,
    handles: HandleTable,
    publisher: Publisher,
    phase: SessionPhase,
    facing_mode: FacingMode,
    swapping: bool,
    audio_request: Option<RequestId>,
    camera_requests: HashMap<FacingMode, RequestId>,
    audio_error: Option<CaptureError>,
    video_error: Option<CaptureError>,
    diagnostics: SessionDiagnostics,
}

impl<P: CaptureProvider> PublicationMachine<P> {
    pub fn new(session_id: String, acquisition: AcquisitionLayer<P>, publisher: Publisher) -> Self {
        let facing_mode = acquisition.config().initial_facing_mode;
        Self {
            session_id,
            acquisition,
            handles: HandleTable::new(),
            publisher,
            phase: SessionPhase::Idle,
            facing_mode,
            swapping: false,
            audio_request: None,
            camera_requests: HashMap::new(),
            audio_error: None,
            video_error: None,
            diagnostics: SessionDiagnostics::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Facing mode currently selected (the last one asked for).
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn diagnostics(&self) -> &SessionDiagnostics {
        &self.diagnostics
    }

    pub fn publisher_mut(&mut self) -> &mut Publisher {
        &mut self.publisher
    }

    pub fn snapshot(&self) -> PublishedState {
        self.publisher.current()
    }

    /// Open tracks of `class` currently owned by the session.
    pub fn open_tracks(&self, class: DeviceClass) -> usize {
        self.handles.count(class)
    }

    /// Camera requests still waiting on the provider that the session cares about.
    pub fn pending_cameras(&self) -> Vec<FacingMode> {
        let mut modes: Vec<FacingMode> = self.camera_requests.keys().copied().collect();
        modes.sort();
        modes
    }

    /// Issue the microphone and initial camera requests. Transitions: idle → acquiring.
    pub fn mount(&mut self) -> Result<(), CaptureError> {
        if !self.phase.is_idle() {
            return Err(CaptureError::ConfigurationFailed(
                "can only mount from idle state".into(),
            ));
        }
        log::info!(
            "[{}] mounting, camera facing {}",
            self.session_id,
            self.facing_mode
        );

        self.audio_request = self.acquisition.acquire_microphone();
        if self.audio_request.is_some() {
            self.diagnostics.requests_issued += 1;
        }
        self.set_phase(SessionPhase::Acquiring);
        self.settle(Vec::new());
        Ok(())
    }

    pub fn apply(&mut self, event: TrackEvent) {
        match event {
            TrackEvent::Resolved { request, outcome } => self.on_resolved(request, outcome),
            TrackEvent::SwapCamera => self.on_swap(),
            TrackEvent::Teardown => self.teardown(),
        }
    }

    fn is_active(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Acquiring | SessionPhase::Ready | SessionPhase::Swapping
        )
    }

    fn on_resolved(&mut self, id: RequestId, outcome: Result<SharedTrack, CaptureError>) {
        self.diagnostics.results_received += 1;

        let (request, result) = self.acquisition.resolve(id, outcome);
        let Some(request) = request else {
            log::warn!("[{}] result for unknown request {}", self.session_id, id);
            self.discard(result);
            return;
        };
        if !self.is_active() {
            log::info!(
                "[{}] {} ({}) resolved in {} phase, discarding",
                self.session_id,
                id,
                request.kind(),
                self.phase
            );
            self.discard(result);
            return;
        }

        let retired = match request.kind() {
            CaptureKind::Microphone => self.on_microphone(id, result),
            CaptureKind::Camera { facing_mode } => self.on_camera(id, facing_mode, result),
        };
        self.settle(retired);
    }

    fn on_microphone(&mut self, id: RequestId, result: CaptureResult) -> Vec<SharedTrack> {
        if self.audio_request == Some(id) {
            self.audio_request = None;
        }
        match result {
            CaptureResult::Ready(track) => {
                log::info!("[{}] microphone ready: {}", self.session_id, track.id());
                self.install(TrackSlot::Audio, track)
            }
            CaptureResult::Failed(error) => {
                self.fail(DeviceClass::Audio, error);
                Vec::new()
            }
            CaptureResult::Pending => Vec::new(),
        }
    }

    fn on_camera(
        &mut self,
        id: RequestId,
        facing_mode: FacingMode,
        result: CaptureResult,
    ) -> Vec<SharedTrack> {
        let current = self.camera_requests.get(&facing_mode) == Some(&id);
        if current {
            self.camera_requests.remove(&facing_mode);
        }

        if !current || facing_mode != self.facing_mode {
            log::debug!(
                "[{}] {} for camera({}) superseded, now facing {}",
                self.session_id,
                id,
                facing_mode,
                self.facing_mode
            );
            return match result {
                CaptureResult::Ready(track) => {
                    self.diagnostics.stale_handles_closed += 1;
                    vec![track]
                }
                CaptureResult::Failed(error) => {
                    log::debug!("[{}] ignoring superseded failure: {}", self.session_id, error);
                    Vec::new()
                }
                CaptureResult::Pending => Vec::new(),
            };
        }

        match result {
            CaptureResult::Ready(track) => {
                log::info!(
                    "[{}] camera({}) ready: {}",
                    self.session_id,
                    facing_mode,
                    track.id()
                );
                self.video_error = None;
                self.swapping = false;
                let mut retired = self.install(TrackSlot::Video(facing_mode), track);
                retired.extend(self.handles.take_video_except(Some(facing_mode)));
                retired
            }
            CaptureResult::Failed(error) => {
                // Nothing left in flight. An outgoing camera stays published
                // (not ready) until the next swap.
                self.swapping = false;
                self.fail(DeviceClass::Video, error);
                Vec::new()
            }
            CaptureResult::Pending => Vec::new(),
        }
    }

    fn on_swap(&mut self) {
        if !self.is_active() {
            log::warn!(
                "[{}] swap ignored in {} phase",
                self.session_id,
                self.phase
            );
            return;
        }
        self.diagnostics.swaps_requested += 1;
        let target = self.facing_mode.opposite();
        if self.swapping || self.camera_requests.contains_key(&target) {
            self.diagnostics.swaps_coalesced += 1;
        }

        log::info!(
            "[{}] swapping camera {} -> {}",
            self.session_id,
            self.facing_mode,
            target
        );
        self.facing_mode = target;
        // A new facing mode is the external re-trigger for a failed camera.
        self.video_error = None;

        let mut retired = Vec::new();
        if self.handles.get(TrackSlot::Video(target)).is_some() {
            self.swapping = false;
            retired.extend(self.handles.take_video_except(Some(target)));
        } else {
            self.swapping = matches!(self.phase, SessionPhase::Ready | SessionPhase::Swapping)
                || self.handles.any_video().is_some();
            if !self.acquisition.supports_concurrent_cameras() {
                retired.extend(self.handles.take_video_except(None));
            }
        }
        self.settle(retired);
    }

    fn teardown(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        log::info!("[{}] tearing down", self.session_id);

        let cancelled = self.acquisition.cancel_all();
        if cancelled > 0 {
            log::debug!(
                "[{}] cancelled {} outstanding request(s)",
                self.session_id,
                cancelled
            );
        }
        self.camera_requests.clear();
        self.audio_request = None;
        self.swapping = false;
        self.set_phase(SessionPhase::Closed);

        if self.publisher.publish(PublishedState::empty(self.facing_mode)) {
            self.diagnostics.publications += 1;
        }
        for (slot, track) in self.handles.drain() {
            log::debug!("[{}] releasing {:?}", self.session_id, slot);
            self.close_track(&track);
        }
    }

    /// Store `track`, returning whatever it displaced (unless it is the same track).
    fn install(&mut self, slot: TrackSlot, track: SharedTrack) -> Vec<SharedTrack> {
        match self.handles.install(slot, track.clone()) {
            Some(previous) if !same_track(&previous, &track) => vec![previous],
            _ => Vec::new(),
        }
    }

    fn fail(&mut self, class: DeviceClass, error: CaptureError) {
        log::warn!(
            "[{}] {:?} acquisition failed: {}",
            self.session_id,
            class,
            error
        );
        self.publisher.error(&error);
        match class {
            DeviceClass::Audio => self.audio_error = Some(error),
            DeviceClass::Video => self.video_error = Some(error),
        }
    }

    fn settle(&mut self, retired: Vec<SharedTrack>) {
        self.refresh();
        for track in retired {
            self.close_track(&track);
        }
        self.reconcile_camera();
    }

    /// Publish the current pair and derive the phase from it.
    fn refresh(&mut self) {
        if !self.is_active() {
            return;
        }
        let audio = self.handles.get(TrackSlot::Audio).cloned();
        let video = self
            .handles
            .get(TrackSlot::Video(self.facing_mode))
            // Every open camera stays published: the outgoing one until its
            // replacement lands, or after the replacement failed.
            .or_else(|| self.handles.any_video())
            .cloned();
        let error = self.audio_error.clone().or_else(|| self.video_error.clone());

        let state = PublishedState::new(audio, video, self.facing_mode, error);
        let phase = if self.swapping {
            SessionPhase::Swapping
        } else if state.is_ready() {
            SessionPhase::Ready
        } else {
            SessionPhase::Acquiring
        };

        if self.publisher.publish(state) {
            self.diagnostics.publications += 1;
        }
        self.set_phase(phase);
    }

    /// Request the selected camera if nothing covers it yet.
    fn reconcile_camera(&mut self) {
        if !self.is_active() {
            return;
        }
        let target = self.facing_mode;
        if self.handles.get(TrackSlot::Video(target)).is_some()
            || self.camera_requests.contains_key(&target)
            || self.video_error.is_some()
        {
            return;
        }
        if !self.acquisition.supports_concurrent_cameras()
            && (self.handles.count(DeviceClass::Video) > 0 || !self.camera_requests.is_empty())
        {
            log::debug!(
                "[{}] waiting for the previous camera session before requesting {}",
                self.session_id,
                target
            );
            return;
        }

        if let Some(id) = self.acquisition.acquire_camera(target) {
            self.camera_requests.insert(target, id);
            self.diagnostics.requests_issued += 1;
        }
    }

    fn discard(&mut self, result: CaptureResult) {
        match result {
            CaptureResult::Ready(track) => {
                self.diagnostics.stale_handles_closed += 1;
                self.close_track(&track);
            }
            CaptureResult::Failed(error) => {
                log::debug!("[{}] dropping late failure: {}", self.session_id, error);
            }
            CaptureResult::Pending => {}
        }
    }

    fn close_track(&mut self, track: &SharedTrack) {
        log::debug!("[{}] closing {}", self.session_id, track.id());
        track.close();
        self.diagnostics.handles_closed += 1;
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        log::info!("[{}] phase {} -> {}", self.session_id, self.phase, phase);
        self.phase = phase;
        self.publisher.phase_changed(phase);
    }
}
