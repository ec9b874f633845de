use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::acquisition::layer::AcquisitionLayer;
use crate::models::config::TrackConfiguration;
use crate::models::error::CaptureError;
use crate::models::request::{DeviceClass, FacingMode};
use crate::models::state::{PublishedState, SessionDiagnostics, SessionPhase};
use crate::session::context::TracksContext;
use crate::session::events::{EventQueue, TrackEvent};
use crate::session::machine::PublicationMachine;
use crate::session::publisher::Publisher;
use crate::store::media_store::MediaStore;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::track_observer::TrackObserver;

/// Local camera/microphone session.
///
/// Generic over the capture backend via the `CaptureProvider` trait. Events
/// (provider results, swap commands, teardown) are queued from any thread
/// and applied to the publication machine on whichever thread calls
/// `process_pending()` / `process_until()`:
/// ```text
/// [Provider] ─┐
/// [Context]  ─┼→ [EventQueue] → [PublicationMachine] → [snapshot + observers]
/// [Session]  ─┘
/// ```
/// Dropping the session tears it down and closes every open track.
pub struct TrackSession<P: CaptureProvider> {
    session_id: String,
    machine: PublicationMachine<P>,
    queue: EventQueue,
    snapshot: Arc<RwLock<PublishedState>>,
}

impl<P: CaptureProvider> TrackSession<P> {
    pub fn new(provider: P, config: TrackConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let session_id = uuid::Uuid::new_v4().to_string();
        let queue = EventQueue::new();
        let snapshot = Arc::new(RwLock::new(PublishedState::empty(
            config.initial_facing_mode,
        )));
        let acquisition = AcquisitionLayer::new(provider, config, queue.clone());
        let publisher = Publisher::new(Arc::clone(&snapshot));
        let machine = PublicationMachine::new(session_id.clone(), acquisition, publisher);

        log::debug!("[{}] session created", session_id);
        Ok(Self {
            session_id,
            machine,
            queue,
            snapshot,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn add_observer(&mut self, observer: Arc<dyn TrackObserver>) {
        self.machine.publisher_mut().add_observer(observer);
    }

    /// Mirror the local tracks into `store` under the local uid.
    pub fn set_media_store(&mut self, store: MediaStore) {
        self.machine.publisher_mut().set_media_store(store);
    }

    /// Consumer view sharing this session's snapshot and queue.
    pub fn context(&self) -> TracksContext {
        TracksContext::new(Arc::clone(&self.snapshot), self.queue.clone())
    }

    /// Request the microphone and the initial camera.
    pub fn mount(&mut self) -> Result<(), CaptureError> {
        self.machine.mount()
    }

    pub fn swap_camera(&self) {
        self.queue.push(TrackEvent::SwapCamera);
    }

    /// Queue a teardown; it takes effect on the next processing pass.
    pub fn teardown(&self) {
        self.queue.push(TrackEvent::Teardown);
    }

    /// Tear down now, closing every open track before returning.
    pub fn close(&mut self) {
        self.queue.push(TrackEvent::Teardown);
        self.process_pending();
        if !self.machine.phase().is_terminal() {
            self.dispatch(TrackEvent::Teardown);
        }
    }

    /// Apply every queued event. Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.queue.pop() {
            self.dispatch(event);
            processed += 1;
        }
        processed
    }

    /// Apply events as they arrive until `done` holds or `timeout` elapses.
    ///
    /// Returns whether `done` was satisfied.
    pub fn process_until<F>(&mut self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut(SessionPhase, &PublishedState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done(self.machine.phase(), &*self.snapshot.read()) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.queue.wait_pop(deadline - now) {
                Some(event) => self.dispatch(event),
                None if self.queue.is_closed() => {
                    return done(self.machine.phase(), &*self.snapshot.read());
                }
                None => {}
            }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.machine.facing_mode()
    }

    pub fn snapshot(&self) -> PublishedState {
        self.snapshot.read().clone()
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.machine.diagnostics().clone()
    }

    /// Open tracks of `class` currently owned by the session.
    pub fn open_tracks(&self, class: DeviceClass) -> usize {
        self.machine.open_tracks(class)
    }

    /// Facing modes with a camera request still in flight.
    pub fn pending_cameras(&self) -> Vec<FacingMode> {
        self.machine.pending_cameras()
    }

    fn dispatch(&mut self, event: TrackEvent) {
        self.machine.apply(event);
        if self.machine.phase().is_terminal() && !self.queue.is_closed() {
            for leftover in self.queue.close() {
                self.machine.apply(leftover);
            }
        }
    }
}

impl<P: CaptureProvider> Drop for TrackSession<P> {
    fn drop(&mut self) {
        if !self.machine.phase().is_terminal() {
            self.machine.apply(TrackEvent::Teardown);
        }
        for leftover in self.queue.close() {
            self.machine.apply(leftover);
        }
    }
}
