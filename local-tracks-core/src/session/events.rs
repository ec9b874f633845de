use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;
use crate::models::request::RequestId;
use crate::traits::track_handle::SharedTrack;

/// Inputs to the publication state machine, applied one at a time.
pub enum TrackEvent {
    /// A capture request resolved.
    Resolved {
        request: RequestId,
        outcome: Result<SharedTrack, CaptureError>,
    },
    /// Toggle the camera facing mode.
    SwapCamera,
    /// Tear the session down.
    Teardown,
}

impl fmt::Debug for TrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved { request, outcome } => {
                let outcome = match outcome {
                    Ok(track) => format!("Ok({})", track.id()),
                    Err(e) => format!("Err({})", e),
                };
                f.debug_struct("Resolved")
                    .field("request", request)
                    .field("outcome", &outcome)
                    .finish()
            }
            Self::SwapCamera => f.write_str("SwapCamera"),
            Self::Teardown => f.write_str("Teardown"),
        }
    }
}

struct QueueState {
    events: VecDeque<TrackEvent>,
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
}

/// FIFO of session events, shared with provider callbacks and consumers.
///
/// Producers may live on any thread. Once closed, late tracks are closed on
/// arrival and everything else is dropped.
#[derive(Clone)]
pub struct EventQueue {
    shared: Arc<Shared>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    events: VecDeque::new(),
                    closed: false,
                }),
                available: Condvar::new(),
            }),
        }
    }

    /// Enqueue an event. Returns false if the queue was already closed.
    pub fn push(&self, event: TrackEvent) -> bool {
        {
            let mut state = self.shared.state.lock();
            if !state.closed {
                log::debug!("queue <- {:?}", event);
                state.events.push_back(event);
                drop(state);
                self.shared.available.notify_one();
                return true;
            }
        }
        discard_late(event);
        false
    }

    pub fn pop(&self) -> Option<TrackEvent> {
        self.shared.state.lock().events.pop_front()
    }

    /// Pop the next event, blocking up to `timeout` for one to arrive.
    pub fn wait_pop(&self, timeout: Duration) -> Option<TrackEvent> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(event) = state.events.pop_front() {
                return Some(event);
            }
            if state.closed {
                return None;
            }
            if self.shared.available.wait_for(&mut state, timeout).timed_out() {
                return state.events.pop_front();
            }
        }
    }

    /// Close the queue and return whatever was still waiting in it.
    pub fn close(&self) -> Vec<TrackEvent> {
        let leftover: Vec<TrackEvent> = {
            let mut state = self.shared.state.lock();
            state.closed = true;
            state.events.drain(..).collect()
        };
        self.shared.available.notify_all();
        leftover
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn discard_late(event: TrackEvent) {
    match event {
        TrackEvent::Resolved {
            request,
            outcome: Ok(track),
        } => {
            log::info!("{} resolved after teardown, closing {}", request, track.id());
            track.close();
        }
        other => log::debug!("queue closed, dropping {:?}", other),
    }
}
