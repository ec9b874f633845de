//! Simulated capture devices.
//!
//! Each request is served by a dedicated worker thread that sleeps for the
//! profile's latency and then opens (or refuses to open) the device. Open
//! devices are counted so callers can check that nothing leaks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use local_tracks_core::{
    AcquireCallback, AudioTrackConfig, CaptureError, CaptureProvider, CaptureRequest,
    DeviceClass, FacingMode, RequestId, SharedTrack, TrackHandle, VideoTrackConfig,
};

/// Hardware and permission setup of the simulated machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Microphones by device id. The first one is the system default.
    pub microphones: Vec<String>,
    pub cameras: Vec<FacingMode>,
    pub microphone_permission: bool,
    pub camera_permission: bool,

    /// Largest resolution the cameras can deliver.
    pub max_resolution: (u32, u32),

    /// Only one camera may be open at a time (typical of phone hardware).
    pub single_camera_session: bool,

    /// Delay between a request and its resolution.
    pub latency: Duration,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            microphones: vec!["default".to_string()],
            cameras: vec![FacingMode::User, FacingMode::Environment],
            microphone_permission: true,
            camera_permission: true,
            max_resolution: (1920, 1080),
            single_camera_session: false,
            latency: Duration::from_millis(50),
        }
    }
}

/// What a worker is asked to open.
enum Target {
    Microphone { device_id: Option<String> },
    Camera {
        facing_mode: FacingMode,
        width: u32,
        height: u32,
    },
}

impl Target {
    fn device_class(&self) -> DeviceClass {
        match self {
            Self::Microphone { .. } => DeviceClass::Audio,
            Self::Camera { .. } => DeviceClass::Video,
        }
    }
}

struct DeviceState {
    open_cameras: AtomicUsize,
    open_microphones: AtomicUsize,
    next_track: AtomicU64,
    /// Requests whose worker has not delivered yet, flagged when cancelled.
    in_flight: Mutex<HashMap<RequestId, bool>>,
}

impl DeviceState {
    fn counter(&self, class: DeviceClass) -> &AtomicUsize {
        match class {
            DeviceClass::Audio => &self.open_microphones,
            DeviceClass::Video => &self.open_cameras,
        }
    }
}

/// Track backed by a simulated device. Closing releases the device once.
pub struct SimulatedTrack {
    id: String,
    class: DeviceClass,
    closed: AtomicBool,
    state: Arc<DeviceState>,
}

impl SimulatedTrack {
    pub fn device_class(&self) -> DeviceClass {
        self.class
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl TrackHandle for SimulatedTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.counter(self.class).fetch_sub(1, Ordering::SeqCst);
            log::debug!("simulated device released by {}", self.id);
        }
    }
}

/// Capture provider backed by a `DeviceProfile`.
pub struct SimulatedProvider {
    profile: DeviceProfile,
    state: Arc<DeviceState>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl SimulatedProvider {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            state: Arc::new(DeviceState {
                open_cameras: AtomicUsize::new(0),
                open_microphones: AtomicUsize::new(0),
                next_track: AtomicU64::new(0),
                in_flight: Mutex::new(HashMap::new()),
            }),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn open_cameras(&self) -> usize {
        self.state.open_cameras.load(Ordering::SeqCst)
    }

    pub fn open_microphones(&self) -> usize {
        self.state.open_microphones.load(Ordering::SeqCst)
    }

    /// Requests whose worker has not delivered (or dropped) its result yet.
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.lock().len()
    }

    /// Worker threads still running.
    pub fn live_workers(&self) -> usize {
        let mut workers = self.workers.lock();
        workers.retain(|handle| !handle.is_finished());
        workers.len()
    }

    /// Wait for every worker spawned so far to deliver its result.
    pub fn join_workers(&self) {
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in workers {
            let _ = handle.join();
        }
    }

    fn spawn(&self, request: &CaptureRequest, target: Target, done: AcquireCallback) {
        let id = request.id();
        let outcome = Arc::new(Mutex::new(Some(done)));
        let worker_outcome = Arc::clone(&outcome);
        let state = Arc::clone(&self.state);
        let profile = self.profile.clone();
        state.in_flight.lock().insert(id, false);

        let spawned = thread::Builder::new()
            .name(format!("sim-capture-{}", id.value()))
            .spawn(move || {
                thread::sleep(profile.latency);
                if state.in_flight.lock().remove(&id).unwrap_or(false) {
                    log::debug!("{} cancelled before the device opened", id);
                    return;
                }
                let result = open_device(&state, &profile, target);
                if let Some(done) = worker_outcome.lock().take() {
                    done(result);
                }
            });

        match spawned {
            Ok(handle) => {
                let mut workers = self.workers.lock();
                workers.retain(|handle| !handle.is_finished());
                workers.push(handle);
            }
            Err(e) => {
                log::error!("failed to spawn capture worker: {}", e);
                self.state.in_flight.lock().remove(&id);
                if let Some(done) = outcome.lock().take() {
                    done(Err(CaptureError::Unknown(format!(
                        "failed to spawn capture worker: {}",
                        e
                    ))));
                }
            }
        }
    }
}

fn open_device(
    state: &Arc<DeviceState>,
    profile: &DeviceProfile,
    target: Target,
) -> Result<SharedTrack, CaptureError> {
    let class = target.device_class();
    let name = match target {
        Target::Microphone { device_id } => {
            if !profile.microphone_permission {
                return Err(CaptureError::classify("NotAllowedError", "microphone access blocked"));
            }
            let device = match device_id {
                Some(wanted) => profile.microphones.iter().find(|d| **d == wanted),
                None => profile.microphones.first(),
            };
            let Some(device) = device else {
                return Err(CaptureError::classify("NotFoundError", "no such microphone"));
            };
            state.open_microphones.fetch_add(1, Ordering::SeqCst);
            format!("mic-{}", device)
        }
        Target::Camera {
            facing_mode,
            width,
            height,
        } => {
            if !profile.camera_permission {
                return Err(CaptureError::classify("NotAllowedError", "camera access blocked"));
            }
            if !profile.cameras.contains(&facing_mode) {
                return Err(CaptureError::classify(
                    "NotFoundError",
                    format!("no {} camera", facing_mode),
                ));
            }
            let (max_width, max_height) = profile.max_resolution;
            if width > max_width || height > max_height {
                return Err(CaptureError::classify(
                    "OverconstrainedError",
                    format!("{}x{} exceeds {}x{}", width, height, max_width, max_height),
                ));
            }
            if profile.single_camera_session {
                if state
                    .open_cameras
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return Err(CaptureError::classify(
                        "NotReadableError",
                        "another camera session is open",
                    ));
                }
            } else {
                state.open_cameras.fetch_add(1, Ordering::SeqCst);
            }
            format!("cam-{}", facing_mode)
        }
    };

    let serial = state.next_track.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Arc::new(SimulatedTrack {
        id: format!("sim-{}-{}", name, serial),
        class,
        closed: AtomicBool::new(false),
        state: Arc::clone(state),
    }))
}

impl CaptureProvider for SimulatedProvider {
    fn acquire_microphone_track(
        &self,
        request: &CaptureRequest,
        config: &AudioTrackConfig,
        done: AcquireCallback,
    ) {
        log::debug!(
            "opening simulated microphone {} ({} Hz, {} ch) for {}",
            config.device_id.as_deref().unwrap_or("default"),
            config.sample_rate,
            config.channels,
            request.id()
        );
        let target = Target::Microphone {
            device_id: config.device_id.clone(),
        };
        self.spawn(request, target, done);
    }

    fn acquire_camera_track(
        &self,
        request: &CaptureRequest,
        config: &VideoTrackConfig,
        facing_mode: FacingMode,
        done: AcquireCallback,
    ) {
        log::debug!(
            "opening simulated {} camera ({}x{}@{}) for {}",
            facing_mode,
            config.width,
            config.height,
            config.frame_rate,
            request.id()
        );
        let target = Target::Camera {
            facing_mode,
            width: config.width,
            height: config.height,
        };
        self.spawn(request, target, done);
    }

    fn cancel(&self, request: RequestId) {
        if let Some(cancelled) = self.state.in_flight.lock().get_mut(&request) {
            *cancelled = true;
        }
    }

    fn supports_concurrent_cameras(&self) -> bool {
        !self.profile.single_camera_session
    }
}
