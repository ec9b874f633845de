//! Mounts a session on simulated devices, swaps the camera back and forth,
//! tears down and prints the session diagnostics.
//!
//! Usage: `RUST_LOG=debug track-demo [config.json]`

use std::process;
use std::sync::Arc;
use std::time::Duration;

use local_tracks_core::{
    CaptureError, PublishedState, SessionPhase, TrackConfiguration, TrackObserver, TrackSession,
};
use local_tracks_sim::{DeviceProfile, SimulatedProvider};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

struct ConsoleObserver;

impl TrackObserver for ConsoleObserver {
    fn on_published(&self, state: &PublishedState) {
        println!(
            "published: audio={} video={} facing={} ready={}",
            state.audio_track_id().unwrap_or("-"),
            state.video_track_id().unwrap_or("-"),
            state.facing_mode(),
            state.is_ready()
        );
    }

    fn on_phase_changed(&self, phase: SessionPhase) {
        println!("phase: {}", phase);
    }

    fn on_error(&self, error: &CaptureError) {
        eprintln!("capture error: {}", error);
    }
}

fn load_config() -> Result<TrackConfiguration, CaptureError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            TrackConfiguration::from_json(&json)
        }
        None => Ok(TrackConfiguration::default()),
    }
}

fn run() -> Result<(), CaptureError> {
    let config = load_config()?;
    let provider = Arc::new(SimulatedProvider::new(DeviceProfile::default()));

    let mut session = TrackSession::new(Arc::clone(&provider), config)?;
    session.add_observer(Arc::new(ConsoleObserver));
    session.mount()?;

    let settled = |phase: SessionPhase, state: &PublishedState| {
        phase.is_ready() || state.needs_user_action()
    };
    if !session.process_until(STEP_TIMEOUT, settled) {
        log::warn!("tracks not ready after {:?}", STEP_TIMEOUT);
    }

    let context = session.context();
    for _ in 0..2 {
        context.swap_camera();
        session.process_pending();
        if !session.process_until(STEP_TIMEOUT, settled) {
            log::warn!("camera swap did not settle after {:?}", STEP_TIMEOUT);
        }
    }

    session.close();
    provider.join_workers();
    log::info!(
        "devices still open: {} camera(s), {} microphone(s)",
        provider.open_cameras(),
        provider.open_microphones()
    );

    let diagnostics = serde_json::to_string_pretty(&session.diagnostics())
        .map_err(|e| CaptureError::Unknown(e.to_string()))?;
    println!("{}", diagnostics);
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("track-demo: {}", e);
        process::exit(1);
    }
}
