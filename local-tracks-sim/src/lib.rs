//! # local-tracks-sim
//!
//! Capture providers for local-tracks that need no real hardware.
//!
//! Provides:
//! - `ManualProvider`: parks every request until the caller grants or fails it
//! - `SimulatedProvider`: per-request worker threads with latency, permission
//!   and device availability taken from a `DeviceProfile`
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use local_tracks_core::{TrackConfiguration, TrackSession};
//! use local_tracks_sim::{DeviceProfile, SimulatedProvider};
//!
//! let provider = Arc::new(SimulatedProvider::new(DeviceProfile::default()));
//! let mut session = TrackSession::new(provider, TrackConfiguration::default()).unwrap();
//! session.mount().unwrap();
//! ```

pub mod manual;
pub mod simulated;

pub use manual::{ManualProvider, ManualTrack, ScriptError};
pub use simulated::{DeviceProfile, SimulatedProvider, SimulatedTrack};
