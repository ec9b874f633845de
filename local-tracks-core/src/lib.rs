//! # local-tracks-core
//!
//! Platform-agnostic local media track lifecycle.
//!
//! Acquires the microphone and camera through a `CaptureProvider`, keeps
//! exactly one open track per device class, swaps between the front and
//! back camera without leaking hardware, and publishes the live
//! audio/video pair to rendering consumers.
//!
//! ## Architecture
//!
//! ```text
//! local-tracks-core (this crate)
//! ├── traits/       ← CaptureProvider, TrackHandle, TrackObserver
//! ├── models/       ← CaptureError, CaptureRequest, CaptureResult, PublishedState, config
//! ├── acquisition/  ← AcquisitionLayer (request → queued result)
//! ├── session/      ← EventQueue, HandleTable, PublicationMachine, TrackSession, TracksContext
//! └── store/        ← MediaStore (uid → tracks registry)
//! ```

pub mod acquisition;
pub mod models;
pub mod session;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use acquisition::layer::AcquisitionLayer;
pub use models::config::{AudioTrackConfig, TrackConfiguration, VideoTrackConfig};
pub use models::error::CaptureError;
pub use models::request::{CaptureKind, CaptureRequest, DeviceClass, FacingMode, RequestId};
pub use models::result::CaptureResult;
pub use models::state::{PublishedState, SessionDiagnostics, SessionPhase};
pub use session::context::TracksContext;
pub use session::events::{EventQueue, TrackEvent};
pub use session::track_session::TrackSession;
pub use store::media_store::{MediaEntry, MediaStore, Uid, LOCAL_UID};
pub use traits::capture_provider::{AcquireCallback, CaptureProvider};
pub use traits::track_handle::{SharedTrack, TrackHandle};
pub use traits::track_observer::TrackObserver;
