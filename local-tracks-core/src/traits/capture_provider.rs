use std::sync::Arc;

use crate::models::config::{AudioTrackConfig, VideoTrackConfig};
use crate::models::error::CaptureError;
use crate::models::request::{CaptureRequest, FacingMode, RequestId};
use crate::traits::track_handle::SharedTrack;

/// Completion invoked exactly once when a capture request resolves.
///
/// May be called from any thread, including synchronously from inside the
/// `acquire_*` call.
pub type AcquireCallback = Box<dyn FnOnce(Result<SharedTrack, CaptureError>) + Send + 'static>;

/// Interface for the platform capture/transport provider.
///
/// Acquisition is fire-and-forget: failures are reported through the
/// callback, never returned from the `acquire_*` call itself.
pub trait CaptureProvider: Send + Sync {
    /// Open the microphone.
    fn acquire_microphone_track(
        &self,
        request: &CaptureRequest,
        config: &AudioTrackConfig,
        done: AcquireCallback,
    );

    /// Open the camera facing `facing_mode`.
    fn acquire_camera_track(
        &self,
        request: &CaptureRequest,
        config: &VideoTrackConfig,
        facing_mode: FacingMode,
        done: AcquireCallback,
    );

    /// Best-effort cancellation of an outstanding request.
    ///
    /// A provider that honours this may drop the callback without calling it.
    /// One that does not must still resolve the request normally.
    fn cancel(&self, _request: RequestId) {}

    /// Whether two camera sessions may be open at the same time.
    ///
    /// When false, a new camera is only requested after the previous camera
    /// track has been closed.
    fn supports_concurrent_cameras(&self) -> bool {
        true
    }
}

impl<P: CaptureProvider + ?Sized> CaptureProvider for Arc<P> {
    fn acquire_microphone_track(
        &self,
        request: &CaptureRequest,
        config: &AudioTrackConfig,
        done: AcquireCallback,
    ) {
        (**self).acquire_microphone_track(request, config, done)
    }

    fn acquire_camera_track(
        &self,
        request: &CaptureRequest,
        config: &VideoTrackConfig,
        facing_mode: FacingMode,
        done: AcquireCallback,
    ) {
        (**self).acquire_camera_track(request, config, facing_mode, done)
    }

    fn cancel(&self, request: RequestId) {
        (**self).cancel(request)
    }

    fn supports_concurrent_cameras(&self) -> bool {
        (**self).supports_concurrent_cameras()
    }
}
