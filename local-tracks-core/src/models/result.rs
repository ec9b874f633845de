use std::fmt;

use super::error::CaptureError;
use crate::traits::track_handle::SharedTrack;

/// Outcome of a single capture request.
///
/// Pending until the provider answers, then exactly one of track or error.
#[derive(Clone)]
pub enum CaptureResult {
    Pending,
    Ready(SharedTrack),
    Failed(CaptureError),
}

impl CaptureResult {
    pub fn from_outcome(outcome: Result<SharedTrack, CaptureError>) -> Self {
        match outcome {
            Ok(track) => Self::Ready(track),
            Err(error) => Self::Failed(error),
        }
    }

    /// True once the request has resolved, successfully or not.
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn track(&self) -> Option<&SharedTrack> {
        match self {
            Self::Ready(track) => Some(track),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Debug for CaptureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Ready(track) => f.debug_tuple("Ready").field(&track.id()).finish(),
            Self::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
        }
    }
}
