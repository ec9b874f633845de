use std::io;

use thiserror::Error;

/// Errors surfaced by capture acquisition and session setup.
///
/// Acquisition failures are never fatal: they force the published state to
/// not-ready and are kept around for the consumer to display.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Map a provider error name (media-capture naming) onto an error kind.
    pub fn classify(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                Self::PermissionDenied(message)
            }
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
                Self::DeviceNotFound(message)
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => {
                Self::DeviceUnavailable(message)
            }
            _ => Self::Unknown(format!("{}: {}", name, message)),
        }
    }

    /// Permission and missing-device errors need the user to act before a
    /// retry can succeed.
    pub fn requires_user_action(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::DeviceNotFound(_))
    }
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            io::ErrorKind::NotFound => Self::DeviceNotFound(err.to_string()),
            io::ErrorKind::ResourceBusy => Self::DeviceUnavailable(err.to_string()),
            _ => Self::Unknown(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_provider_names() {
        assert_eq!(
            CaptureError::classify("NotAllowedError", "blocked"),
            CaptureError::PermissionDenied("blocked".into())
        );
        assert_eq!(
            CaptureError::classify("NotFoundError", "no camera"),
            CaptureError::DeviceNotFound("no camera".into())
        );
        assert_eq!(
            CaptureError::classify("NotReadableError", "in use"),
            CaptureError::DeviceUnavailable("in use".into())
        );
        assert_eq!(
            CaptureError::classify("WeirdError", "boom"),
            CaptureError::Unknown("WeirdError: boom".into())
        );
    }

    #[test]
    fn io_errors_map_to_kinds() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(CaptureError::from(denied), CaptureError::PermissionDenied(_)));

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(CaptureError::from(missing), CaptureError::DeviceNotFound(_)));

        let other = io::Error::other("broken pipe");
        assert!(matches!(CaptureError::from(other), CaptureError::Unknown(_)));
    }

    #[test]
    fn user_action_kinds() {
        assert!(CaptureError::PermissionDenied(String::new()).requires_user_action());
        assert!(CaptureError::DeviceNotFound(String::new()).requires_user_action());
        assert!(!CaptureError::DeviceUnavailable(String::new()).requires_user_action());
        assert!(!CaptureError::Unknown(String::new()).requires_user_action());
    }
}
