use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which physical camera a video capture request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera.
    #[default]
    User,
    /// Back camera.
    Environment,
}

impl FacingMode {
    pub fn opposite(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device class a track belongs to. One open handle per class at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Audio,
    Video,
}

/// What a capture request asks the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaptureKind {
    Microphone,
    Camera { facing_mode: FacingMode },
}

impl CaptureKind {
    pub fn device_class(&self) -> DeviceClass {
        match self {
            Self::Microphone => DeviceClass::Audio,
            Self::Camera { .. } => DeviceClass::Video,
        }
    }

    pub fn facing_mode(&self) -> Option<FacingMode> {
        match self {
            Self::Microphone => None,
            Self::Camera { facing_mode } => Some(*facing_mode),
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Microphone => f.write_str("microphone"),
            Self::Camera { facing_mode } => write!(f, "camera({})", facing_mode),
        }
    }
}

/// Session-scoped identifier of a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A single device request handed to the capture provider.
///
/// Immutable once issued; the acquisition layer is the only place that
/// creates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    id: RequestId,
    kind: CaptureKind,
    issued_at: DateTime<Utc>,
}

impl CaptureRequest {
    pub(crate) fn new(id: RequestId, kind: CaptureKind) -> Self {
        Self {
            id,
            kind,
            issued_at: Utc::now(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_mode_toggles() {
        assert_eq!(FacingMode::User.opposite(), FacingMode::Environment);
        assert_eq!(FacingMode::Environment.opposite(), FacingMode::User);
        assert_eq!(FacingMode::default(), FacingMode::User);
    }

    #[test]
    fn facing_mode_serializes_lowercase() {
        let json = serde_json::to_string(&FacingMode::Environment).unwrap();
        assert_eq!(json, "\"environment\"");
        let parsed: FacingMode = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, FacingMode::User);
    }

    #[test]
    fn capture_kind_classes() {
        let camera = CaptureKind::Camera {
            facing_mode: FacingMode::Environment,
        };
        assert_eq!(camera.device_class(), DeviceClass::Video);
        assert_eq!(camera.facing_mode(), Some(FacingMode::Environment));
        assert_eq!(camera.to_string(), "camera(environment)");

        assert_eq!(CaptureKind::Microphone.device_class(), DeviceClass::Audio);
        assert_eq!(CaptureKind::Microphone.facing_mode(), None);
    }
}
