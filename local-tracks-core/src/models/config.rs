use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::request::FacingMode;

/// Microphone track settings passed through to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTrackConfig {
    /// Specific microphone device ID, or None for system default.
    pub device_id: Option<String>,

    /// Capture sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// 1 = mono, 2 = stereo (default: 1).
    pub channels: u16,
}

impl Default for AudioTrackConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            sample_rate: 48000,
            channels: 1,
        }
    }
}

/// Camera track settings passed through to the provider.
///
/// The facing mode is not part of this struct: it is chosen per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoTrackConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for VideoTrackConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 15,
        }
    }
}

/// Configuration for a local track session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfiguration {
    pub microphone: AudioTrackConfig,
    pub camera: VideoTrackConfig,

    /// Camera requested on mount (default: `user`).
    pub initial_facing_mode: FacingMode,
}

impl TrackConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        let mic = &self.microphone;
        if mic.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if mic.device_id.as_deref() == Some("") {
            return Err("microphone device id must not be empty".into());
        }
        if ![1, 2].contains(&mic.channels) {
            return Err(format!("unsupported channel count: {}", mic.channels));
        }

        let cam = &self.camera;
        if cam.width == 0 || cam.height == 0 {
            return Err(format!("invalid resolution: {}x{}", cam.width, cam.height));
        }
        if cam.frame_rate == 0 || cam.frame_rate > 120 {
            return Err(format!("unsupported frame rate: {}", cam.frame_rate));
        }
        Ok(())
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(e.to_string()))?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TrackConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_facing_mode, FacingMode::User);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.microphone.sample_rate, 48000);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = TrackConfiguration::default();
        config.microphone.channels = 6;
        assert!(config.validate().unwrap_err().contains("channel count"));

        let mut config = TrackConfiguration::default();
        config.camera.height = 0;
        assert!(config.validate().unwrap_err().contains("resolution"));

        let mut config = TrackConfiguration::default();
        config.camera.frame_rate = 240;
        assert!(config.validate().is_err());

        let mut config = TrackConfiguration::default();
        config.microphone.device_id = Some(String::new());
        assert!(config.validate().unwrap_err().contains("device id"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = TrackConfiguration::from_json(
            r#"{ "initial_facing_mode": "environment", "camera": { "frame_rate": 30 } }"#,
        )
        .unwrap();

        assert_eq!(config.initial_facing_mode, FacingMode::Environment);
        assert_eq!(config.camera.frame_rate, 30);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.microphone, AudioTrackConfig::default());
    }

    #[test]
    fn invalid_json_is_configuration_error() {
        let err = TrackConfiguration::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));

        let err = TrackConfiguration::from_json(r#"{ "camera": { "width": 0 } }"#).unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }
}
