use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::media::CameraFacing;
use crate::sampler::DEFAULT_TICK_MS;

const DEFAULT_DEVICES_URL: &str = "stub://Front Camera,Back Camera";
const DEFAULT_MODEL_URL: &str = "stub://coco";
const DEFAULT_SPEECH_URL: &str = "log://";
const DEFAULT_FACING: CameraFacing = CameraFacing::Rear;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_FPS: u32 = 30;

#[derive(Debug, Deserialize, Default)]
struct SightguideConfigFile {
    camera: Option<CameraConfigFile>,
    model: Option<ModelConfigFile>,
    sampler: Option<SamplerConfigFile>,
    speech: Option<SpeechConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    devices_url: Option<String>,
    facing: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelConfigFile {
    url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SamplerConfigFile {
    tick_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct SpeechConfigFile {
    url: Option<String>,
    interrupt_on_clear: Option<bool>,
}

/// Runtime configuration for the perception client.
#[derive(Debug, Clone)]
pub struct SightguideConfig {
    pub camera: CameraSettings,
    pub model: ModelSettings,
    pub sampler: SamplerSettings,
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Device host URL (`stub://...`, `v4l2://`).
    pub devices_url: String,
    pub facing: CameraFacing,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Model URL (`stub://`, `scripted://`, `*.onnx`).
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SamplerSettings {
    pub tick_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    /// Speech engine URL (`log://`, `stub://`).
    pub url: String,
    /// Cancel in-flight speech when a frame has no detections.
    pub interrupt_on_clear: bool,
}

impl Default for SightguideConfig {
    fn default() -> Self {
        Self {
            camera: CameraSettings {
                devices_url: DEFAULT_DEVICES_URL.to_string(),
                facing: DEFAULT_FACING,
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
                fps: DEFAULT_FPS,
            },
            model: ModelSettings {
                url: DEFAULT_MODEL_URL.to_string(),
            },
            sampler: SamplerSettings {
                tick_ms: DEFAULT_TICK_MS,
            },
            speech: SpeechSettings {
                url: DEFAULT_SPEECH_URL.to_string(),
                interrupt_on_clear: false,
            },
        }
    }
}

impl SightguideConfig {
    /// Load configuration: defaults, then the JSON file named by
    /// `SIGHTGUIDE_CONFIG` (if set), then `SIGHTGUIDE_*` env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SIGHTGUIDE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SightguideConfigFile) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(camera) = file.camera {
            if let Some(url) = camera.devices_url {
                cfg.camera.devices_url = url;
            }
            if let Some(facing) = camera.facing {
                cfg.camera.facing = CameraFacing::from_str(&facing)?;
            }
            if let Some(width) = camera.width {
                cfg.camera.width = width;
            }
            if let Some(height) = camera.height {
                cfg.camera.height = height;
            }
            if let Some(fps) = camera.fps {
                cfg.camera.fps = fps;
            }
        }
        if let Some(model) = file.model {
            if let Some(url) = model.url {
                cfg.model.url = url;
            }
        }
        if let Some(sampler) = file.sampler {
            if let Some(tick_ms) = sampler.tick_ms {
                cfg.sampler.tick_ms = tick_ms;
            }
        }
        if let Some(speech) = file.speech {
            if let Some(url) = speech.url {
                cfg.speech.url = url;
            }
            if let Some(interrupt) = speech.interrupt_on_clear {
                cfg.speech.interrupt_on_clear = interrupt;
            }
        }

        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("SIGHTGUIDE_DEVICES_URL") {
            if !url.trim().is_empty() {
                self.camera.devices_url = url;
            }
        }
        if let Ok(facing) = std::env::var("SIGHTGUIDE_FACING") {
            if !facing.trim().is_empty() {
                self.camera.facing = CameraFacing::from_str(&facing)?;
            }
        }
        if let Ok(url) = std::env::var("SIGHTGUIDE_MODEL_URL") {
            if !url.trim().is_empty() {
                self.model.url = url;
            }
        }
        if let Ok(tick_ms) = std::env::var("SIGHTGUIDE_TICK_MS") {
            let tick_ms: u64 = tick_ms
                .parse()
                .map_err(|_| anyhow!("SIGHTGUIDE_TICK_MS must be an integer number of ms"))?;
            self.sampler.tick_ms = tick_ms;
        }
        if let Ok(url) = std::env::var("SIGHTGUIDE_SPEECH_URL") {
            if !url.trim().is_empty() {
                self.speech.url = url;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.sampler.tick_ms == 0 {
            return Err(anyhow!("sampler tick must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<SightguideConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let cfg = SightguideConfig::default();
        cfg.validate()?;
        assert_eq!(cfg.camera.facing, CameraFacing::Rear);
        assert_eq!(cfg.sampler.tick_ms, DEFAULT_TICK_MS);
        Ok(())
    }

    #[test]
    fn zero_tick_is_rejected() {
        let mut cfg = SightguideConfig::default();
        cfg.sampler.tick_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn file_facing_parses_aliases() -> Result<()> {
        let file = SightguideConfigFile {
            camera: Some(CameraConfigFile {
                facing: Some("environment".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cfg = SightguideConfig::from_file(file)?;
        assert_eq!(cfg.camera.facing, CameraFacing::Rear);
        Ok(())
    }
}
