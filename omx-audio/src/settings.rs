// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline settings.
//!
//! Every field has a default matching the VideoCore firmware components, so
//! an empty JSON object is a valid settings file.

use std::{fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SettingsError};

pub const DEFAULT_DECODER: &str = "OMX.broadcom.audio_decode";
pub const DEFAULT_RENDERER: &str = "OMX.broadcom.audio_render";
pub const DEFAULT_DECODER_INPUT_PORT: u32 = 120;
pub const DEFAULT_DECODER_OUTPUT_PORT: u32 = 121;
pub const DEFAULT_RENDERER_INPUT_PORT: u32 = 100;
pub const DEFAULT_BUFFER_COUNT: u32 = 10;
pub const DEFAULT_FRAMES_PER_BUFFER: u32 = 1024;
pub const DEFAULT_DESTINATION: &str = "hdmi";
pub const DEFAULT_PORT_SETTINGS_TIMEOUT_MS: u64 = 1000;

/// Where the renderer sends its output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDestination {
    #[default]
    Hdmi,
    /// The analogue headphone jack.
    Local,
}

impl AudioDestination {
    /// Name understood by the renderer's destination config.
    pub fn as_str(self) -> &'static str {
        match self {
            AudioDestination::Hdmi => DEFAULT_DESTINATION,
            AudioDestination::Local => "local",
        }
    }
}

impl FromStr for AudioDestination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hdmi" => Ok(AudioDestination::Hdmi),
            "local" => Ok(AudioDestination::Local),
            other => Err(format!("unknown destination {other:?}, expected hdmi or local")),
        }
    }
}

/// Component names, ports and buffering of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub decoder: String,
    pub renderer: String,
    pub decoder_input_port: u32,
    pub decoder_output_port: u32,
    pub renderer_input_port: u32,
    /// Input buffers allocated on the decoder.
    pub buffer_count: u32,
    /// Frames one input buffer holds at the output channel tier.
    pub frames_per_buffer: u32,
    pub destination: AudioDestination,
    /// Upper bound on waiting for a free input buffer; `None` waits forever.
    pub buffer_timeout_ms: Option<u64>,
    /// Upper bound on waiting for the decoder to publish its output format
    /// after the first buffer.
    pub port_settings_timeout_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            decoder: DEFAULT_DECODER.to_owned(),
            renderer: DEFAULT_RENDERER.to_owned(),
            decoder_input_port: DEFAULT_DECODER_INPUT_PORT,
            decoder_output_port: DEFAULT_DECODER_OUTPUT_PORT,
            renderer_input_port: DEFAULT_RENDERER_INPUT_PORT,
            buffer_count: DEFAULT_BUFFER_COUNT,
            frames_per_buffer: DEFAULT_FRAMES_PER_BUFFER,
            destination: AudioDestination::default(),
            buffer_timeout_ms: None,
            port_settings_timeout_ms: DEFAULT_PORT_SETTINGS_TIMEOUT_MS,
        }
    }
}

impl PipelineSettings {
    /// Parses settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Settings`] for malformed JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let settings = serde_json::from_str(json).map_err(SettingsError::from)?;
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let json = fs::read_to_string(path).map_err(SettingsError::from)?;
        Self::from_json(&json)
    }

    pub fn buffer_timeout(&self) -> Option<Duration> {
        self.buffer_timeout_ms.map(Duration::from_millis)
    }

    pub fn port_settings_timeout(&self) -> Duration {
        Duration::from_millis(self.port_settings_timeout_ms)
    }

    /// Rejects settings no pipeline could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_count == 0 {
            return Err(ConfigError::BufferCount);
        }
        if self.frames_per_buffer == 0 {
            return Err(ConfigError::FramesPerBuffer);
        }
        Ok(())
    }
}
