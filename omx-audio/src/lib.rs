// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! # omx-audio
//!
//! Hardware audio output on VideoCore-class SoCs through the OpenMAX IL
//! `audio_decode` and `audio_render` components.
//!
//! ## Overview
//!
//! [`AudioPlayer`] drives a decoder tunnelled into a renderer. PCM is decoded
//! by the hardware from a WAVE-style header sent ahead of the payload; AC-3
//! and DTS bitstreams are passed through unmodified to the HDMI sink.
//!
//! ```text
//! create ─► start(format) ─► write(payload)* ─► stop ─► destroy
//!              ▲                                 │
//!              └─────────────────────────────────┘
//! ```
//!
//! The player is generic over [`AudioHardware`]; [`OmxHardware`] implements
//! it on the IL and tests substitute a mock.
//!
//! ## Modules
//!
//! - [`format`]: channel tiers, buffer sizing and the format header
//! - [`channel_map`]: speaker assignment per channel count
//! - [`settings`]: component names, ports and buffering, loadable from JSON
//!
//! ## Examples
//!
//! ```no_run
//! use omx_audio::{AudioPlayer, Encoding, OmxHardware, PipelineSettings, StreamFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut player = AudioPlayer::create(OmxHardware::open()?, PipelineSettings::default())?;
//! player.start(&StreamFormat {
//!     channels: 6,
//!     bit_depth: 16,
//!     sample_rate: 48_000,
//!     side_back_flipped: false,
//!     encoding: Encoding::Pcm,
//! })?;
//! player.write(&vec![0u8; 6 * 2 * 1024])?;
//! player.stop()?;
//! player.destroy();
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod graph;
mod hardware;
mod player;
mod stream;

pub mod channel_map;
pub mod format;
pub mod settings;

pub use backend::OmxHardware;
pub use channel_map::{ChannelMap, SpeakerPosition};
pub use error::{ConfigError, Error, Result, SettingsError};
pub use format::{
    Codec, Encoding, FormatDescriptor, FormatHeader, StreamFormat, max_output_channels,
};
pub use hardware::{AudioHardware, HardwareBuffer, HwResult, Param, ParamIndex, TunnelSpec};
pub use player::{AudioPlayer, PlayerState};
pub use settings::{AudioDestination, PipelineSettings};
