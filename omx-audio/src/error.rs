// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Error types of the audio pipeline.

use crate::player::PlayerState;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// A stream format or setting the pipeline cannot accept.
///
/// Always reported before any hardware call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported channel count {0}, expected 1 to 8")]
    ChannelCount(u32),

    #[error("Unsupported bit depth {0}, expected 8, 16, 24 or 32")]
    BitDepth(u32),

    #[error("Sample rate must be greater than zero")]
    SampleRate,

    #[error("Frames per buffer must be greater than zero")]
    FramesPerBuffer,

    #[error("Sample rate {0} Hz overflows the average byte rate")]
    ByteRate(u32),

    #[error("{0} frames per buffer exceed the maximum buffer size")]
    BufferSize(u32),

    #[error("Input buffers of {size} bytes cannot hold the {needed}-byte format header")]
    BufferTooSmall { size: u32, needed: u32 },

    #[error("Buffer count must be greater than zero")]
    BufferCount,
}

/// Failure to read pipeline settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Reading settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`crate::AudioPlayer`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested stream format is not supported.
    #[error("Invalid stream format: {0}")]
    Config(#[from] ConfigError),

    /// The hardware rejected a negotiation step or transition.
    ///
    /// The pipeline is faulted afterwards and must be destroyed.
    #[error("{operation} failed: {source}")]
    Hardware {
        operation: &'static str,
        #[source]
        source: omx::Error,
    },

    /// The operation is not allowed in the pipeline's current state.
    #[error("{operation} is not allowed while the player is {state}")]
    InvalidState {
        operation: &'static str,
        state: PlayerState,
    },

    /// A previous hardware failure left the pipeline unusable.
    #[error("Pipeline is faulted after a hardware failure")]
    Faulted,

    /// Pipeline settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl Error {
    pub(crate) fn hardware(operation: &'static str) -> impl FnOnce(omx::Error) -> Error {
        move |source| Error::Hardware { operation, source }
    }
}
