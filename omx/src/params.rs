// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Typed views of the IL parameter blocks used by audio components.
//!
//! Every IL parameter block starts with `nSize` and `nVersion`; the
//! [`InitStructure`] helper fills those in so callers never build raw blocks
//! by hand.

use std::fmt;

/// Creates a zeroed IL structure with its size and version header set.
pub(crate) trait InitStructure: Sized {
    fn init() -> Self;
}

macro_rules! impl_init_structure {
    ($($ty:ty),* $(,)?) => {$(
        impl InitStructure for $ty {
            fn init() -> Self {
                // Safety: the IL parameter blocks are plain C data for which
                // the all-zero bit pattern is valid.
                let mut value: Self = unsafe { std::mem::zeroed() };
                value.nSize = std::mem::size_of::<Self>() as u32;
                value.nVersion.nVersion = omx_sys::OMX_VERSION;
                value
            }
        }
    )*};
}

impl_init_structure!(
    omx_sys::PortParam,
    omx_sys::PortDefinition,
    omx_sys::AudioPortFormat,
    omx_sys::AudioPcmMode,
    omx_sys::ConfigBoolean,
    omx_sys::BrcmAudioDestination,
);

/// Component states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    Invalid,
    Loaded,
    Idle,
    Executing,
    Pause,
    WaitForResources,
}

impl ComponentState {
    pub fn raw(self) -> omx_sys::StateType {
        match self {
            ComponentState::Invalid => omx_sys::OMX_StateInvalid,
            ComponentState::Loaded => omx_sys::OMX_StateLoaded,
            ComponentState::Idle => omx_sys::OMX_StateIdle,
            ComponentState::Executing => omx_sys::OMX_StateExecuting,
            ComponentState::Pause => omx_sys::OMX_StatePause,
            ComponentState::WaitForResources => omx_sys::OMX_StateWaitForResources,
        }
    }

    pub fn from_raw(value: omx_sys::StateType) -> Self {
        match value {
            omx_sys::OMX_StateLoaded => ComponentState::Loaded,
            omx_sys::OMX_StateIdle => ComponentState::Idle,
            omx_sys::OMX_StateExecuting => ComponentState::Executing,
            omx_sys::OMX_StatePause => ComponentState::Pause,
            omx_sys::OMX_StateWaitForResources => ComponentState::WaitForResources,
            _ => ComponentState::Invalid,
        }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentState::Invalid => "invalid",
            ComponentState::Loaded => "loaded",
            ComponentState::Idle => "idle",
            ComponentState::Executing => "executing",
            ComponentState::Pause => "pause",
            ComponentState::WaitForResources => "wait-for-resources",
        };
        f.write_str(name)
    }
}

/// Audio coding carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCoding {
    /// Linear PCM.
    Pcm,
    /// Dolby Digital / Dolby Digital Plus bitstream.
    Ddp,
    /// DTS bitstream.
    Dts,
    /// Any other coding, kept as its raw value.
    Other(omx_sys::AudioCodingType),
}

impl AudioCoding {
    pub fn raw(self) -> omx_sys::AudioCodingType {
        match self {
            AudioCoding::Pcm => omx_sys::OMX_AUDIO_CodingPCM,
            AudioCoding::Ddp => omx_sys::OMX_AUDIO_CodingDDP,
            AudioCoding::Dts => omx_sys::OMX_AUDIO_CodingDTS,
            AudioCoding::Other(value) => value,
        }
    }

    pub fn from_raw(value: omx_sys::AudioCodingType) -> Self {
        match value {
            omx_sys::OMX_AUDIO_CodingPCM => AudioCoding::Pcm,
            omx_sys::OMX_AUDIO_CodingDDP => AudioCoding::Ddp,
            omx_sys::OMX_AUDIO_CodingDTS => AudioCoding::Dts,
            other => AudioCoding::Other(other),
        }
    }
}

/// Speaker assignment of one PCM channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    #[default]
    None,
    LeftFront,
    RightFront,
    CenterFront,
    LeftSurround,
    RightSurround,
    LowFrequency,
    CenterSurround,
    LeftRear,
    RightRear,
}

impl AudioChannel {
    pub fn raw(self) -> omx_sys::AudioChannelType {
        match self {
            AudioChannel::None => omx_sys::OMX_AUDIO_ChannelNone,
            AudioChannel::LeftFront => omx_sys::OMX_AUDIO_ChannelLF,
            AudioChannel::RightFront => omx_sys::OMX_AUDIO_ChannelRF,
            AudioChannel::CenterFront => omx_sys::OMX_AUDIO_ChannelCF,
            AudioChannel::LeftSurround => omx_sys::OMX_AUDIO_ChannelLS,
            AudioChannel::RightSurround => omx_sys::OMX_AUDIO_ChannelRS,
            AudioChannel::LowFrequency => omx_sys::OMX_AUDIO_ChannelLFE,
            AudioChannel::CenterSurround => omx_sys::OMX_AUDIO_ChannelCS,
            AudioChannel::LeftRear => omx_sys::OMX_AUDIO_ChannelLR,
            AudioChannel::RightRear => omx_sys::OMX_AUDIO_ChannelRR,
        }
    }

    pub fn from_raw(value: omx_sys::AudioChannelType) -> Self {
        match value {
            omx_sys::OMX_AUDIO_ChannelLF => AudioChannel::LeftFront,
            omx_sys::OMX_AUDIO_ChannelRF => AudioChannel::RightFront,
            omx_sys::OMX_AUDIO_ChannelCF => AudioChannel::CenterFront,
            omx_sys::OMX_AUDIO_ChannelLS => AudioChannel::LeftSurround,
            omx_sys::OMX_AUDIO_ChannelRS => AudioChannel::RightSurround,
            omx_sys::OMX_AUDIO_ChannelLFE => AudioChannel::LowFrequency,
            omx_sys::OMX_AUDIO_ChannelCS => AudioChannel::CenterSurround,
            omx_sys::OMX_AUDIO_ChannelLR => AudioChannel::LeftRear,
            omx_sys::OMX_AUDIO_ChannelRR => AudioChannel::RightRear,
            _ => AudioChannel::None,
        }
    }
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// Buffer geometry and status of a port (`OMX_PARAM_PORTDEFINITIONTYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDefinition {
    pub port: u32,
    pub direction: PortDirection,
    pub buffer_count_actual: u32,
    pub buffer_count_min: u32,
    pub buffer_size: u32,
    pub enabled: bool,
    pub populated: bool,
    /// Encoding of an audio-domain port, `None` for other domains.
    pub audio_encoding: Option<AudioCoding>,
}

impl PortDefinition {
    pub(crate) fn from_raw(raw: &omx_sys::PortDefinition) -> Self {
        let audio_encoding = (raw.eDomain == omx_sys::OMX_PortDomainAudio)
            .then(|| AudioCoding::from_raw(unsafe { raw.format.audio.eEncoding }));
        Self {
            port: raw.nPortIndex,
            direction: if raw.eDir == omx_sys::OMX_DirOutput {
                PortDirection::Output
            } else {
                PortDirection::Input
            },
            buffer_count_actual: raw.nBufferCountActual,
            buffer_count_min: raw.nBufferCountMin,
            buffer_size: raw.nBufferSize,
            enabled: raw.bEnabled != omx_sys::OMX_FALSE,
            populated: raw.bPopulated != omx_sys::OMX_FALSE,
            audio_encoding,
        }
    }
}

/// Linear PCM description of a port (`OMX_AUDIO_PARAM_PCMMODETYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmMode {
    pub channels: u32,
    pub signed: bool,
    pub little_endian: bool,
    pub interleaved: bool,
    pub bits_per_sample: u32,
    pub sample_rate: u32,
    pub channel_mapping: [AudioChannel; omx_sys::OMX_AUDIO_MAXCHANNELS],
}

impl Default for PcmMode {
    fn default() -> Self {
        Self {
            channels: 2,
            signed: true,
            little_endian: true,
            interleaved: true,
            bits_per_sample: 16,
            sample_rate: 48_000,
            channel_mapping: [AudioChannel::None; omx_sys::OMX_AUDIO_MAXCHANNELS],
        }
    }
}

impl PcmMode {
    pub(crate) fn from_raw(raw: &omx_sys::AudioPcmMode) -> Self {
        Self {
            channels: raw.nChannels,
            signed: raw.eNumData == omx_sys::OMX_NumericalDataSigned,
            little_endian: raw.eEndian == omx_sys::OMX_EndianLittle,
            interleaved: raw.bInterleaved != omx_sys::OMX_FALSE,
            bits_per_sample: raw.nBitPerSample,
            sample_rate: raw.nSamplingRate,
            channel_mapping: raw.eChannelMapping.map(AudioChannel::from_raw),
        }
    }

    pub(crate) fn to_raw(&self, port: u32) -> omx_sys::AudioPcmMode {
        let mut raw = omx_sys::AudioPcmMode::init();
        raw.nPortIndex = port;
        raw.nChannels = self.channels;
        raw.eNumData = if self.signed {
            omx_sys::OMX_NumericalDataSigned
        } else {
            omx_sys::OMX_NumericalDataUnsigned
        };
        raw.eEndian = if self.little_endian {
            omx_sys::OMX_EndianLittle
        } else {
            omx_sys::OMX_EndianBig
        };
        raw.bInterleaved = if self.interleaved {
            omx_sys::OMX_TRUE
        } else {
            omx_sys::OMX_FALSE
        };
        raw.nBitPerSample = self.bits_per_sample;
        raw.nSamplingRate = self.sample_rate;
        raw.ePCMMode = omx_sys::OMX_AUDIO_PCMModeLinear;
        raw.eChannelMapping = self.channel_mapping.map(AudioChannel::raw);
        raw
    }
}
