// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Stream formats and everything derived from them.
//!
//! A [`StreamFormat`] is what the caller asks for. [`FormatDescriptor::build`]
//! validates it and computes the hardware view: the channel tier the renderer
//! runs at, the input buffer geometry, and the WAVE header the decoder reads
//! before PCM payload.

use std::{fmt, str::FromStr};

use omx::{AudioCoding, PcmMode};

use crate::{channel_map::ChannelMap, error::ConfigError};

/// Maximum number of channels the renderer outputs.
pub const MAX_OUTPUT_CHANNELS: u32 = 8;

/// Returns the maximum number of output channels; decoders should downmix
/// anything wider.
pub fn max_output_channels() -> u32 {
    MAX_OUTPUT_CHANNELS
}

/// What is carried in the payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Interleaved linear PCM, decoded by the hardware decoder.
    #[default]
    Pcm,
    /// AC-3 / E-AC-3 bitstream, passed through to the sink.
    Ac3,
    /// DTS bitstream, passed through to the sink.
    Dts,
}

/// Codec of a source stream, as reported by a demuxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Ac3,
    Eac3,
    Dts,
    /// Anything that has to be decoded to PCM first.
    Other,
}

impl Encoding {
    /// Whether the decoder forwards this encoding unmodified.
    pub fn is_passthrough(self) -> bool {
        !matches!(self, Encoding::Pcm)
    }

    /// Port coding the decoder input is set to.
    pub fn coding(self) -> AudioCoding {
        match self {
            Encoding::Pcm => AudioCoding::Pcm,
            Encoding::Ac3 => AudioCoding::Ddp,
            Encoding::Dts => AudioCoding::Dts,
        }
    }

    /// Chooses between passthrough and PCM for a source stream.
    ///
    /// Dolby streams pass through at 32, 44.1 and 48 kHz, DTS at 44.1 and
    /// 48 kHz. Everything else is decoded and played as PCM.
    ///
    /// # Examples
    ///
    /// ```
    /// use omx_audio::{Codec, Encoding};
    ///
    /// assert_eq!(Encoding::for_passthrough(Codec::Eac3, 48_000), Encoding::Ac3);
    /// assert_eq!(Encoding::for_passthrough(Codec::Dts, 32_000), Encoding::Pcm);
    /// ```
    pub fn for_passthrough(codec: Codec, sample_rate: u32) -> Self {
        match (codec, sample_rate) {
            (Codec::Ac3 | Codec::Eac3, 32_000 | 44_100 | 48_000) => Encoding::Ac3,
            (Codec::Dts, 44_100 | 48_000) => Encoding::Dts,
            _ => Encoding::Pcm,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Pcm => "pcm",
            Encoding::Ac3 => "ac3",
            Encoding::Dts => "dts",
        })
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pcm" => Ok(Encoding::Pcm),
            "ac3" | "eac3" => Ok(Encoding::Ac3),
            "dts" => Ok(Encoding::Dts),
            other => Err(format!("unknown encoding {other:?}, expected pcm, ac3 or dts")),
        }
    }
}

/// The format of the stream passed to [`crate::AudioPlayer::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamFormat {
    /// Interleaved channels in the payload, 1 to 8.
    pub channels: u32,
    /// Bits per sample: 8, 16, 24 or 32.
    pub bit_depth: u32,
    /// Frames per second.
    pub sample_rate: u32,
    /// Source labels its side channels as rear and the other way round.
    pub side_back_flipped: bool,
    pub encoding: Encoding,
}

impl StreamFormat {
    /// A PCM format with the usual channel order.
    pub fn pcm(channels: u32, bit_depth: u32, sample_rate: u32) -> Self {
        Self {
            channels,
            bit_depth,
            sample_rate,
            side_back_flipped: false,
            encoding: Encoding::Pcm,
        }
    }

    /// Checks the format without deriving anything from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_OUTPUT_CHANNELS).contains(&self.channels) {
            return Err(ConfigError::ChannelCount(self.channels));
        }
        if self.bit_depth % 8 != 0 || !(8..=32).contains(&self.bit_depth) {
            return Err(ConfigError::BitDepth(self.bit_depth));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        Ok(())
    }
}

/// Channel count the renderer runs at for a stream of `channels` channels.
///
/// The hardware supports 1, 2, 4 and 8 channels; other counts are padded up
/// to the next tier.
pub fn output_channel_tier(channels: u32) -> Result<u32, ConfigError> {
    match channels {
        1 => Ok(1),
        2 => Ok(2),
        3 | 4 => Ok(4),
        5..=8 => Ok(8),
        other => Err(ConfigError::ChannelCount(other)),
    }
}

/// Size of one input buffer holding `frames` frames, rounded up to 16 bytes.
///
/// # Errors
///
/// Returns [`ConfigError::BufferSize`] if the size does not fit in a `u32`.
pub fn input_buffer_size(frames: u32, bit_depth: u32, channels: u32) -> Result<u32, ConfigError> {
    let raw = u64::from(frames) * u64::from(bit_depth) * u64::from(channels) / 8;
    u32::try_from((raw + 15) & !15).map_err(|_| ConfigError::BufferSize(frames))
}

/// Everything the pipeline derives from a [`StreamFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub format: StreamFormat,
    /// Channel tier the renderer runs at.
    pub output_channels: u32,
    pub bytes_per_sample: u32,
    /// Bytes per frame at the output channel count.
    pub block_align: u32,
    pub average_byte_rate: u32,
    /// Input buffer size in bytes, a multiple of 16.
    pub buffer_size: u32,
    pub channel_map: ChannelMap,
}

impl FormatDescriptor {
    /// Validates `format` and derives the hardware configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unsupported channel counts, bit depths
    /// or sample rates, an overflowing byte rate, a zero or oversized
    /// `frames_per_buffer`, or PCM buffers too small for the format header.
    ///
    /// # Examples
    ///
    /// ```
    /// use omx_audio::{FormatDescriptor, StreamFormat};
    ///
    /// let descriptor = FormatDescriptor::build(&StreamFormat::pcm(6, 16, 48_000), 1024).unwrap();
    /// assert_eq!(descriptor.output_channels, 8);
    /// assert_eq!(descriptor.buffer_size, 16_384);
    /// ```
    pub fn build(format: &StreamFormat, frames_per_buffer: u32) -> Result<Self, ConfigError> {
        format.validate()?;
        if frames_per_buffer == 0 {
            return Err(ConfigError::FramesPerBuffer);
        }
        let output_channels = output_channel_tier(format.channels)?;
        let bytes_per_sample = format.bit_depth / 8;
        let block_align = bytes_per_sample * output_channels;
        let average_byte_rate = format
            .sample_rate
            .checked_mul(block_align)
            .ok_or(ConfigError::ByteRate(format.sample_rate))?;
        let buffer_size = input_buffer_size(frames_per_buffer, format.bit_depth, output_channels)?;
        // PCM input buffers also carry the format header.
        if !format.encoding.is_passthrough() && (buffer_size as usize) < FormatHeader::SIZE {
            return Err(ConfigError::BufferTooSmall {
                size: buffer_size,
                needed: FormatHeader::SIZE as u32,
            });
        }
        Ok(Self {
            format: *format,
            output_channels,
            bytes_per_sample,
            block_align,
            average_byte_rate,
            buffer_size,
            channel_map: ChannelMap::resolve(format.channels, format.side_back_flipped)?,
        })
    }

    /// The WAVE header sent ahead of PCM payload.
    pub fn header(&self) -> FormatHeader {
        FormatHeader {
            format_tag: WAVE_FORMAT_EXTENSIBLE,
            channels: self.output_channels as u16,
            samples_per_sec: self.format.sample_rate,
            avg_bytes_per_sec: self.average_byte_rate,
            block_align: self.block_align as u16,
            bits_per_sample: self.format.bit_depth as u16,
            cb_size: EXTENSIBLE_CB_SIZE,
            valid_bits_per_sample: self.format.bit_depth as u16,
            channel_mask: self.channel_map.speaker_mask(),
            sub_format: KSDATAFORMAT_SUBTYPE_PCM,
        }
    }

    /// The PCM block set on the decoder input.
    pub fn pcm_mode(&self) -> PcmMode {
        PcmMode {
            channels: self.output_channels,
            signed: true,
            little_endian: true,
            interleaved: true,
            bits_per_sample: self.format.bit_depth,
            sample_rate: self.format.sample_rate,
            channel_mapping: self.channel_map.to_omx(),
        }
    }
}

pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Bytes following `cbSize` in a `WAVEFORMATEXTENSIBLE`.
const EXTENSIBLE_CB_SIZE: u16 = 22;

/// A Windows-style GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

pub const KSDATAFORMAT_SUBTYPE_PCM: Guid = Guid {
    data1: 0x0000_0001,
    data2: 0x0000,
    data3: 0x0010,
    data4: [0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71],
};

/// `WAVEFORMATEXTENSIBLE` describing a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatHeader {
    pub format_tag: u16,
    pub channels: u16,
    pub samples_per_sec: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub cb_size: u16,
    pub valid_bits_per_sample: u16,
    pub channel_mask: u32,
    pub sub_format: Guid,
}

impl FormatHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 40;

    /// Encodes the header as packed little-endian bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut offset = 0;
        let mut put = |field: &[u8]| {
            bytes[offset..offset + field.len()].copy_from_slice(field);
            offset += field.len();
        };
        put(&self.format_tag.to_le_bytes());
        put(&self.channels.to_le_bytes());
        put(&self.samples_per_sec.to_le_bytes());
        put(&self.avg_bytes_per_sec.to_le_bytes());
        put(&self.block_align.to_le_bytes());
        put(&self.bits_per_sample.to_le_bytes());
        put(&self.cb_size.to_le_bytes());
        put(&self.valid_bits_per_sample.to_le_bytes());
        put(&self.channel_mask.to_le_bytes());
        put(&self.sub_format.data1.to_le_bytes());
        put(&self.sub_format.data2.to_le_bytes());
        put(&self.sub_format.data3.to_le_bytes());
        put(&self.sub_format.data4);
        bytes
    }
}
