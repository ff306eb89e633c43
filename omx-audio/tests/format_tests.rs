// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Format descriptor, buffer sizing and header encoding.

use omx::AudioCoding;
use omx_audio::{
    Codec, ConfigError, Encoding, FormatDescriptor, FormatHeader, StreamFormat,
    format::{
        KSDATAFORMAT_SUBTYPE_PCM, WAVE_FORMAT_EXTENSIBLE, input_buffer_size, output_channel_tier,
    },
    max_output_channels,
};

#[test]
fn channel_tiers() {
    let tiers: Vec<u32> = (1..=8)
        .map(|channels| output_channel_tier(channels).unwrap())
        .collect();
    assert_eq!(tiers, [1, 2, 4, 4, 8, 8, 8, 8]);

    for channels in 1..=8 {
        let tier = output_channel_tier(channels).unwrap();
        assert!(tier >= channels);
        assert_eq!(output_channel_tier(tier).unwrap(), tier);
    }
    assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));

    assert_eq!(output_channel_tier(0), Err(ConfigError::ChannelCount(0)));
    assert_eq!(output_channel_tier(9), Err(ConfigError::ChannelCount(9)));
    assert_eq!(max_output_channels(), 8);
}

#[test]
fn buffer_size_is_padded_to_16_bytes() {
    for frames in [1, 7, 100, 1024, 1023] {
        for bit_depth in [8, 16, 24, 32] {
            for channels in [1, 2, 4, 8] {
                let size = input_buffer_size(frames, bit_depth, channels).unwrap();
                let raw = frames * bit_depth * channels / 8;
                assert_eq!(size % 16, 0);
                assert!(size >= raw && size < raw + 16);
            }
        }
    }
    assert_eq!(input_buffer_size(1024, 16, 2), Ok(4096));
    assert_eq!(input_buffer_size(1024, 16, 8), Ok(16_384));
    assert_eq!(input_buffer_size(1, 8, 1), Ok(16));
}

#[test]
fn oversized_buffers_are_rejected() {
    // Padded size must stay within 32 bits.
    assert_eq!(input_buffer_size(0xFFFF_FFF0, 8, 1), Ok(0xFFFF_FFF0));
    assert_eq!(
        input_buffer_size(0xFFFF_FFF1, 8, 1),
        Err(ConfigError::BufferSize(0xFFFF_FFF1))
    );
    assert_eq!(
        input_buffer_size(u32::MAX, 32, 8),
        Err(ConfigError::BufferSize(u32::MAX))
    );

    // Large but representable budgets no longer wrap around.
    let settings = omx_audio::PipelineSettings {
        frames_per_buffer: 20_000_000,
        ..Default::default()
    };
    assert_eq!(settings.validate(), Ok(()));
    assert_eq!(
        FormatDescriptor::build(&StreamFormat::pcm(8, 32, 48_000), settings.frames_per_buffer)
            .map(|d| d.buffer_size),
        Ok(640_000_000)
    );
    assert_eq!(
        FormatDescriptor::build(&StreamFormat::pcm(8, 32, 48_000), 200_000_000),
        Err(ConfigError::BufferSize(200_000_000))
    );
}

#[test]
fn overflowing_byte_rate_is_rejected() {
    assert_eq!(
        FormatDescriptor::build(&StreamFormat::pcm(8, 32, 200_000_000), 1024),
        Err(ConfigError::ByteRate(200_000_000))
    );
    let descriptor = FormatDescriptor::build(&StreamFormat::pcm(8, 32, 134_217_727), 16).unwrap();
    assert_eq!(descriptor.average_byte_rate, 134_217_727 * 32);
}

#[test]
fn pcm_buffers_must_hold_the_header() {
    assert_eq!(
        FormatDescriptor::build(&StreamFormat::pcm(1, 8, 48_000), 1),
        Err(ConfigError::BufferTooSmall {
            size: 16,
            needed: 40
        })
    );
    assert_eq!(
        FormatDescriptor::build(&StreamFormat::pcm(2, 16, 48_000), 9).map(|d| d.buffer_size),
        Ok(48)
    );

    // Passthrough sends no header, so small buffers are fine.
    let ac3 = StreamFormat {
        encoding: Encoding::Ac3,
        ..StreamFormat::pcm(1, 8, 48_000)
    };
    assert_eq!(
        FormatDescriptor::build(&ac3, 1).map(|d| d.buffer_size),
        Ok(16)
    );
}

#[test]
fn descriptor_for_stereo() {
    let descriptor = FormatDescriptor::build(&StreamFormat::pcm(2, 16, 48_000), 1024).unwrap();
    assert_eq!(descriptor.output_channels, 2);
    assert_eq!(descriptor.bytes_per_sample, 2);
    assert_eq!(descriptor.block_align, 4);
    assert_eq!(descriptor.average_byte_rate, 192_000);
    assert_eq!(descriptor.buffer_size, 4096);
}

#[test]
fn descriptor_pads_to_tier() {
    let descriptor = FormatDescriptor::build(&StreamFormat::pcm(3, 24, 44_100), 1024).unwrap();
    assert_eq!(descriptor.output_channels, 4);
    assert_eq!(descriptor.block_align, 12);
    assert_eq!(descriptor.average_byte_rate, 44_100 * 12);
    assert_eq!(descriptor.buffer_size, 12_288);
    // The map follows the real channel count, not the tier.
    assert_eq!(descriptor.channel_map.positions().count(), 3);
}

#[test]
fn unsupported_formats_are_rejected() {
    let build = |format: StreamFormat| FormatDescriptor::build(&format, 1024).unwrap_err();
    assert_eq!(
        build(StreamFormat::pcm(0, 16, 48_000)),
        ConfigError::ChannelCount(0)
    );
    assert_eq!(
        build(StreamFormat::pcm(9, 16, 48_000)),
        ConfigError::ChannelCount(9)
    );
    assert_eq!(build(StreamFormat::pcm(2, 12, 48_000)), ConfigError::BitDepth(12));
    assert_eq!(build(StreamFormat::pcm(2, 40, 48_000)), ConfigError::BitDepth(40));
    assert_eq!(build(StreamFormat::pcm(2, 16, 0)), ConfigError::SampleRate);
    assert_eq!(
        FormatDescriptor::build(&StreamFormat::pcm(2, 16, 48_000), 0).unwrap_err(),
        ConfigError::FramesPerBuffer
    );
}

#[test]
fn header_fields() {
    let descriptor = FormatDescriptor::build(&StreamFormat::pcm(6, 16, 48_000), 1024).unwrap();
    let header = descriptor.header();
    assert_eq!(header.format_tag, WAVE_FORMAT_EXTENSIBLE);
    assert_eq!(header.channels, 8);
    assert_eq!(header.samples_per_sec, 48_000);
    assert_eq!(header.block_align, 16);
    assert_eq!(header.avg_bytes_per_sec, 48_000 * 16);
    assert_eq!(header.bits_per_sample, 16);
    assert_eq!(header.valid_bits_per_sample, 16);
    assert_eq!(header.cb_size, 22);
    // FL FR FC LFE BL BR
    assert_eq!(header.channel_mask, 0x3f);
    assert_eq!(header.sub_format, KSDATAFORMAT_SUBTYPE_PCM);
}

#[test]
fn header_encoding() {
    let descriptor = FormatDescriptor::build(&StreamFormat::pcm(2, 16, 44_100), 1024).unwrap();
    let bytes = descriptor.header().to_bytes();
    assert_eq!(bytes.len(), FormatHeader::SIZE);

    assert_eq!(&bytes[0..2], &[0xfe, 0xff]);
    assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 2);
    assert_eq!(
        u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        44_100
    );
    assert_eq!(
        u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        44_100 * 4
    );
    assert_eq!(u16::from_le_bytes([bytes[12], bytes[13]]), 4);
    assert_eq!(u16::from_le_bytes([bytes[14], bytes[15]]), 16);
    assert_eq!(u16::from_le_bytes([bytes[16], bytes[17]]), 22);
    assert_eq!(u16::from_le_bytes([bytes[18], bytes[19]]), 16);
    assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 0x3);
    assert_eq!(
        &bytes[24..40],
        &[
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00, 0x38,
            0x9b, 0x71
        ]
    );
}

#[test]
fn side_back_flip_keeps_mask_and_reorders_mapping() {
    let plain = FormatDescriptor::build(&StreamFormat::pcm(8, 16, 48_000), 1024).unwrap();
    let flipped = FormatDescriptor::build(
        &StreamFormat {
            side_back_flipped: true,
            ..StreamFormat::pcm(8, 16, 48_000)
        },
        1024,
    )
    .unwrap();
    // The full 7.1 layout covers the same speakers either way.
    assert_eq!(plain.header().channel_mask, 0x63f);
    assert_eq!(flipped.header().channel_mask, 0x63f);
    assert_ne!(plain.pcm_mode().channel_mapping, flipped.pcm_mode().channel_mapping);
}

#[test]
fn pcm_mode_block() {
    let descriptor = FormatDescriptor::build(&StreamFormat::pcm(5, 32, 96_000), 256).unwrap();
    let pcm = descriptor.pcm_mode();
    assert_eq!(pcm.channels, 8);
    assert_eq!(pcm.bits_per_sample, 32);
    assert_eq!(pcm.sample_rate, 96_000);
    assert!(pcm.signed && pcm.little_endian && pcm.interleaved);
    assert_eq!(
        pcm.channel_mapping[..8],
        descriptor.channel_map.to_omx()[..8]
    );
}

#[test]
fn encodings() {
    assert_eq!(Encoding::Pcm.coding(), AudioCoding::Pcm);
    assert_eq!(Encoding::Ac3.coding(), AudioCoding::Ddp);
    assert_eq!(Encoding::Dts.coding(), AudioCoding::Dts);
    assert!(!Encoding::Pcm.is_passthrough());
    assert!(Encoding::Ac3.is_passthrough());
    assert!(Encoding::Dts.is_passthrough());

    assert_eq!("EAC3".parse::<Encoding>(), Ok(Encoding::Ac3));
    assert_eq!("dts".parse::<Encoding>(), Ok(Encoding::Dts));
    assert!("flac".parse::<Encoding>().is_err());
    assert_eq!(Encoding::Ac3.to_string(), "ac3");
}

#[test]
fn passthrough_selection() {
    for rate in [32_000, 44_100, 48_000] {
        assert_eq!(Encoding::for_passthrough(Codec::Ac3, rate), Encoding::Ac3);
        assert_eq!(Encoding::for_passthrough(Codec::Eac3, rate), Encoding::Ac3);
    }
    assert_eq!(Encoding::for_passthrough(Codec::Ac3, 96_000), Encoding::Pcm);
    assert_eq!(Encoding::for_passthrough(Codec::Dts, 44_100), Encoding::Dts);
    assert_eq!(Encoding::for_passthrough(Codec::Dts, 48_000), Encoding::Dts);
    assert_eq!(Encoding::for_passthrough(Codec::Dts, 32_000), Encoding::Pcm);
    assert_eq!(Encoding::for_passthrough(Codec::Other, 48_000), Encoding::Pcm);
}
