// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

use omx::AudioChannel;
use omx_audio::{ChannelMap, ConfigError, SpeakerPosition::*};

#[test]
fn every_supported_count_resolves() {
    for channels in 1..=8u32 {
        let map = ChannelMap::resolve(channels, false).unwrap();
        assert_eq!(map.positions().count(), channels as usize);
        assert!(map.slots()[channels as usize..].iter().all(Option::is_none));
    }
}

#[test]
fn mono_plays_on_centre() {
    let map = ChannelMap::resolve(1, false).unwrap();
    assert_eq!(map.positions().collect::<Vec<_>>(), [FrontCenter]);
    assert_eq!(map.speaker_mask(), 0x4);
}

#[test]
fn cascade_order() {
    let positions = |channels| {
        ChannelMap::resolve(channels, false)
            .unwrap()
            .positions()
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(2), [FrontLeft, FrontRight]);
    assert_eq!(positions(3), [FrontLeft, FrontRight, FrontCenter]);
    assert_eq!(positions(4), [FrontLeft, FrontRight, FrontCenter, LowFrequency]);
    assert_eq!(
        positions(6),
        [FrontLeft, FrontRight, FrontCenter, LowFrequency, RearLeft, RearRight]
    );
    assert_eq!(
        positions(8),
        [
            FrontLeft,
            FrontRight,
            FrontCenter,
            LowFrequency,
            RearLeft,
            RearRight,
            SideLeft,
            SideRight
        ]
    );
}

#[test]
fn flip_swaps_rear_and_side() {
    let flipped = ChannelMap::resolve(8, true).unwrap();
    assert_eq!(
        flipped.positions().collect::<Vec<_>>(),
        [
            FrontLeft,
            FrontRight,
            FrontCenter,
            LowFrequency,
            SideLeft,
            SideRight,
            RearLeft,
            RearRight
        ]
    );

    // Five channels put the single rear channel into a side slot.
    let five = ChannelMap::resolve(5, true).unwrap();
    assert_eq!(five.slots()[4], None);
    assert_eq!(five.slots()[6], Some(RearLeft));
}

#[test]
fn flip_is_an_involution() {
    for channels in 1..=8 {
        for flipped in [false, true] {
            let map = ChannelMap::resolve(channels, flipped).unwrap();
            assert_eq!(map.flip_side_back().flip_side_back(), map);
        }
    }
}

#[test]
fn omx_mapping() {
    let mapping = ChannelMap::resolve(6, false).unwrap().to_omx();
    assert_eq!(
        mapping[..6],
        [
            AudioChannel::LeftFront,
            AudioChannel::RightFront,
            AudioChannel::CenterFront,
            AudioChannel::LowFrequency,
            AudioChannel::LeftRear,
            AudioChannel::RightRear
        ]
    );
    assert!(mapping[6..].iter().all(|channel| *channel == AudioChannel::None));
}

#[test]
fn out_of_range_counts_fail() {
    assert_eq!(
        ChannelMap::resolve(0, false),
        Err(ConfigError::ChannelCount(0))
    );
    assert_eq!(
        ChannelMap::resolve(9, true),
        Err(ConfigError::ChannelCount(9))
    );
}
