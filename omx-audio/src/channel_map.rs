// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Speaker assignment of interleaved channels.
//!
//! Channels are assigned in discrete 5.1/7.1 order: front pair, centre, LFE,
//! rear pair, side pair. Streams with fewer channels use a prefix of that
//! order, except mono which plays on the centre speaker.

use omx::AudioChannel;

use crate::error::ConfigError;

/// Number of slots in a channel map.
pub const MAX_CHANNELS: usize = 8;

/// A speaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakerPosition {
    FrontLeft,
    FrontRight,
    FrontCenter,
    LowFrequency,
    RearLeft,
    RearRight,
    SideLeft,
    SideRight,
}

impl SpeakerPosition {
    /// IL channel code of this position.
    pub fn omx_channel(self) -> AudioChannel {
        match self {
            SpeakerPosition::FrontLeft => AudioChannel::LeftFront,
            SpeakerPosition::FrontRight => AudioChannel::RightFront,
            SpeakerPosition::FrontCenter => AudioChannel::CenterFront,
            SpeakerPosition::LowFrequency => AudioChannel::LowFrequency,
            SpeakerPosition::RearLeft => AudioChannel::LeftRear,
            SpeakerPosition::RearRight => AudioChannel::RightRear,
            SpeakerPosition::SideLeft => AudioChannel::LeftSurround,
            SpeakerPosition::SideRight => AudioChannel::RightSurround,
        }
    }

    /// `SPEAKER_*` bit of this position in a WAVE channel mask.
    pub fn speaker_mask(self) -> u32 {
        match self {
            SpeakerPosition::FrontLeft => 0x001,
            SpeakerPosition::FrontRight => 0x002,
            SpeakerPosition::FrontCenter => 0x004,
            SpeakerPosition::LowFrequency => 0x008,
            SpeakerPosition::RearLeft => 0x010,
            SpeakerPosition::RearRight => 0x020,
            SpeakerPosition::SideLeft => 0x200,
            SpeakerPosition::SideRight => 0x400,
        }
    }
}

use SpeakerPosition::*;

const ORDER: [SpeakerPosition; MAX_CHANNELS] = [
    FrontLeft,
    FrontRight,
    FrontCenter,
    LowFrequency,
    RearLeft,
    RearRight,
    SideLeft,
    SideRight,
];

/// Channel index to speaker position, for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelMap {
    slots: [Option<SpeakerPosition>; MAX_CHANNELS],
}

impl ChannelMap {
    /// Resolves the map of a stream with `channels` channels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ChannelCount`] unless `channels` is 1 to 8.
    ///
    /// # Examples
    ///
    /// ```
    /// use omx_audio::{ChannelMap, SpeakerPosition};
    ///
    /// let map = ChannelMap::resolve(2, false).unwrap();
    /// assert_eq!(
    ///     map.positions().collect::<Vec<_>>(),
    ///     [SpeakerPosition::FrontLeft, SpeakerPosition::FrontRight]
    /// );
    /// ```
    pub fn resolve(channels: u32, side_back_flipped: bool) -> Result<Self, ConfigError> {
        let count = channels as usize;
        if !(1..=MAX_CHANNELS).contains(&count) {
            return Err(ConfigError::ChannelCount(channels));
        }
        let mut slots = [None; MAX_CHANNELS];
        if count == 1 {
            slots[0] = Some(FrontCenter);
        } else {
            for (slot, position) in slots.iter_mut().zip(ORDER).take(count) {
                *slot = Some(position);
            }
        }
        let map = Self { slots };
        Ok(if side_back_flipped {
            map.flip_side_back()
        } else {
            map
        })
    }

    /// Swaps the rear pair (slots 4 and 5) with the side pair (slots 6 and 7).
    ///
    /// For sources that label their side channels as rear and the other way
    /// round. Applying it twice restores the original map.
    pub fn flip_side_back(self) -> Self {
        let mut slots = self.slots;
        slots.swap(4, 6);
        slots.swap(5, 7);
        Self { slots }
    }

    /// All eight slots; unused slots are `None`.
    pub fn slots(&self) -> &[Option<SpeakerPosition>; MAX_CHANNELS] {
        &self.slots
    }

    /// The assigned positions in slot order.
    pub fn positions(&self) -> impl Iterator<Item = SpeakerPosition> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// OR of the speaker bits of every assigned position.
    pub fn speaker_mask(&self) -> u32 {
        self.positions()
            .fold(0, |mask, position| mask | position.speaker_mask())
    }

    /// The map as the IL's `eChannelMapping` table.
    pub fn to_omx(&self) -> [AudioChannel; 16] {
        let mut mapping = [AudioChannel::None; 16];
        for (target, slot) in mapping.iter_mut().zip(self.slots) {
            *target = slot.map_or(AudioChannel::None, SpeakerPosition::omx_channel);
        }
        mapping
    }
}
