//! Per-voice channel bookkeeping.
//!
//! The driver tracks what each logical voice currently represents so it can
//! rebuild shared register contents without reading the (write-only)
//! hardware. The [`ChannelTable`] owns the two aggregates that span several
//! voices at once: the rhythm key bitmask and the nibble-paired percussion
//! volume registers.

use std::ops::{Index, IndexMut};

use crate::instrument::{Instrument, DEFAULT_INSTRUMENT};
use crate::registers::{self, RhythmCtl};

/// Channels available when every voice plays a melodic instrument.
pub const MELODIC_CHANNELS: usize = 9;

/// Melodic channels available when rhythm mode is enabled.
pub const SPLIT_MELODIC_CHANNELS: usize = 6;

/// Fixed-function percussion channels in rhythm mode.
pub const PERCUSSION_CHANNELS: usize = 5;

/// First percussion channel index in rhythm mode.
pub const PERC_CHAN_BASE: usize = SPLIT_MELODIC_CHANNELS;

/// Worst-case number of channel slots.
pub const MAX_CHANNELS: usize = SPLIT_MELODIC_CHANNELS + PERCUSSION_CHANNELS;

/// Hi-hat channel number in rhythm mode.
pub const CH_HI_HAT: u8 = PERC_CHAN_BASE as u8;
/// Top cymbal channel number in rhythm mode.
pub const CH_TOP_CYMBAL: u8 = PERC_CHAN_BASE as u8 + 1;
/// Tom-tom channel number in rhythm mode.
pub const CH_TOM_TOM: u8 = PERC_CHAN_BASE as u8 + 2;
/// Snare drum channel number in rhythm mode.
pub const CH_SNARE_DRUM: u8 = PERC_CHAN_BASE as u8 + 3;
/// Bass drum channel number in rhythm mode.
pub const CH_BASS_DRUM: u8 = PERC_CHAN_BASE as u8 + 4;

/// Note playing lifecycle of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Doing nothing, waiting for a note on.
    #[default]
    Idle,
    /// Playing a note; the duration timer runs while here.
    Sustain,
}

/// Real-time tracking record for one voice.
#[derive(Debug, Clone, Copy)]
pub struct ChannelData {
    /// Instrument assigned to this channel.
    pub instrument: Instrument,
    /// True if the release phase is standardized for this channel.
    pub sustain: bool,
    /// Volume set point, application scale 0-15.
    pub vol: u8,
    /// Raw frequency being played, 0 if the note was not set that way.
    pub frequency: u16,
    /// Octave block for the current note.
    pub block: u8,
    /// F-Number for the current note.
    pub fnum: u16,
    /// Total requested playing duration in ms, 0 for indefinite.
    pub duration: u16,
    /// Current note playing state.
    pub state: ChannelState,
    /// Clock reading when the current note started.
    pub time_base: u32,
}

impl Default for ChannelData {
    fn default() -> Self {
        ChannelData {
            instrument: DEFAULT_INSTRUMENT,
            sustain: false,
            vol: registers::VOL_MAX,
            frequency: 0,
            block: 0,
            fnum: 0,
            duration: 0,
            state: ChannelState::Idle,
            time_base: 0,
        }
    }
}

/// Channel table owning the shared percussion aggregates.
///
/// The rhythm key bitmask and the paired volume registers span several
/// logically independent voices, so their read-modify-write logic lives
/// here rather than in per-channel code.
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    slots: [ChannelData; MAX_CHANNELS],
}

impl ChannelTable {
    /// Create a table with all channels idle on the default instrument.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the five-voice key bitmask from live channel state.
    ///
    /// Bit i is set when percussion channel `PERC_CHAN_BASE + i` is not
    /// idle. The caller overlays the bit of the voice being keyed.
    pub fn rhythm_keys(&self) -> RhythmCtl {
        let mut keys = RhythmCtl::empty();

        for i in 0..PERCUSSION_CHANNELS {
            if self.slots[PERC_CHAN_BASE + i].state != ChannelState::Idle {
                keys |= RhythmCtl::from_bits_truncate(1 << i);
            }
        }

        keys
    }

    /// Register write needed to apply a percussion voice's volume.
    ///
    /// The percussion volume registers pack two voices per byte, so the
    /// paired voice's stored volume is re-encoded alongside the one that
    /// changed. `None` for melodic instruments.
    pub fn perc_volume_write(&self, instrument: Instrument) -> Option<(u8, u8)> {
        match instrument {
            Instrument::BassDrum => Some((
                registers::R_PERC_VOL_BD,
                registers::attenuation(self.vol_of(CH_BASS_DRUM)),
            )),
            Instrument::HiHat | Instrument::SnareDrum => Some((
                registers::R_PERC_VOL_HH_SD,
                registers::perc_vol_pair(self.vol_of(CH_HI_HAT), self.vol_of(CH_SNARE_DRUM)),
            )),
            Instrument::TomTom | Instrument::TopCymbal => Some((
                registers::R_PERC_VOL_TOM_TCY,
                registers::perc_vol_pair(self.vol_of(CH_TOM_TOM), self.vol_of(CH_TOP_CYMBAL)),
            )),
            _ => None,
        }
    }

    fn vol_of(&self, chan: u8) -> u8 {
        self.slots[chan as usize].vol
    }
}

impl Index<usize> for ChannelTable {
    type Output = ChannelData;

    fn index(&self, chan: usize) -> &ChannelData {
        &self.slots[chan]
    }
}

impl IndexMut<usize> for ChannelTable {
    fn index_mut(&mut self, chan: usize) -> &mut ChannelData {
        &mut self.slots[chan]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_state() {
        let table = ChannelTable::new();
        assert_eq!(table[0].instrument, Instrument::Piano);
        assert_eq!(table[0].vol, registers::VOL_MAX);
        assert_eq!(table[0].state, ChannelState::Idle);
    }

    #[test]
    fn test_rhythm_keys_follow_channel_state() {
        let mut table = ChannelTable::new();
        assert_eq!(table.rhythm_keys(), RhythmCtl::empty());

        table[CH_BASS_DRUM as usize].state = ChannelState::Sustain;
        table[CH_HI_HAT as usize].state = ChannelState::Sustain;
        assert_eq!(
            table.rhythm_keys(),
            RhythmCtl::BASS_DRUM | RhythmCtl::HI_HAT
        );

        table[CH_BASS_DRUM as usize].state = ChannelState::Idle;
        assert_eq!(table.rhythm_keys(), RhythmCtl::HI_HAT);
    }

    #[test]
    fn test_rhythm_keys_ignore_melodic_channels() {
        let mut table = ChannelTable::new();
        table[0].state = ChannelState::Sustain;
        table[5].state = ChannelState::Sustain;
        assert_eq!(table.rhythm_keys(), RhythmCtl::empty());
    }

    #[test]
    fn test_perc_volume_pairing() {
        let mut table = ChannelTable::new();
        table[CH_HI_HAT as usize].vol = 10;
        table[CH_SNARE_DRUM as usize].vol = 3;

        // both nibbles encoded together regardless of which voice changed
        let expected = Some((registers::R_PERC_VOL_HH_SD, 0x5C));
        assert_eq!(table.perc_volume_write(Instrument::HiHat), expected);
        assert_eq!(table.perc_volume_write(Instrument::SnareDrum), expected);
    }

    #[test]
    fn test_perc_volume_bass_drum_alone() {
        let mut table = ChannelTable::new();
        table[CH_BASS_DRUM as usize].vol = 11;
        assert_eq!(
            table.perc_volume_write(Instrument::BassDrum),
            Some((registers::R_PERC_VOL_BD, 4))
        );
    }

    #[test]
    fn test_perc_volume_none_for_melodic() {
        let table = ChannelTable::new();
        assert_eq!(table.perc_volume_write(Instrument::Organ), None);
    }
}
