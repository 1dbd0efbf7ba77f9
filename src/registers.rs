//! Register map and payload builders.
//!
//! Addresses and bit layouts here are the hardware contract and must match
//! the datasheet exactly. The builders produce the bit-packed bytes for the
//! note-control, rhythm-control and channel-control registers from logical
//! channel state.

use bitflags::bitflags;

/// First custom instrument register; the definition occupies 0x00-0x07.
pub const R_CUSTOM_BASE: u8 = 0x00;

/// Rhythm control register.
pub const R_RHYTHM_CTL: u8 = 0x0E;

/// Test mode register. Always written zero.
pub const R_TEST_CTL: u8 = 0x0F;

/// F-Number bits 0-7, one register per channel (0x10 + channel).
pub const R_FNUM_BASE: u8 = 0x10;

/// Note control base (0x20 + channel): sustain, key, block, F-Number MSB.
pub const R_NOTE_CTL_BASE: u8 = 0x20;

/// Channel control base (0x30 + channel): instrument id and attenuation.
pub const R_CHAN_CTL_BASE: u8 = 0x30;

/// Bass drum volume register (low nibble).
pub const R_PERC_VOL_BD: u8 = 0x36;

/// Hi-hat (high nibble) / snare drum (low nibble) volume register.
pub const R_PERC_VOL_HH_SD: u8 = 0x37;

/// Tom-tom (high nibble) / top cymbal (low nibble) volume register.
pub const R_PERC_VOL_TOM_TCY: u8 = 0x38;

/// Volume off, application scale.
pub const VOL_OFF: u8 = 0x0;

/// Maximum volume, application scale.
pub const VOL_MAX: u8 = 0xF;

bitflags! {
    /// Rhythm control register (0x0E) layout.
    ///
    /// Bits 0-4 form the shared key bitmask of the five percussion voices.
    /// The hardware has no per-voice key register, so every percussion key
    /// transition must resend the full mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RhythmCtl: u8 {
        /// Hi-hat key.
        const HI_HAT = 1 << 0;
        /// Top cymbal key.
        const TOP_CYMBAL = 1 << 1;
        /// Tom-tom key.
        const TOM_TOM = 1 << 2;
        /// Snare drum key.
        const SNARE_DRUM = 1 << 3;
        /// Bass drum key.
        const BASS_DRUM = 1 << 4;
        /// Rhythm (percussion) mode enable.
        const ENABLE = 1 << 5;
    }
}

/// Map an application volume [0..15] to the hardware attenuation nibble.
///
/// Application scale is 0 = silent, 15 = loudest; the attenuator is the
/// complement of that.
pub fn attenuation(vol: u8) -> u8 {
    VOL_MAX - vol.min(VOL_MAX)
}

/// Build a note control byte (registers 0x20-0x28).
///
/// Bit 5 sustain, bit 4 key on, bits 1-3 block, bit 0 F-Number bit 8.
pub fn note_ctl(sustain: bool, key_on: bool, block: u8, fnum: u16) -> u8 {
    let mut b = 0;

    if sustain {
        b |= 1 << 5;
    }
    if key_on {
        b |= 1 << 4;
    }
    b |= (block & 0x07) << 1;
    if fnum & 0x100 != 0 {
        b |= 1;
    }

    b
}

/// Build a channel control byte (registers 0x30-0x35): instrument id in the
/// high nibble, attenuation in the low nibble.
pub fn chan_ctl(instrument_id: u8, vol: u8) -> u8 {
    (instrument_id & 0x0F) << 4 | attenuation(vol)
}

/// Pack two application volumes into a shared percussion volume register,
/// high nibble first.
pub fn perc_vol_pair(high_vol: u8, low_vol: u8) -> u8 {
    attenuation(high_vol) << 4 | attenuation(low_vol)
}
