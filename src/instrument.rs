//! Instrument identifiers and custom instrument data conversion.

use num_derive::FromPrimitive;

use crate::registers::RhythmCtl;

/// Bytes in a native OPLL custom instrument definition (registers 0x00-0x07).
pub const OPLL_DATA_SIZE: usize = 8;

/// Bytes in an OPL2 style instrument definition.
pub const OPL2_DATA_SIZE: usize = 12;

/// Default instrument installed at initialization and when rhythm mode is
/// disabled.
pub const DEFAULT_INSTRUMENT: Instrument = Instrument::Piano;

/// Instruments selectable per channel.
///
/// Melodic values 0-15 match the instrument id field of the channel control
/// register: one user-definable slot ([`Instrument::Custom`]) plus fifteen
/// read-only chip presets. The percussion roles live in a separate
/// namespace offset by 16 so their low bits index directly into the rhythm
/// control register key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Instrument {
    /// User-definable instrument slot, see
    /// [`load_custom_instrument`](crate::Ym2413::load_custom_instrument).
    Custom = 0,
    /// Violin preset.
    Violin = 1,
    /// Guitar preset.
    Guitar = 2,
    /// Piano preset.
    Piano = 3,
    /// Flute preset.
    Flute = 4,
    /// Clarinet preset.
    Clarinet = 5,
    /// Oboe preset.
    Oboe = 6,
    /// Trumpet preset.
    Trumpet = 7,
    /// Organ preset.
    Organ = 8,
    /// Horn preset.
    Horn = 9,
    /// Synthesizer preset.
    Synth = 10,
    /// Harpsichord preset.
    Harpsichord = 11,
    /// Vibraphone preset.
    Vibraphone = 12,
    /// Synthesizer bass preset.
    SynthBass = 13,
    /// Acoustic bass preset.
    AcousticBass = 14,
    /// Electric guitar preset.
    ElectricGuitar = 15,
    /// Hi-hat percussion voice.
    HiHat = 16,
    /// Top cymbal percussion voice.
    TopCymbal = 17,
    /// Tom-tom percussion voice.
    TomTom = 18,
    /// Snare drum percussion voice.
    SnareDrum = 19,
    /// Bass drum percussion voice.
    BassDrum = 20,
}

impl Instrument {
    /// True for the five fixed percussion roles.
    pub fn is_percussion(self) -> bool {
        self as u8 >= Instrument::HiHat as u8
    }

    /// Hardware instrument id nibble for the channel control register.
    pub(crate) fn id(self) -> u8 {
        self as u8 & 0x0F
    }

    /// Key bit of this voice in the rhythm control register. `None` for
    /// melodic instruments.
    pub fn rhythm_bit(self) -> Option<RhythmCtl> {
        if self.is_percussion() {
            RhythmCtl::from_bits(1 << (self as u8 - Instrument::HiHat as u8))
        } else {
            None
        }
    }
}

/// Translate an OPL2 style instrument definition into the eight OPLL custom
/// instrument registers (0x00-0x07).
///
/// OPL2 definitions, as published instrument libraries lay them out:
///
/// ```text
/// [0] modulator AM/VIB/EG/KSR/MULT    [5] carrier AM/VIB/EG/KSR/MULT
/// [1] modulator KSL + total level     [6] carrier KSL (total level unused)
/// [2] modulator attack/decay          [7] carrier attack/decay
/// [3] modulator sustain/release       [8] carrier sustain/release
/// [4] modulator waveform              [9] carrier waveform
/// [10] feedback/connection            [11] padding
/// ```
///
/// The OPLL only distinguishes full and half sine waves, so any non-zero
/// OPL2 waveform selects the half sine for that operator.
pub fn opll_from_opl2(data: &[u8; OPL2_DATA_SIZE]) -> [u8; OPLL_DATA_SIZE] {
    let mod_wave = u8::from(data[4] & 0x07 != 0);
    let car_wave = u8::from(data[9] & 0x07 != 0);

    [
        data[0],
        data[5],
        data[1],
        (data[6] & 0xC0) | (car_wave << 4) | (mod_wave << 3) | (data[10] & 0x07),
        data[2],
        data[7],
        data[3],
        data[8],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_percussion_predicate() {
        assert!(!Instrument::Custom.is_percussion());
        assert!(!Instrument::ElectricGuitar.is_percussion());
        assert!(Instrument::HiHat.is_percussion());
        assert!(Instrument::BassDrum.is_percussion());
    }

    #[test]
    fn test_rhythm_bit_mapping() {
        assert_eq!(Instrument::HiHat.rhythm_bit(), Some(RhythmCtl::HI_HAT));
        assert_eq!(
            Instrument::TopCymbal.rhythm_bit(),
            Some(RhythmCtl::TOP_CYMBAL)
        );
        assert_eq!(Instrument::TomTom.rhythm_bit(), Some(RhythmCtl::TOM_TOM));
        assert_eq!(
            Instrument::SnareDrum.rhythm_bit(),
            Some(RhythmCtl::SNARE_DRUM)
        );
        assert_eq!(Instrument::BassDrum.rhythm_bit(), Some(RhythmCtl::BASS_DRUM));
        assert_eq!(Instrument::Piano.rhythm_bit(), None);
    }

    #[test]
    fn test_from_primitive_roundtrip() {
        assert_eq!(Instrument::from_u8(3), Some(Instrument::Piano));
        assert_eq!(Instrument::from_u8(20), Some(Instrument::BassDrum));
        assert_eq!(Instrument::from_u8(21), None);
        assert_eq!(Instrument::from_u8(0xFF), None);
    }

    #[test]
    fn test_melodic_id_nibble() {
        assert_eq!(Instrument::Custom.id(), 0);
        assert_eq!(Instrument::Piano.id(), 3);
        assert_eq!(Instrument::ElectricGuitar.id(), 15);
    }

    #[test]
    fn test_opl2_translation_packing() {
        let opl2: [u8; OPL2_DATA_SIZE] = [
            0x21, // mod AM/VIB/EG/KSR/MULT
            0x8F, // mod KSL/TL
            0xF1, // mod AR/DR
            0x7E, // mod SL/RR
            0x00, // mod waveform: full sine
            0x21, // car AM/VIB/EG/KSR/MULT
            0x40, // car KSL
            0xF2, // car AR/DR
            0x17, // car SL/RR
            0x01, // car waveform: non-sine -> half sine bit
            0x05, // feedback
            0x00, // padding
        ];

        let opll = opll_from_opl2(&opl2);
        assert_eq!(opll[0], 0x21);
        assert_eq!(opll[1], 0x21);
        assert_eq!(opll[2], 0x8F);
        // carrier KSL (0x40) | carrier wave bit (0x10) | feedback (0x05)
        assert_eq!(opll[3], 0x55);
        assert_eq!(opll[4], 0xF1);
        assert_eq!(opll[5], 0xF2);
        assert_eq!(opll[6], 0x7E);
        assert_eq!(opll[7], 0x17);
    }

    #[test]
    fn test_opl2_translation_modulator_wave() {
        let mut opl2 = [0u8; OPL2_DATA_SIZE];
        opl2[4] = 0x02; // modulator non-sine waveform
        let opll = opll_from_opl2(&opl2);
        assert_eq!(opll[3], 0x08);
    }
}
