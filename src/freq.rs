//! Pitch to hardware frequency code mapping.
//!
//! The chip describes a pitch as an octave "block" (0-7) plus a 9 bit
//! F-Number. This module converts either a raw frequency in Hz or an
//! (octave, note) pair into that form, using the formulas and tables from
//! the YM2413 application manual.

/// Nominal master oscillator frequency in Hz (3.579545 MHz).
pub const CLOCK_HZ: u32 = 3_579_545;

/// Smallest playable octave in the note-number API.
pub const MIN_OCTAVE: u8 = 1;

/// Largest playable octave in the note-number API.
pub const MAX_OCTAVE: u8 = 8;

/// Chromatic notes per octave covered by the F-Number table.
pub const NOTES_PER_OCTAVE: u8 = 12;

// Upper boundary frequency in Hz for each block 0 through 7. Each entry is
// the first C of the next block; anything at or above the highest boundary
// lands in block 7.
const BLOCK_TABLE: [u16; 8] = [0, 65, 130, 261, 523, 1046, 2093, 4186];

// Base F-Number at block 0 for the 12 chromatic notes C, C# .. A#, B.
const FNUM_TABLE: [u16; 12] = [
    172, 183, 194, 205, 217, 230, 244, 258, 274, 290, 307, 326,
];

/// Find the block a raw frequency belongs to.
///
/// Returns the index of the first boundary strictly greater than `freq`,
/// or 7 when the frequency is above the highest band. Total function, no
/// failure mode.
pub fn block_for_frequency(freq: u16) -> u8 {
    for (i, &bound) in BLOCK_TABLE.iter().enumerate() {
        if freq < bound {
            return i as u8;
        }
    }
    (BLOCK_TABLE.len() - 1) as u8
}

/// F-Number for a raw frequency in the given block.
///
/// Application manual formula: `FNum = freq * 2^(19-block) / fsam` with
/// `fsam = CLOCK_HZ / 72`. Truncating integer arithmetic throughout. The
/// result is logically a 9 bit quantity; callers mask it when packing
/// registers.
pub fn fnum_for_frequency(freq: u16, block: u8) -> u16 {
    let fsam = u64::from(CLOCK_HZ / 72);
    (u64::from(freq) * (1u64 << (19 - u32::from(block.min(7)))) / fsam) as u16
}

/// Base F-Number for a chromatic note number 0..11 (C..B).
///
/// The note index is clamped to the table before lookup.
pub fn fnum_for_note(note: u8) -> u16 {
    FNUM_TABLE[usize::from(note).min(FNUM_TABLE.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_band_edges() {
        // index of the first boundary strictly greater than the frequency
        assert_eq!(block_for_frequency(0), 1);
        assert_eq!(block_for_frequency(64), 1);
        assert_eq!(block_for_frequency(65), 2);
        assert_eq!(block_for_frequency(129), 2);
        assert_eq!(block_for_frequency(130), 3);
        assert_eq!(block_for_frequency(440), 4);
        assert_eq!(block_for_frequency(2092), 6);
        assert_eq!(block_for_frequency(2093), 7);
    }

    #[test]
    fn test_block_above_highest_band() {
        assert_eq!(block_for_frequency(4186), 7);
        assert_eq!(block_for_frequency(5000), 7);
        assert_eq!(block_for_frequency(u16::MAX), 7);
    }

    #[test]
    fn test_fnum_formula_a440() {
        // fsam = 3579545 / 72 = 49715 (truncated)
        // 440 * 2^15 / 49715 = 14417920 / 49715 = 290 (truncated)
        let block = block_for_frequency(440);
        assert_eq!(block, 4);
        assert_eq!(fnum_for_frequency(440, block), 290);
    }

    #[test]
    fn test_fnum_truncates_not_rounds() {
        // 261 * 2^16 / 49715 = 17104896 / 49715 = 344.05.. -> 344
        assert_eq!(fnum_for_frequency(261, 3), 344);
    }

    #[test]
    fn test_fnum_table_lookup() {
        assert_eq!(fnum_for_note(0), 172); // C
        assert_eq!(fnum_for_note(9), 290); // A
        assert_eq!(fnum_for_note(11), 326); // B
    }

    #[test]
    fn test_fnum_note_index_clamped() {
        assert_eq!(fnum_for_note(12), 326);
        assert_eq!(fnum_for_note(200), 326);
    }

    #[test]
    fn test_fnum_block_clamped() {
        // out-of-range block is treated as 7
        assert_eq!(fnum_for_frequency(4186, 9), fnum_for_frequency(4186, 7));
    }
}
