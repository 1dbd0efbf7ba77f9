//! YM2413 (OPLL) FM Sound Generator Driver
//!
//! A note-oriented driver for the Yamaha YM2413, the cost-reduced FM
//! synthesis chip derived from the YM3812 (OPL2). The chip plays 9 melodic
//! channels, or 6 melodic channels plus 5 fixed percussion voices when
//! rhythm mode is enabled, all programmed through a write-only parallel
//! 8 bit register bus.
//!
//! The driver exposes instruments, notes, volumes and percussion mode on
//! top of that bus and keeps a per-voice state table so it can rebuild the
//! shared register contents the hardware offers no way to read back
//! (the rhythm key bitmask and the nibble-paired percussion volumes).
//!
//! # Capabilities
//! - Note on/off by raw frequency or by (octave, note) pair
//! - 15 preset melodic instruments plus one user-definable slot
//! - OPL2-style custom instrument translation
//! - Rhythm mode with the five fixed percussion voices
//! - Timed notes with caller-polled automatic note-off
//! - Raw register escape hatch for register-dump playback
//!
//! # Bus and clock injection
//! Hardware access goes through the [`Bus`] trait and note timing through
//! the [`Clock`] trait, so the driver runs unchanged against real GPIO, a
//! memory-mapped port, or the [`Recorder`] simulation.
//!
//! # Quick start
//! ```
//! use ym2413::{Instrument, Recorder, Ym2413};
//!
//! let mut synth = Ym2413::new(Recorder::default());
//! synth.begin();
//!
//! synth.set_instrument(0, Instrument::Organ, 12).unwrap();
//! synth.note_on_pitch(0, 4, 9, 15, 0); // A4
//! synth.note_off(0);
//! ```
//!
//! Timed notes need the host to poll [`Ym2413::tick`]; if it never polls,
//! they never turn off.

#![warn(missing_docs)]

pub mod bus;
pub mod channel_state;
pub mod chip;
pub mod clock;
pub mod freq;
pub mod instrument;
pub mod registers;

/// Error type for driver operations.
///
/// Only genuinely invalid requests error; clampable inputs (volume, octave,
/// note index) are clamped instead. The bus is fire-and-forget, so there is
/// no hardware failure to report.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ym2413Error {
    /// Channel index outside the range valid for the current mode.
    #[error("channel {0} out of range for the current mode")]
    ChannelOutOfRange(u8),

    /// Instrument cannot be assigned in the current mode / channel class.
    #[error("instrument {0:?} not available on this channel in the current mode")]
    InstrumentNotAvailable(Instrument),
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, Ym2413Error>;

// Public API exports
pub use bus::{Bus, Port, Recorder};
pub use channel_state::{ChannelState, ChannelTable};
pub use chip::Ym2413;
pub use clock::{Clock, ManualClock, WallClock};
pub use instrument::Instrument;
pub use registers::RhythmCtl;
