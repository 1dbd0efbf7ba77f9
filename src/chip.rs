//! Device facade: the note-oriented public API.
//!
//! [`Ym2413`] orchestrates the frequency mapper, the register builders and
//! the channel table, and decides between melodic-channel and
//! percussion-channel addressing for every operation. All hardware access
//! goes through the injected [`Bus`]; note-off timing comes from the
//! injected [`Clock`].

use log::{debug, trace};
use num_traits::FromPrimitive;

use crate::bus::{Bus, Port};
use crate::channel_state::{
    ChannelState, ChannelTable, MAX_CHANNELS, MELODIC_CHANNELS, PERCUSSION_CHANNELS,
    PERC_CHAN_BASE, SPLIT_MELODIC_CHANNELS,
};
use crate::clock::{Clock, WallClock};
use crate::freq;
use crate::instrument::{
    opll_from_opl2, Instrument, DEFAULT_INSTRUMENT, OPL2_DATA_SIZE, OPLL_DATA_SIZE,
};
use crate::registers::{self, RhythmCtl};
use crate::{Result, Ym2413Error};

// Fixed register setup required when rhythm mode is switched on, from the
// application manual section III-1-7.
const RHYTHM_SETUP: [(u8, u8); 6] = [
    (0x16, 0x20),
    (0x17, 0x50),
    (0x18, 0xC0),
    (0x26, 0x07),
    (0x27, 0x05),
    (0x28, 0x01),
];

/// YM2413 driver.
///
/// Generic over the bus transport and the millisecond time source. The
/// driver is single-owner and fully synchronous: every method returns after
/// its register writes complete, and timed note-off only happens when the
/// host polls [`tick`](Self::tick).
pub struct Ym2413<B, C = WallClock> {
    port: Port<B>,
    clock: C,
    channels: ChannelTable,
    percussion: bool,
}

impl<B: Bus> Ym2413<B> {
    /// Create a driver over the given bus, timing notes against wall time.
    pub fn new(bus: B) -> Self {
        Self::with_clock(bus, WallClock::new())
    }
}

impl<B: Bus, C: Clock> Ym2413<B, C> {
    /// Create a driver with an explicit time source.
    pub fn with_clock(bus: B, clock: C) -> Self {
        Ym2413 {
            port: Port::new(bus),
            clock,
            channels: ChannelTable::new(),
            percussion: false,
        }
    }

    /// Initialize the device.
    ///
    /// Clears test mode, disables rhythm mode and installs the default
    /// instrument at maximum volume on every channel. Call once before any
    /// other operation.
    pub fn begin(&mut self) {
        self.port.write(registers::R_TEST_CTL, 0);
        self.set_percussion_mode(false);
    }

    /// Number of channels in the current mode: 9 all-melodic, or 11 when
    /// rhythm mode splits them into 6 melodic + 5 percussion.
    pub fn count_channels(&self) -> u8 {
        if self.percussion {
            MAX_CHANNELS as u8
        } else {
            MELODIC_CHANNELS as u8
        }
    }

    /// True when rhythm (percussion) mode is enabled.
    pub fn is_percussion_mode(&self) -> bool {
        self.percussion
    }

    /// True when the channel is allocated to a percussion voice in the
    /// current mode.
    pub fn is_percussion_channel(&self, chan: u8) -> bool {
        self.percussion && chan >= PERC_CHAN_BASE as u8 && chan < self.count_channels()
    }

    /// Enable or disable rhythm mode.
    ///
    /// Enabling assigns the five fixed percussion roles to channels 6-10 at
    /// maximum volume and applies the chip's rhythm setup sequence.
    /// Disabling reinstalls the default instrument on all channels and
    /// idles them. Either way the mode bit is pushed to hardware.
    pub fn set_percussion_mode(&mut self, enable: bool) {
        debug!("rhythm mode {}", if enable { "on" } else { "off" });
        self.percussion = enable;

        let ctl = if enable {
            RhythmCtl::ENABLE
        } else {
            RhythmCtl::empty()
        };
        self.port.write(registers::R_RHYTHM_CTL, ctl.bits());

        if enable {
            for i in 0..PERCUSSION_CHANNELS as u8 {
                if let Some(role) = Instrument::from_u8(Instrument::HiHat as u8 + i) {
                    let _ = self.set_instrument(PERC_CHAN_BASE as u8 + i, role, registers::VOL_MAX);
                }
            }

            for (addr, data) in RHYTHM_SETUP {
                self.port.write(addr, data);
            }
        } else {
            self.init_channels();
        }
    }

    fn init_channels(&mut self) {
        for chan in 0..self.count_channels() {
            let _ = self.set_instrument(chan, DEFAULT_INSTRUMENT, registers::VOL_MAX);
            self.channels[chan as usize].state = ChannelState::Idle;
        }
    }

    /// Load a native OPLL custom instrument definition into registers
    /// 0x00-0x07. The data is written through unmodified.
    pub fn load_custom_instrument(&mut self, data: &[u8; OPLL_DATA_SIZE]) {
        for (i, b) in data.iter().enumerate() {
            self.port.write(registers::R_CUSTOM_BASE + i as u8, *b);
        }
    }

    /// Load an OPL2 style instrument definition, translating it to the
    /// OPLL custom instrument format first.
    pub fn load_custom_instrument_opl2(&mut self, data: &[u8; OPL2_DATA_SIZE]) {
        self.load_custom_instrument(&opll_from_opl2(data));
    }

    /// Standardize the release phase for the channel's instrument. The flag
    /// is folded into every subsequent note control write.
    pub fn set_sustain(&mut self, chan: u8, sustain: bool) {
        if chan < self.count_channels() {
            self.channels[chan as usize].sustain = sustain;
        }
    }

    /// True when the channel is not currently playing a note. Out-of-range
    /// channels report false.
    pub fn is_idle(&self, chan: u8) -> bool {
        chan < self.count_channels() && self.channels[chan as usize].state == ChannelState::Idle
    }

    /// Write a byte directly to a device register.
    ///
    /// Bypasses all channel bookkeeping; intended for register-dump style
    /// playback (e.g. VGM streams). Still goes through the coalescing port.
    pub fn write_raw(&mut self, addr: u8, data: u8) {
        self.port.write(addr, data);
    }

    /// Attach an instrument to a channel and set its volume.
    ///
    /// Fails without touching hardware or state when the channel is out of
    /// range for the current mode, when a percussion voice is requested
    /// outside rhythm mode, or when a melodic instrument is requested on a
    /// fixed percussion channel.
    pub fn set_instrument(&mut self, chan: u8, instrument: Instrument, vol: u8) -> Result<()> {
        if chan >= self.count_channels() {
            return Err(Ym2413Error::ChannelOutOfRange(chan));
        }
        if instrument.is_percussion() && !self.percussion {
            return Err(Ym2413Error::InstrumentNotAvailable(instrument));
        }
        if self.is_percussion_channel(chan) && !instrument.is_percussion() {
            return Err(Ym2413Error::InstrumentNotAvailable(instrument));
        }

        let vol = vol.min(registers::VOL_MAX);
        let slot = &mut self.channels[chan as usize];
        slot.instrument = instrument;
        slot.vol = vol;

        // Percussion channels have no channel control register; their
        // instrument assignment is implicit in the rhythm mode split.
        if !self.percussion || (chan as usize) < SPLIT_MELODIC_CHANNELS {
            self.port.write(
                registers::R_CHAN_CTL_BASE + chan,
                registers::chan_ctl(instrument.id(), vol),
            );
        }

        Ok(())
    }

    /// Instrument currently attached to the channel, `None` when the
    /// channel is out of range.
    pub fn get_instrument(&self, chan: u8) -> Option<Instrument> {
        (chan < self.count_channels()).then(|| self.channels[chan as usize].instrument)
    }

    /// Current volume set point of the channel, 0 when out of range.
    pub fn get_volume(&self, chan: u8) -> u8 {
        if chan < self.count_channels() {
            self.channels[chan as usize].vol
        } else {
            0
        }
    }

    /// Set the channel volume, application scale 0-15 (clamped).
    ///
    /// Melodic channels rewrite their channel control register. Percussion
    /// channels rewrite the shared nibble-paired volume register for their
    /// voice, re-encoding the paired voice's stored volume alongside.
    pub fn set_volume(&mut self, chan: u8, vol: u8) {
        if chan >= self.count_channels() {
            return;
        }

        let vol = vol.min(registers::VOL_MAX);
        self.channels[chan as usize].vol = vol;

        if !self.percussion || (chan as usize) < PERC_CHAN_BASE {
            let instrument = self.channels[chan as usize].instrument;
            self.port.write(
                registers::R_CHAN_CTL_BASE + chan,
                registers::chan_ctl(instrument.id(), vol),
            );
        } else if let Some((addr, data)) = self
            .channels
            .perc_volume_write(self.channels[chan as usize].instrument)
        {
            self.port.write(addr, data);
        }
    }

    /// Set the same volume on every channel.
    pub fn set_all_volumes(&mut self, vol: u8) {
        for chan in 0..self.count_channels() {
            self.set_volume(chan, vol);
        }
    }

    /// Play a note given as a raw frequency in Hz.
    ///
    /// A non-zero `duration_ms` arms the automatic note-off timer serviced
    /// by [`tick`](Self::tick); zero sustains the note until an explicit
    /// [`note_off`](Self::note_off).
    pub fn note_on_frequency(&mut self, chan: u8, freq: u16, vol: u8, duration_ms: u16) {
        trace!("note on: chan {chan} freq {freq}Hz");

        if chan >= self.count_channels() {
            return;
        }

        self.set_volume(chan, vol);
        if !self.is_percussion_channel(chan) {
            let block = freq::block_for_frequency(freq);
            let fnum = freq::fnum_for_frequency(freq, block);
            trace!(" -> block {block} fnum {fnum}");
            self.key_on_melodic(chan, block, fnum);
        } else {
            self.key_percussion(chan, true);
        }

        self.start_note(chan, freq, duration_ms);
    }

    /// Play a note given as (octave, note-within-octave).
    ///
    /// Middle C is the first note of octave 4. Notes C, C#, .. A#, B are
    /// numbered 0-11; indices beyond that are rejected. The octave is
    /// clamped to [[`MIN_OCTAVE`](freq::MIN_OCTAVE),
    /// [`MAX_OCTAVE`](freq::MAX_OCTAVE)]. Duration semantics match
    /// [`note_on_frequency`](Self::note_on_frequency).
    pub fn note_on_pitch(&mut self, chan: u8, octave: u8, note: u8, vol: u8, duration_ms: u16) {
        trace!("note on: chan {chan} octave {octave} note {note}");

        if note >= freq::NOTES_PER_OCTAVE || chan >= self.count_channels() {
            return;
        }

        if !self.is_percussion_channel(chan) {
            let block = octave.clamp(freq::MIN_OCTAVE, freq::MAX_OCTAVE);
            let fnum = freq::fnum_for_note(note);
            self.key_on_melodic(chan, block, fnum);
        } else {
            self.key_percussion(chan, true);
        }

        self.set_volume(chan, vol);
        self.start_note(chan, 0, duration_ms);
    }

    /// Stop the note playing on the channel.
    ///
    /// Forces the volume to silence and writes the key-off register state.
    /// Idempotent: calling it on an idle channel just resends silence.
    pub fn note_off(&mut self, chan: u8) {
        trace!("note off: chan {chan}");

        if chan >= self.count_channels() {
            return;
        }

        self.set_volume(chan, registers::VOL_OFF);
        if !self.is_percussion_channel(chan) {
            let slot = self.channels[chan as usize];
            let ctl = registers::note_ctl(slot.sustain, false, slot.block, slot.fnum);
            self.port.write(registers::R_NOTE_CTL_BASE + chan, ctl);
        } else {
            self.key_percussion(chan, false);
        }

        self.channels[chan as usize].state = ChannelState::Idle;
    }

    /// Service automatic note-off timing.
    ///
    /// Expires every sustaining channel whose non-zero duration has
    /// elapsed. Call this regularly from the host loop; timed notes only
    /// ever turn off from here.
    pub fn tick(&mut self) {
        let now = self.clock.millis();

        for chan in 0..self.count_channels() {
            let slot = self.channels[chan as usize];
            if slot.state == ChannelState::Sustain
                && slot.duration != 0
                && now.wrapping_sub(slot.time_base) >= u32::from(slot.duration)
            {
                self.note_off(chan);
            }
        }
    }

    /// Borrow the underlying bus transport.
    pub fn bus(&self) -> &B {
        self.port.bus()
    }

    /// Consume the driver and return the bus transport.
    pub fn into_bus(self) -> B {
        self.port.into_bus()
    }

    fn key_on_melodic(&mut self, chan: u8, block: u8, fnum: u16) {
        let slot = &mut self.channels[chan as usize];
        slot.block = block;
        slot.fnum = fnum;
        let ctl = registers::note_ctl(slot.sustain, true, block, fnum);

        // F-Number low byte first, then the key-on
        self.port.write(registers::R_FNUM_BASE + chan, (fnum & 0xFF) as u8);
        self.port.write(registers::R_NOTE_CTL_BASE + chan, ctl);
    }

    fn key_percussion(&mut self, chan: u8, key_on: bool) {
        // The rhythm register keys all five voices at once, so rebuild the
        // mask from live channel state and overlay this voice's bit.
        let instrument = self.channels[chan as usize].instrument;
        let mut ctl = self.channels.rhythm_keys() | RhythmCtl::ENABLE;
        if let Some(bit) = instrument.rhythm_bit() {
            ctl.set(bit, key_on);
        }

        self.port.write(registers::R_RHYTHM_CTL, ctl.bits());
    }

    fn start_note(&mut self, chan: u8, freq: u16, duration_ms: u16) {
        let slot = &mut self.channels[chan as usize];
        slot.frequency = freq;
        slot.duration = duration_ms;
        slot.time_base = self.clock.millis();
        slot.state = ChannelState::Sustain;
    }
}
