//! Parallel bus transport abstraction for the YM2413.
//!
//! The chip has an 8 bit write-only data bus with a single A0 line that
//! selects between two internal latches: the register address and the
//! register content. Every logical register write is therefore a two-phase
//! transaction, and each phase must hold the /WE strobe low long enough for
//! the chip to latch the lines.
//!
//! The [`Bus`] trait captures exactly that contract so the driver core can
//! run against real GPIO, a memory-mapped port, or the [`Recorder`]
//! simulation used in tests.

use log::trace;

/// Minimum /WE low time for the address phase.
///
/// 12 master clock cycles, roughly 4 microseconds at the nominal 3.58 MHz
/// oscillator.
pub const ADDRESS_HOLD_US: u32 = 4;

/// Minimum /WE low time for the data phase.
///
/// 84 master clock cycles, roughly 25 microseconds at the nominal 3.58 MHz
/// oscillator.
pub const DATA_HOLD_US: u32 = 25;

/// Two-phase write interface to the device.
///
/// Implementations drive the physical lines and busy-wait the strobe hold
/// times; the driver core never sleeps on its own. There is no read path,
/// the YM2413 bus is write-only.
pub trait Bus {
    /// Drive the data lines with a register address (A0 low) and pulse /WE
    /// low for at least [`ADDRESS_HOLD_US`].
    fn latch_address(&mut self, addr: u8);

    /// Drive the data lines with register content (A0 high) and pulse /WE
    /// low for at least [`DATA_HOLD_US`].
    fn latch_data(&mut self, data: u8);
}

/// Write port with address coalescing.
///
/// Remembers the last latched register address and skips the address phase
/// when consecutive writes target the same register. This is purely a
/// timing optimization; resending the address every time is functionally
/// identical, just slower.
#[derive(Debug)]
pub struct Port<B> {
    bus: B,
    last_address: Option<u8>,
}

impl<B: Bus> Port<B> {
    /// Wrap a bus transport. The address cache starts empty so the first
    /// write always latches its address.
    pub fn new(bus: B) -> Self {
        Port {
            bus,
            last_address: None,
        }
    }

    /// Perform one register write, eliding the address phase when the
    /// target register matches the previous write.
    pub fn write(&mut self, addr: u8, data: u8) {
        trace!("write 0x{addr:02x} <- 0x{data:02x}");

        if self.last_address != Some(addr) {
            self.bus.latch_address(addr);
            self.last_address = Some(addr);
        }
        self.bus.latch_data(data);
    }

    /// Borrow the underlying transport.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying transport.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the port and return the transport.
    pub fn into_bus(self) -> B {
        self.bus
    }
}

/// Simulated transport that records completed register writes.
///
/// Stands in for real hardware in tests and host-side tooling. No strobe
/// timing is modelled; each `(address, data)` pair is recorded when its
/// data phase lands.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    current_address: u8,
    address_phases: usize,
    writes: Vec<(u8, u8)>,
}

impl Recorder {
    /// All completed register writes, in order.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Number of address phases that were latched.
    pub fn address_phases(&self) -> usize {
        self.address_phases
    }

    /// Most recent value written to the given register, if any.
    pub fn last_write_to(&self, addr: u8) -> Option<u8> {
        self.writes.iter().rev().find(|w| w.0 == addr).map(|w| w.1)
    }

    /// Forget all recorded traffic.
    pub fn clear(&mut self) {
        self.address_phases = 0;
        self.writes.clear();
    }
}

impl Bus for Recorder {
    fn latch_address(&mut self, addr: u8) {
        self.current_address = addr;
        self.address_phases += 1;
    }

    fn latch_data(&mut self, data: u8) {
        self.writes.push((self.current_address, data));
    }
}
