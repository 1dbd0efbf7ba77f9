//! Millisecond time sources for automatic note-off timing.
//!
//! The driver never blocks or spawns anything; it only compares elapsed
//! milliseconds during [`tick`](crate::Ym2413::tick). The time source is an
//! injected capability so tests and lockstep simulations can control it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of elapsed milliseconds.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed origin. Wrapping is
    /// fine, the driver uses wrapping subtraction for durations.
    fn millis(&self) -> u32;
}

/// Wall time measured from clock creation.
#[derive(Debug, Clone)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        WallClock {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn millis(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }
}

/// Manually advanced clock for tests and lockstep simulations.
///
/// Clones share the same underlying time, so a host can hand one clone to
/// the driver and keep another to advance time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    /// Create a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by the given number of milliseconds.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Set the absolute time in milliseconds.
    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        self.now.get()
    }
}
