//! Flags shared between the periodic context and the main loop.
//!
//! The periodic context only sets flags and updates button state; the
//! main loop only takes (reads and clears) flags. Each flag therefore
//! has one setter and one clearer, and no lock is needed.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::ui::buttons::Button;

/// A boolean set from one context and consumed from the other.
pub struct Latch(AtomicBool);

impl Latch {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return and clear the flag.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Signals {
    /// A redraw is due.
    pub refresh: Latch,
    /// One second elapsed.
    pub second: Latch,
    pub up: Latch,
    pub down: Latch,
    pub select: Latch,
}

impl Signals {
    pub const fn new() -> Self {
        Self {
            refresh: Latch::new(),
            second: Latch::new(),
            up: Latch::new(),
            down: Latch::new(),
            select: Latch::new(),
        }
    }

    /// Refresh-rate tick.
    pub fn refresh_tick(&self) {
        self.refresh.signal();
    }

    /// Once-per-second tick.
    pub fn second_tick(&self) {
        self.second.signal();
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw button levels of one sample (`true` = pressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    pub up: bool,
    pub down: bool,
    pub select: bool,
}

/// Periodic-context state: the three button state machines.
pub struct Sampler {
    up: Button,
    down: Button,
    select: Button,
}

impl Sampler {
    pub fn new() -> Self {
        Self {
            up: Button::default(),
            down: Button::default(),
            select: Button::default(),
        }
    }

    /// Button-rate tick: feed one sample per button and latch activations.
    pub fn button_tick(&mut self, levels: ButtonLevels, signals: &Signals) {
        for (button, down, latch) in [
            (&mut self.up, levels.up, &signals.up),
            (&mut self.down, levels.down, &signals.down),
            (&mut self.select, levels.select, &signals.select),
        ] {
            button.sample(down);
            if button.read() {
                latch.signal();
            }
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESS_UP: ButtonLevels = ButtonLevels {
        up: true,
        down: false,
        select: false,
    };

    #[test]
    fn latch_is_consumed_once() {
        let latch = Latch::new();
        assert!(!latch.take());
        latch.signal();
        latch.signal();
        assert!(latch.is_set());
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn button_tick_latches_one_activation_per_press() {
        let signals = Signals::new();
        let mut sampler = Sampler::new();

        sampler.button_tick(PRESS_UP, &signals);
        sampler.button_tick(PRESS_UP, &signals);
        sampler.button_tick(ButtonLevels::default(), &signals);

        assert!(signals.up.take());
        assert!(!signals.up.take());
        assert!(!signals.down.is_set());
        assert!(!signals.select.is_set());
    }

    #[test]
    fn periodic_ticks_set_their_flags() {
        let signals = Signals::new();
        signals.refresh_tick();
        signals.second_tick();
        assert!(signals.refresh.take());
        assert!(signals.second.take());
    }
}
