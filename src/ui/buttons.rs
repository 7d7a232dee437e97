//! Debounced button state machine with auto-repeat.
//!
//! Each physical button (active-low with internal pull-up) is sampled
//! from the periodic context at [`BUTTON_SAMPLE_HZ`]. The sampling
//! period is longer than contact bounce, so a single sample is the
//! debounce: one activation per discrete press, then repeats at a fixed
//! interval once the press is held past the hold threshold.
//!
//! ```text
//!            down              down × hold          down × repeat
//!   Idle ──────────▶ Pressed ───────────────▶ Held ───────────┐
//!    ▲   (activate)     │       (activate)     ▲  (activate)  │
//!    └──────── up ──────┴──────────────────────┴──────────────┘
//! ```
//!
//! [`BUTTON_SAMPLE_HZ`]: crate::config::BUTTON_SAMPLE_HZ

use crate::config::{BUTTON_HOLD_SAMPLES, BUTTON_REPEAT_SAMPLES};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Idle,
    Pressed,
    Held,
}

pub struct Button {
    state: ButtonState,
    hold_samples: u16,
    repeat_samples: u16,
    /// Samples since the last activation while the level stays down.
    counter: u16,
    pending: bool,
}

impl Button {
    pub const fn new(hold_samples: u16, repeat_samples: u16) -> Self {
        Self {
            state: ButtonState::Idle,
            hold_samples,
            repeat_samples,
            counter: 0,
            pending: false,
        }
    }

    /// Feed one sample of the raw level (`true` = pressed).
    /// Returns whether this sample produced an activation.
    pub fn sample(&mut self, down: bool) -> bool {
        let activated = match (self.state, down) {
            (_, false) => {
                self.state = ButtonState::Idle;
                self.counter = 0;
                false
            }
            (ButtonState::Idle, true) => {
                self.state = ButtonState::Pressed;
                self.counter = 0;
                true
            }
            (ButtonState::Pressed, true) => {
                self.counter = self.counter.saturating_add(1);
                if self.counter >= self.hold_samples {
                    self.state = ButtonState::Held;
                    self.counter = 0;
                    true
                } else {
                    false
                }
            }
            (ButtonState::Held, true) => {
                self.counter = self.counter.saturating_add(1);
                if self.counter >= self.repeat_samples {
                    self.counter = 0;
                    true
                } else {
                    false
                }
            }
        };

        if activated {
            self.pending = true;
        }
        activated
    }

    /// Return and clear the pending activation (edge-triggered).
    pub fn read(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new(BUTTON_HOLD_SAMPLES, BUTTON_REPEAT_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `count` identical samples and return the number of activations.
    fn feed(button: &mut Button, down: bool, count: usize) -> usize {
        (0..count).filter(|_| button.sample(down)).count()
    }

    #[test]
    fn press_and_release_activates_once() {
        let mut b = Button::new(10, 5);
        assert_eq!(feed(&mut b, true, 3), 1);
        assert_eq!(b.state(), ButtonState::Pressed);
        assert_eq!(feed(&mut b, false, 3), 0);
        assert_eq!(b.state(), ButtonState::Idle);

        assert!(b.read());
        assert!(!b.read());
    }

    #[test]
    fn released_level_never_activates() {
        let mut b = Button::new(10, 5);
        assert_eq!(feed(&mut b, false, 500), 0);
        assert!(!b.read());
    }

    #[test]
    fn held_press_enters_held_state() {
        let mut b = Button::new(10, 5);
        assert_eq!(feed(&mut b, true, 10), 1);
        assert_eq!(b.state(), ButtonState::Pressed);
        assert_eq!(feed(&mut b, true, 1), 1);
        assert_eq!(b.state(), ButtonState::Held);
    }

    #[test]
    fn repeat_positions_follow_hold_then_interval() {
        let mut b = Button::new(10, 5);
        let mut positions = std::vec::Vec::new();
        for i in 0..=30usize {
            if b.sample(true) {
                positions.push(i);
            }
        }
        assert_eq!(positions, [0, 10, 15, 20, 25, 30]);
    }

    #[test]
    fn release_clears_timers() {
        let mut b = Button::new(10, 5);
        feed(&mut b, true, 9);
        feed(&mut b, false, 1);
        // A fresh press starts the hold count from scratch.
        assert_eq!(feed(&mut b, true, 10), 1);
        assert_eq!(b.state(), ButtonState::Pressed);
    }

    #[test]
    fn pending_survives_until_read() {
        let mut b = Button::default();
        b.sample(true);
        b.sample(false);
        b.sample(false);
        assert!(b.read());
    }
}
