//! Closed-loop spindle speed control.
//!
//! A feedback sensor produces `pulses_per_rev` pulses per revolution;
//! [`Spindle::on_pulse`] timestamps them and [`Spindle::update`], called
//! at a fixed rate, turns the latest pulse interval into a smoothed RPM
//! and runs a PID loop producing the PWM duty cycle.

use crate::fmt::info;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpindleConfig {
    pub pulses_per_rev: f32,
    /// Target used by `M3` without an `S` word until one is given.
    pub default_rpm: f32,
    pub p: f32,
    pub i: f32,
    pub d: f32,
    /// Time constant of the RPM low-pass filter (seconds).
    pub smoothing_secs: f32,
    /// Drive the output low for full speed.
    pub output_inverted: bool,
    /// No pulse for this long reads as stopped (seconds).
    pub stall_secs: f32,
}

impl SpindleConfig {
    pub const DEFAULT: Self = Self {
        pulses_per_rev: 1.0,
        default_rpm: 5000.0,
        p: 0.0001,
        i: 0.0001,
        d: 0.0001,
        smoothing_secs: 0.1,
        output_inverted: false,
        stall_secs: 0.5,
    };
}

impl Default for SpindleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub struct Spindle {
    config: SpindleConfig,
    on: bool,
    target_rpm: f32,
    current_rpm: f32,
    last_pulse_us: Option<u64>,
    /// Interval between the two latest pulses (µs).
    pulse_interval_us: Option<u64>,
    since_pulse_secs: f32,
    integral: f32,
    previous_error: f32,
}

impl Spindle {
    pub const fn new(config: SpindleConfig) -> Self {
        Self {
            config,
            on: false,
            target_rpm: config.default_rpm,
            current_rpm: 0.0,
            last_pulse_us: None,
            pulse_interval_us: None,
            since_pulse_secs: 0.0,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Handle `M3 [S<rpm>]` and `M5`. Returns whether the line was ours.
    pub fn on_gcode(&mut self, line: &str) -> bool {
        let mut words = line.split_whitespace();
        match words.next().and_then(m_code) {
            Some(3) => {
                if let Some(rpm) = words.find_map(|w| w.strip_prefix('S')?.parse::<f32>().ok()) {
                    self.target_rpm = rpm.max(0.0);
                }
                self.on = true;
                info!("spindle on at {} rpm", self.target_rpm);
                true
            }
            Some(5) => {
                self.on = false;
                info!("spindle off");
                true
            }
            _ => false,
        }
    }

    /// Feedback pulse at `now_us` (monotonic microseconds).
    pub fn on_pulse(&mut self, now_us: u64) {
        if let Some(last) = self.last_pulse_us {
            self.pulse_interval_us = Some(now_us.saturating_sub(last));
        }
        self.last_pulse_us = Some(now_us);
        self.since_pulse_secs = 0.0;
    }

    /// Advance the controller by `dt_secs` and return the PWM duty in `[0, 1]`.
    pub fn update(&mut self, dt_secs: f32) -> f32 {
        if dt_secs <= 0.0 {
            return self.output(0.0);
        }
        self.since_pulse_secs += dt_secs;

        let measured = match self.pulse_interval_us {
            Some(interval) if interval > 0 && self.since_pulse_secs < self.config.stall_secs => {
                60_000_000.0 / (interval as f32 * self.config.pulses_per_rev)
            }
            _ => 0.0,
        };
        let alpha = dt_secs / (self.config.smoothing_secs + dt_secs);
        self.current_rpm += alpha * (measured - self.current_rpm);

        if !self.on {
            self.integral = 0.0;
            self.previous_error = 0.0;
            return self.output(0.0);
        }

        let error = self.target_rpm - self.current_rpm;
        self.integral = (self.integral + self.config.i * error * dt_secs).clamp(-1.0, 1.0);
        let derivative = self.config.d * (error - self.previous_error) / dt_secs;
        self.previous_error = error;

        let duty = (self.config.p * error + self.integral + derivative).clamp(0.0, 1.0);
        self.output(duty)
    }

    fn output(&self, duty: f32) -> f32 {
        if self.config.output_inverted {
            1.0 - duty
        } else {
            duty
        }
    }

    pub fn current_rpm(&self) -> f32 {
        self.current_rpm
    }

    pub fn target_rpm(&self) -> f32 {
        self.target_rpm
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// `M3` / `M03` → 3.
fn m_code(word: &str) -> Option<u32> {
    word.strip_prefix(|c| c == 'M' || c == 'm')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unfiltered() -> SpindleConfig {
        SpindleConfig {
            smoothing_secs: 0.0,
            ..SpindleConfig::DEFAULT
        }
    }

    #[test]
    fn m3_and_m5_switch_the_spindle() {
        let mut spindle = Spindle::new(SpindleConfig::DEFAULT);
        assert!(spindle.on_gcode("M3 S12000"));
        assert!(spindle.is_on());
        assert_eq!(spindle.target_rpm(), 12000.0);

        assert!(spindle.on_gcode("M5"));
        assert!(!spindle.is_on());

        // Without S the previous target is kept.
        assert!(spindle.on_gcode("M03"));
        assert_eq!(spindle.target_rpm(), 12000.0);

        assert!(!spindle.on_gcode("G1 X10"));
        assert!(!spindle.on_gcode("M30"));
    }

    #[test]
    fn pulse_interval_gives_rpm() {
        let mut spindle = Spindle::new(unfiltered());
        spindle.on_pulse(0);
        spindle.on_pulse(10_000);
        spindle.update(0.001);
        // One pulse per 10 ms, one pulse per revolution.
        assert!((spindle.current_rpm() - 6000.0).abs() < 0.5);
    }

    #[test]
    fn stalled_sensor_reads_zero() {
        let mut spindle = Spindle::new(unfiltered());
        spindle.on_pulse(0);
        spindle.on_pulse(10_000);
        spindle.update(0.6);
        assert_eq!(spindle.current_rpm(), 0.0);
    }

    #[test]
    fn off_spindle_outputs_nothing() {
        let mut spindle = Spindle::new(SpindleConfig::DEFAULT);
        assert_eq!(spindle.update(0.001), 0.0);

        let mut inverted = Spindle::new(SpindleConfig {
            output_inverted: true,
            ..SpindleConfig::DEFAULT
        });
        assert_eq!(inverted.update(0.001), 1.0);
    }

    #[test]
    fn running_below_target_drives_output_up() {
        let mut spindle = Spindle::new(SpindleConfig::DEFAULT);
        spindle.on_gcode("M3 S1000");
        let first = spindle.update(0.001);
        assert!(first > 0.0 && first <= 1.0);

        // Far above target: the loop backs off to zero.
        let mut fast = Spindle::new(unfiltered());
        fast.on_gcode("M3 S100");
        fast.on_pulse(0);
        fast.on_pulse(1_000);
        assert_eq!(fast.update(0.001), 0.0);
    }
}
