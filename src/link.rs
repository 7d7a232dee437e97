//! Serial link to the motion controller.
//!
//! On the device the panel does not share memory with the machine: it
//! talks to it over a UART. [`MachineLink`] is the registry the panel
//! sees there. Reads come from a local mirror that [`MachineLink::on_line`]
//! fills from the controller's replies; writes update the mirror and
//! queue the equivalent command, sent by [`MachineLink::flush`].
//!
//! ```text
//! HotendTarget  -> M104 S<t>
//! BedTarget     -> M140 S<t>
//! AbortPlay     -> abort
//!
//! "ok T:195.0 /200.0 B:58.0 /60.0"            -> Hotend, Bed
//! "ok C: X:10.0000 Y:20.0000 Z:5.0000"         -> CurrentPosition
//! "file: /sd/a.gcode, 12 % complete, elapsed time: 42 s" -> Progress, IsPlaying
//! "Not currently playing"                       -> IsPlaying = 0
//! ```

use core::fmt::Write;

use heapless::{Deque, Vec};

use crate::config::LINK_OUTBOX_CAPACITY;
use crate::fmt::{debug, warning};
use crate::machine::Machine;
use crate::queue::CommandLine;
use crate::registry::{f32_at, Domain, Key, MemoryRegistry, Registry, MEMORY_VALUE_LEN};

/// Requests whose replies keep the mirror current, sent once per poll.
pub const STATUS_REQUESTS: [&str; 3] = ["M105", "M114", "progress"];

/// Registry mirror plus outgoing command box.
pub struct MachineLink {
    mirror: MemoryRegistry,
    outbox: Deque<CommandLine, LINK_OUTBOX_CAPACITY>,
}

impl MachineLink {
    pub const fn new() -> Self {
        Self {
            mirror: MemoryRegistry::new(),
            outbox: Deque::new(),
        }
    }

    /// Commands waiting for [`MachineLink::flush`].
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Send every queued command. Returns how many were sent.
    pub fn flush(&mut self, machine: &mut dyn Machine) -> usize {
        let mut sent = 0;
        while let Some(line) = self.outbox.pop_front() {
            machine.submit(&line);
            sent += 1;
        }
        sent
    }

    fn send(&mut self, args: core::fmt::Arguments<'_>) {
        let mut line = CommandLine::new();
        let _ = line.write_fmt(args);
        debug!("link: {}", line.as_str());
        if self.outbox.push_back(line).is_err() {
            warning!("link outbox full - dropping command");
        }
    }

    /// Fold one reply line from the controller into the mirror.
    pub fn on_line(&mut self, line: &str) {
        let line = line.trim();
        if line.starts_with("Not currently playing") {
            self.mirror.set(Domain::Player, Key::IsPlaying, &[0]);
            self.mirror.remove(Domain::Player, Key::Progress);
        } else if let Some(rest) = line.strip_prefix("file: ") {
            self.progress_report(rest);
        } else {
            self.temperature_report(line);
            self.position_report(line);
        }
    }

    fn temperature_report(&mut self, line: &str) {
        let mut tokens = line.split_whitespace().peekable();
        while let Some(token) = tokens.next() {
            let (key, value) = if let Some(v) = token
                .strip_prefix("T:")
                .or_else(|| token.strip_prefix("T0:"))
            {
                (Key::Hotend, v)
            } else if let Some(v) = token.strip_prefix("B:") {
                (Key::Bed, v)
            } else {
                continue;
            };
            let Ok(current) = value.parse::<f32>() else {
                continue;
            };
            let target = tokens
                .peek()
                .and_then(|t| t.strip_prefix('/'))
                .and_then(|t| t.parse::<f32>().ok())
                .unwrap_or(0.0);

            let mut raw = [0u8; 8];
            raw[..4].copy_from_slice(&target.to_le_bytes());
            raw[4..].copy_from_slice(&current.to_le_bytes());
            self.mirror.set(Domain::TemperatureControl, key, &raw);
        }
    }

    fn position_report(&mut self, line: &str) {
        let mut axes = [None; 3];
        for token in line.split_whitespace() {
            for (slot, prefix) in ["X:", "Y:", "Z:"].iter().enumerate() {
                if let Some(v) = token.strip_prefix(prefix) {
                    axes[slot] = v.parse::<f32>().ok();
                }
            }
        }
        if let [Some(x), Some(y), Some(z)] = axes {
            let mut raw = [0u8; 12];
            raw[..4].copy_from_slice(&x.to_le_bytes());
            raw[4..8].copy_from_slice(&y.to_le_bytes());
            raw[8..].copy_from_slice(&z.to_le_bytes());
            self.mirror.set(Domain::Robot, Key::CurrentPosition, &raw);
        }
    }

    fn progress_report(&mut self, rest: &str) {
        let mut fields = rest.split(", ");
        let (Some(path), Some(percent)) = (fields.next(), fields.next()) else {
            return;
        };
        let Some(percent) = percent
            .split_whitespace()
            .next()
            .and_then(|p| p.parse::<u32>().ok())
        else {
            return;
        };
        let elapsed = fields
            .find_map(|f| f.strip_prefix("elapsed time: "))
            .and_then(elapsed_secs)
            .unwrap_or(0);

        let mut raw: Vec<u8, MEMORY_VALUE_LEN> = Vec::new();
        let _ = raw.extend_from_slice(&percent.to_le_bytes());
        let _ = raw.extend_from_slice(&elapsed.to_le_bytes());
        for &b in path.as_bytes() {
            if raw.push(b).is_err() {
                break;
            }
        }
        self.mirror.set(Domain::Player, Key::Progress, &raw);
        self.mirror.set(Domain::Player, Key::IsPlaying, &[1]);
    }
}

impl Default for MachineLink {
    fn default() -> Self {
        Self::new()
    }
}

/// `42 s` or `hh:mm:ss`.
fn elapsed_secs(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Some(secs) = text.strip_suffix(" s") {
        return secs.trim().parse().ok();
    }
    let mut total = 0u32;
    for part in text.split(':') {
        total = total.checked_mul(60)?.checked_add(part.trim().parse().ok()?)?;
    }
    Some(total)
}

impl Registry for MachineLink {
    fn get(&self, domain: Domain, key: Key, out: &mut [u8]) -> Option<usize> {
        self.mirror.get(domain, key, out)
    }

    fn set(&mut self, domain: Domain, key: Key, value: &[u8]) {
        self.mirror.set(domain, key, value);
        match (domain, key) {
            (Domain::TemperatureControl, Key::HotendTarget) => {
                if let Some(celsius) = f32_at(value, 0) {
                    self.send(format_args!("M104 S{:.0}", celsius));
                }
            }
            (Domain::TemperatureControl, Key::BedTarget) => {
                if let Some(celsius) = f32_at(value, 0) {
                    self.send(format_args!("M140 S{:.0}", celsius));
                }
            }
            (Domain::Player, Key::AbortPlay) => self.send(format_args!("abort")),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::RecordingMachine;
    use crate::queue::{CommandQueue, Deferred, Outputs};
    use crate::state::{self, Axis, Condition, Heater, Temperatures};

    #[test]
    fn deferred_writes_become_commands() {
        let mut queue: CommandQueue<Deferred, 4> = CommandQueue::new();
        queue
            .push(Deferred::SetTemperature {
                heater: Heater::Hotend,
                celsius: 185.0,
            })
            .unwrap();
        queue
            .push(Deferred::SetTemperature {
                heater: Heater::Bed,
                celsius: 60.0,
            })
            .unwrap();
        queue.push(Deferred::AbortPlayback).unwrap();

        let mut link = MachineLink::new();
        let mut machine = RecordingMachine::default();
        let mut out = Outputs {
            machine: &mut machine,
            registry: &mut link,
        };
        queue.drain(&mut out);
        assert!(machine.lines.is_empty());
        assert_eq!(link.pending(), 3);

        assert_eq!(link.flush(&mut machine), 3);
        assert_eq!(machine.lines, ["M104 S185", "M140 S60", "abort"]);
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn temperature_reply_fills_both_heaters() {
        let mut link = MachineLink::new();
        link.on_line("ok T:195.3 /200.0 @:0 B:58.0 /60.0 B@:0\r");
        assert_eq!(
            state::hotend_temperatures(&link),
            Some(Temperatures {
                target: 200.0,
                current: 195.3
            })
        );
        assert_eq!(
            state::bed_temperatures(&link),
            Some(Temperatures {
                target: 60.0,
                current: 58.0
            })
        );
        assert!(state::HOTEND_HOT.holds(&link));
    }

    #[test]
    fn target_write_keeps_the_mirrored_reading() {
        let mut link = MachineLink::new();
        link.on_line("ok T:195.0 /200.0");
        link.set(
            Domain::TemperatureControl,
            Key::HotendTarget,
            &210.0f32.to_le_bytes(),
        );
        assert_eq!(
            state::hotend_temperatures(&link).map(|t| t.current),
            Some(195.0)
        );
    }

    #[test]
    fn position_reply_needs_all_three_axes() {
        let mut link = MachineLink::new();
        link.on_line("ok C: X:10.0000 Y:20.5000");
        assert_eq!(state::axis_position(&link, Axis::X), None);

        link.on_line("ok C: X:10.0000 Y:20.5000 Z:5.0000 E:0.0000");
        assert_eq!(state::axis_position(&link, Axis::Y), Some(20.5));
        assert_eq!(state::axis_position(&link, Axis::Z), Some(5.0));
    }

    #[test]
    fn progress_reply_drives_the_status_readers() {
        let mut link = MachineLink::new();
        link.on_line("file: /sd/parts/benchy.gcode, 50 % complete, elapsed time: 00:10:00");
        assert!(state::is_file_being_played(&link));
        let progress = state::progress(&link);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.name.as_str(), "benchy");
        assert_eq!(state::time_progress(&link).remaining, 600);

        link.on_line("Not currently playing");
        assert!(!state::is_file_being_played(&link));
        assert_eq!(state::progress(&link).name.as_str(), state::NO_FILE_CAPTION);
    }

    #[test]
    fn elapsed_time_accepts_both_formats() {
        assert_eq!(elapsed_secs("42 s"), Some(42));
        assert_eq!(elapsed_secs("01:02:03"), Some(3723));
        assert_eq!(elapsed_secs("soon"), None);
    }

    #[test]
    fn unrelated_lines_change_nothing() {
        let mut link = MachineLink::new();
        link.on_line("ok");
        link.on_line("echo: T:hot");
        assert_eq!(state::hotend_temperatures(&link), None);
        assert_eq!(link.pending(), 0);
    }
}
