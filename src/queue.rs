//! Deferred command queue.
//!
//! Menu actions run while a button event is being dispatched, which is
//! not a safe place to inject commands into the machine. They push a
//! [`Deferred`] here instead, and the main loop drains the queue once
//! per pass, running each action with the machine channel and the
//! registry at hand.
//!
//! The queue is owned by the main-loop context: dispatch pushes, the
//! main-loop pass pops. The periodic (button sampling) context never
//! touches it.

use core::fmt::Write;

use heapless::{Deque, String};

use crate::config::COMMAND_LINE_LEN;
use crate::error::Error;
use crate::fmt::{debug, warning};
use crate::machine::Machine;
use crate::registry::{Domain, Key, Registry};
use crate::state::Heater;

/// A single formatted command line.
pub type CommandLine = String<COMMAND_LINE_LEN>;

/// Something that can be executed once in a given context.
pub trait Runnable<C: ?Sized> {
    fn run(self, ctx: &mut C);
}

impl<C: ?Sized> Runnable<C> for fn(&mut C) {
    fn run(self, ctx: &mut C) {
        self(ctx)
    }
}

/// Fixed-capacity FIFO of deferred actions.
pub struct CommandQueue<T, const N: usize> {
    slots: Deque<T, N>,
}

impl<T, const N: usize> CommandQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: Deque::new(),
        }
    }

    /// Enqueue an action.
    ///
    /// A full queue drops the newest action (this one) and reports
    /// [`Error::QueueFull`]; queued actions are left untouched.
    pub fn push(&mut self, action: T) -> Result<(), Error> {
        self.slots.push_back(action).map_err(|_| {
            warning!("command queue full ({} slots) - dropping action", N);
            Error::QueueFull
        })
    }

    /// Run the oldest action, if any. Returns whether one ran.
    pub fn execute_next<C: ?Sized>(&mut self, ctx: &mut C) -> bool
    where
        T: Runnable<C>,
    {
        match self.slots.pop_front() {
            Some(action) => {
                action.run(ctx);
                true
            }
            None => false,
        }
    }

    /// Run the backlog present at the start of the call, oldest first.
    /// Returns the number of actions executed.
    pub fn drain<C: ?Sized>(&mut self, ctx: &mut C) -> usize
    where
        T: Runnable<C>,
    {
        let backlog = self.slots.len();
        let mut executed = 0;
        while executed < backlog && self.execute_next(ctx) {
            executed += 1;
        }
        executed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for CommandQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collaborators a deferred action may use when it finally runs.
pub struct Outputs<'a> {
    pub machine: &'a mut dyn Machine,
    pub registry: &'a mut dyn Registry,
}

/// Actions the panel defers to the main loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Deferred {
    /// One formatted command line.
    Command(CommandLine),
    /// A fixed sequence of command lines, submitted in order.
    Script(&'static [&'static str]),
    /// Write a heater target into the registry.
    SetTemperature { heater: Heater, celsius: f32 },
    /// Ask the player to abort the running file.
    AbortPlayback,
}

impl Deferred {
    /// Build a [`Deferred::Command`] from format arguments. Lines longer
    /// than [`COMMAND_LINE_LEN`] are truncated.
    pub fn command(args: core::fmt::Arguments<'_>) -> Self {
        let mut line = CommandLine::new();
        let _ = line.write_fmt(args);
        Deferred::Command(line)
    }

    /// `play <path> -q`
    pub fn play(path: &str) -> Self {
        Self::command(format_args!("play {} -q", path))
    }
}

impl<'a> Runnable<Outputs<'a>> for Deferred {
    fn run(self, out: &mut Outputs<'a>) {
        match self {
            Deferred::Command(line) => {
                debug!("deferred: {}", line.as_str());
                out.machine.submit(&line);
            }
            Deferred::Script(lines) => {
                for line in lines {
                    debug!("deferred: {}", line);
                    out.machine.submit(line);
                }
            }
            Deferred::SetTemperature { heater, celsius } => {
                debug!("deferred: {} -> {}", heater, celsius);
                out.registry.set(
                    Domain::TemperatureControl,
                    heater.target_key(),
                    &celsius.to_le_bytes(),
                );
            }
            Deferred::AbortPlayback => {
                debug!("deferred: abort playback");
                out.registry.set(Domain::Player, Key::AbortPlay, &[]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::RecordingMachine;
    use crate::registry::MemoryRegistry;
    use std::vec::Vec;

    type Log = Vec<u32>;

    fn first(log: &mut Log) {
        log.push(1);
    }
    fn second(log: &mut Log) {
        log.push(2);
    }
    fn third(log: &mut Log) {
        log.push(3);
    }

    #[test]
    fn drain_runs_all_in_fifo_order_once() {
        let mut queue: CommandQueue<fn(&mut Log), 4> = CommandQueue::new();
        queue.push(first).unwrap();
        queue.push(second).unwrap();
        queue.push(third).unwrap();

        let mut log = Log::new();
        assert_eq!(queue.drain(&mut log), 3);
        assert_eq!(log, [1, 2, 3]);
        assert!(queue.is_empty());

        // Nothing runs twice.
        assert_eq!(queue.drain(&mut log), 0);
        assert_eq!(log, [1, 2, 3]);
    }

    #[test]
    fn drain_on_empty_queue_is_a_no_op() {
        let mut queue: CommandQueue<fn(&mut Log), 2> = CommandQueue::new();
        let mut log = Log::new();
        assert_eq!(queue.drain(&mut log), 0);
        assert!(!queue.execute_next(&mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn overflow_drops_newest_and_keeps_queue_intact() {
        let mut queue: CommandQueue<fn(&mut Log), 2> = CommandQueue::new();
        assert_eq!(queue.capacity(), 2);
        queue.push(first).unwrap();
        queue.push(second).unwrap();
        assert_eq!(queue.push(third), Err(Error::QueueFull));
        assert_eq!(queue.len(), 2);

        let mut log = Log::new();
        queue.drain(&mut log);
        assert_eq!(log, [1, 2]);
    }

    #[test]
    fn deferred_commands_reach_machine_and_registry() {
        let mut queue: CommandQueue<Deferred, 4> = CommandQueue::new();
        queue.push(Deferred::Script(&["G91", "G1 E5 F100", "G90"])).unwrap();
        queue
            .push(Deferred::SetTemperature {
                heater: Heater::Bed,
                celsius: 60.0,
            })
            .unwrap();
        queue.push(Deferred::play("/sd/benchy.gcode")).unwrap();

        let mut machine = RecordingMachine::default();
        let mut registry = MemoryRegistry::new();
        let mut out = Outputs {
            machine: &mut machine,
            registry: &mut registry,
        };
        assert_eq!(queue.drain(&mut out), 3);

        assert_eq!(
            machine.lines,
            ["G91", "G1 E5 F100", "G90", "play /sd/benchy.gcode -q"]
        );
        let mut buf = [0u8; 4];
        assert_eq!(
            registry.get(Domain::TemperatureControl, Key::BedTarget, &mut buf),
            Some(4)
        );
        assert_eq!(f32::from_le_bytes(buf), 60.0);
    }

    #[test]
    fn command_lines_use_fixed_width_positions() {
        match Deferred::command(format_args!("G0 X{:4.0}", 12.0f32)) {
            Deferred::Command(line) => assert_eq!(line.as_str(), "G0 X  12"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
