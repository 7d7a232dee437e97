//! Machine command channel - the consumer side of every panel action.
//!
//! The panel never talks to the motion core directly: UI actions are
//! deferred into the [`CommandQueue`](crate::queue::CommandQueue) and
//! only reach a [`Machine`] when the main loop drains it.

/// Sink for command lines (G-code or console commands such as `play`).
pub trait Machine {
    /// Hand one command line to the machine's command-received event.
    fn submit(&mut self, command: &str);
}

/// Machine double that records every submitted line.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMachine {
    pub lines: std::vec::Vec<std::string::String>,
}

#[cfg(test)]
impl Machine for RecordingMachine {
    fn submit(&mut self, command: &str) {
        self.lines.push(command.into());
    }
}
