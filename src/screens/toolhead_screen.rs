//! Toolhead picker: "Back" followed by one line per toolhead.

use core::fmt;

use crate::config::SCREEN_IDLE_TIMEOUT_SECS;
use crate::queue::Deferred;
use crate::screens::{PanelScreen, ScreenHost};

pub struct ToolheadScreen {
    toolheads: u8,
    pending: Option<u8>,
}

impl ToolheadScreen {
    pub const fn new(toolheads: u8) -> Self {
        Self {
            toolheads,
            pending: None,
        }
    }
}

impl PanelScreen for ToolheadScreen {
    fn on_enter(&mut self, host: &mut dyn ScreenHost) {
        host.setup_menu(usize::from(self.toolheads) + 1);
    }

    fn on_main_loop(&mut self, host: &mut dyn ScreenHost) {
        if let Some(tool) = self.pending.take() {
            if let Deferred::Command(line) = Deferred::command(format_args!("T{}", tool)) {
                host.submit(&line);
            }
            host.enter_parent();
        }
    }

    fn display_menu_line(&self, line: usize, out: &mut dyn fmt::Write) -> fmt::Result {
        match line {
            0 => out.write_str("Back"),
            n => write!(out, "T{}", n - 1),
        }
    }

    fn clicked_line(&mut self, line: usize, host: &mut dyn ScreenHost) {
        match line {
            0 => host.enter_parent(),
            n if n <= usize::from(self.toolheads) => self.pending = Some((n - 1) as u8),
            _ => {}
        }
    }

    fn idle_timeout_secs(&self) -> Option<u32> {
        Some(SCREEN_IDLE_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::Host;

    #[test]
    fn lists_back_and_toolheads() {
        let mut host = Host::new(std::vec![]);
        let mut screen = ToolheadScreen::new(2);
        screen.on_enter(&mut host);
        assert_eq!(host.lines(&screen), ["Back", "T0", "T1"]);
        assert_eq!(screen.idle_timeout_secs(), Some(60));
    }

    #[test]
    fn selecting_a_toolhead_submits_on_main_loop() {
        let mut host = Host::new(std::vec![]);
        let mut screen = ToolheadScreen::new(2);
        screen.on_enter(&mut host);

        host.click(&mut screen, 2);
        assert!(host.submitted.is_empty());
        screen.on_main_loop(&mut host);
        assert_eq!(host.submitted, ["T1"]);
        assert_eq!(host.left, 1);
    }

    #[test]
    fn back_leaves_without_command() {
        let mut host = Host::new(std::vec![]);
        let mut screen = ToolheadScreen::new(1);
        screen.on_enter(&mut host);
        host.click(&mut screen, 0);
        screen.on_main_loop(&mut host);
        assert!(host.submitted.is_empty());
        assert_eq!(host.left, 1);
    }
}
