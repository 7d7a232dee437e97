//! Screen-class adapter for screens with dynamic content.
//!
//! Compiled-in menus live in the menu graph. Screens whose lines depend
//! on runtime data (a folder listing, the number of toolheads) implement
//! [`PanelScreen`] instead and are driven by a [`ScreenHost`], which owns
//! the line cursor and the display.
//!
//! This is a contract for a host screen loop, not part of the panel
//! firmware: `main.rs` runs the menu graph only, and the file browser
//! there is the graph's own three-slot `FileBrowser`. A host that keeps a
//! screen stack implements [`ScreenHost`] and calls `on_enter`,
//! `on_refresh` and `on_main_loop`; the tests below use such a host.

pub mod file_screen;
pub mod toolhead_screen;

pub use file_screen::FileScreen;
pub use toolhead_screen::ToolheadScreen;

use core::fmt;

use crate::files::FileSystem;

/// Services the host gives a screen.
pub trait ScreenHost {
    /// Start a new menu of `rows` lines with the cursor on line 0.
    fn setup_menu(&mut self, rows: usize);

    /// Line under the cursor.
    fn current_line(&self) -> usize;

    /// Return and clear the pending click.
    fn take_click(&mut self) -> bool;

    /// Leave this screen for the one that opened it.
    fn enter_parent(&mut self);

    /// Hand a command line to the machine. Only call from
    /// [`PanelScreen::on_main_loop`].
    fn submit(&mut self, command: &str);

    fn filesystem(&self) -> &dyn FileSystem;
}

pub trait PanelScreen {
    fn on_enter(&mut self, host: &mut dyn ScreenHost);

    /// Refresh tick: dispatch a pending click to [`Self::clicked_line`].
    fn on_refresh(&mut self, host: &mut dyn ScreenHost) {
        if host.take_click() {
            let line = host.current_line();
            self.clicked_line(line, host);
        }
    }

    /// Main-loop pass, the only place machine commands may be sent.
    fn on_main_loop(&mut self, _host: &mut dyn ScreenHost) {}

    /// Write the text of one menu line.
    fn display_menu_line(&self, line: usize, out: &mut dyn fmt::Write) -> fmt::Result;

    fn clicked_line(&mut self, line: usize, host: &mut dyn ScreenHost);

    /// Seconds without input before the host leaves the screen.
    fn idle_timeout_secs(&self) -> Option<u32> {
        None
    }
}
