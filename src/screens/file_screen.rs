//! Folder lister: `..` followed by the accepted entries of a folder.

use core::fmt;

use crate::config::FILE_LINE_CHARS;
use crate::files::{is_gcode, parent_folder, FilePath, Listing, PARENT_ENTRY, ROOT_FOLDER};
use crate::fmt::info;
use crate::queue::Deferred;
use crate::screens::{PanelScreen, ScreenHost};

pub struct FileScreen {
    listing: Listing,
    /// File to start on the next main-loop pass.
    pending_play: Option<FilePath>,
}

impl FileScreen {
    pub const fn new() -> Self {
        Self {
            listing: Listing::empty(),
            pending_play: None,
        }
    }

    pub fn folder(&self) -> &str {
        self.listing.folder()
    }

    fn enter_folder(&mut self, host: &mut dyn ScreenHost, folder: &str) {
        self.listing = Listing::load(host.filesystem(), folder);
        host.setup_menu(self.listing.entries().len() + 1);
    }
}

impl Default for FileScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelScreen for FileScreen {
    /// Reopen the last folder, or the root the first time.
    fn on_enter(&mut self, host: &mut dyn ScreenHost) {
        let mut folder = FilePath::new();
        let _ = folder.push_str(self.listing.folder());
        self.enter_folder(host, &folder);
    }

    fn on_main_loop(&mut self, host: &mut dyn ScreenHost) {
        if let Some(path) = self.pending_play.take() {
            if let Deferred::Command(line) = Deferred::play(&path) {
                host.submit(&line);
            }
            host.enter_parent();
        }
    }

    fn display_menu_line(&self, line: usize, out: &mut dyn fmt::Write) -> fmt::Result {
        match line {
            0 => out.write_str(PARENT_ENTRY),
            n => match self.listing.entries().get(n - 1) {
                Some(entry) => {
                    for c in entry.name.chars().take(FILE_LINE_CHARS) {
                        out.write_char(c)?;
                    }
                    Ok(())
                }
                None => Ok(()),
            },
        }
    }

    fn clicked_line(&mut self, line: usize, host: &mut dyn ScreenHost) {
        if line == 0 {
            if self.listing.folder() == ROOT_FOLDER {
                host.enter_parent();
            } else {
                let mut up = FilePath::new();
                let _ = up.push_str(parent_folder(self.listing.folder()));
                self.enter_folder(host, &up);
            }
            return;
        }

        let Some(entry) = self.listing.entries().get(line - 1) else {
            return;
        };
        let path = self.listing.path_of(entry);
        if entry.is_folder {
            self.enter_folder(host, &path);
        } else if is_gcode(&entry.name) {
            info!("file screen: play {}", path.as_str());
            self.pending_play = Some(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::Host;

    fn card() -> Host {
        Host::new(std::vec![
            "/sd/",
            "/sd/a_really_long_file_name.gcode",
            "/sd/config",
            "/sd/parts/",
            "/sd/parts/gear.g",
            "/sd/readme.txt",
        ])
    }

    #[test]
    fn root_lists_parent_entry_first() {
        let mut host = card();
        let mut screen = FileScreen::new();
        screen.on_enter(&mut host);
        assert_eq!(screen.folder(), "/");
        assert_eq!(host.lines(&screen), ["..", "sd"]);
    }

    #[test]
    fn names_are_filtered_and_truncated() {
        let mut host = card();
        let mut screen = FileScreen::new();
        screen.on_enter(&mut host);
        host.click(&mut screen, 1);

        assert_eq!(screen.folder(), "/sd");
        assert_eq!(
            host.lines(&screen),
            ["..", "a_really_long_file", "parts"]
        );
    }

    #[test]
    fn parent_entry_goes_up_then_leaves_at_root() {
        let mut host = card();
        let mut screen = FileScreen::new();
        screen.on_enter(&mut host);
        host.click(&mut screen, 1);
        host.click(&mut screen, 2);
        assert_eq!(screen.folder(), "/sd/parts");

        host.click(&mut screen, 0);
        assert_eq!(screen.folder(), "/sd");
        host.click(&mut screen, 0);
        assert_eq!(screen.folder(), "/");
        assert_eq!(host.left, 0);

        host.click(&mut screen, 0);
        assert_eq!(host.left, 1);
    }

    #[test]
    fn gcode_file_plays_on_next_main_loop() {
        let mut host = card();
        let mut screen = FileScreen::new();
        screen.on_enter(&mut host);
        host.click(&mut screen, 1);
        host.click(&mut screen, 2);
        host.click(&mut screen, 1);
        assert!(host.submitted.is_empty());

        screen.on_main_loop(&mut host);
        assert_eq!(host.submitted, ["play /sd/parts/gear.g -q"]);
        assert_eq!(host.left, 1);

        // Only once.
        screen.on_main_loop(&mut host);
        assert_eq!(host.submitted.len(), 1);
    }

    #[test]
    fn reentering_keeps_the_folder() {
        let mut host = card();
        let mut screen = FileScreen::new();
        screen.on_enter(&mut host);
        host.click(&mut screen, 1);
        screen.on_enter(&mut host);
        assert_eq!(screen.folder(), "/sd");
        assert_eq!(host.rows, 3);
    }
}
