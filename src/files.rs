//! Folder listings for the file browsers.
//!
//! The filesystem itself belongs to the machine; the panel reads it
//! through [`FileSystem`]. Both browsers (the three-slot graph screen
//! and the screen-class lister in [`crate::screens`]) share the
//! filtering rules and the bounded [`Listing`] defined here.

use heapless::{String, Vec};

use crate::config::{FILE_NAME_LEN, FILE_PATH_LEN, FILE_SLOTS, MAX_FOLDER_ENTRIES};
use crate::fmt::{debug, info};
use crate::ui::Direction;

pub type FileName = String<FILE_NAME_LEN>;
pub type FilePath = String<FILE_PATH_LEN>;

/// Entry shown above the folder contents to go one level up.
pub const PARENT_ENTRY: &str = "..";

/// Root of the browsable filesystem.
pub const ROOT_FOLDER: &str = "/";

/// Read-only access to the machine's filesystem.
pub trait FileSystem {
    /// Call `visit` with each entry name of `folder`, in directory order.
    /// Returns `false` if the folder cannot be opened.
    fn list(&self, folder: &str, visit: &mut dyn FnMut(&str)) -> bool;

    fn is_folder(&self, path: &str) -> bool;
}

fn extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|dot| &name[dot + 1..])
}

/// `.g` or `.gcode`, case-insensitive.
pub fn is_gcode(name: &str) -> bool {
    extension(name)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("g") || ext.eq_ignore_ascii_case("gcode"))
}

/// Whether a directory entry is listed at all: G-code files and
/// extension-less names (folders), minus a few system entries.
pub fn is_acceptable(name: &str) -> bool {
    if name == "config" || name == "System Volume Information" {
        return false;
    }
    is_gcode(name) || extension(name).is_none()
}

/// `folder` + `/` + `name`, without doubling the root slash.
/// Over-long paths are truncated.
pub fn join(folder: &str, name: &str) -> FilePath {
    let mut path = FilePath::new();
    let _ = path.push_str(folder);
    if !folder.ends_with('/') {
        let _ = path.push('/');
    }
    for c in name.chars() {
        if path.push(c).is_err() {
            break;
        }
    }
    path
}

/// Folder one level up: `/sd/prints` → `/sd`, `/sd` → `/`.
pub fn parent_folder(folder: &str) -> &str {
    match folder.trim_end_matches('/').rfind('/') {
        Some(0) | None => ROOT_FOLDER,
        Some(slash) => &folder[..slash],
    }
}

fn copy_path(text: &str) -> FilePath {
    let mut path = FilePath::new();
    for c in text.chars() {
        if path.push(c).is_err() {
            break;
        }
    }
    path
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: FileName,
    pub is_folder: bool,
}

/// The accepted entries of one folder.
#[derive(Clone, Debug)]
pub struct Listing {
    folder: FilePath,
    entries: Vec<Entry, MAX_FOLDER_ENTRIES>,
}

impl Listing {
    pub const fn empty() -> Self {
        Self {
            folder: FilePath::new(),
            entries: Vec::new(),
        }
    }

    /// Read `folder`, keeping at most [`MAX_FOLDER_ENTRIES`] accepted entries.
    pub fn load(fs: &dyn FileSystem, folder: &str) -> Self {
        let mut listing = Self {
            folder: copy_path(folder),
            entries: Vec::new(),
        };
        // The internal flash holds no sub-folders.
        let flat = folder.starts_with("/local");

        let opened = fs.list(folder, &mut |name| {
            if !is_acceptable(name) || listing.entries.is_full() {
                return;
            }
            let mut entry_name = FileName::new();
            for c in name.chars() {
                if entry_name.push(c).is_err() {
                    break;
                }
            }
            let is_folder = !flat && fs.is_folder(&join(folder, name));
            let _ = listing.entries.push(Entry {
                name: entry_name,
                is_folder,
            });
        });
        if !opened {
            debug!("cannot open folder {}", folder);
        }
        listing
    }

    pub fn folder(&self) -> &str {
        if self.folder.is_empty() {
            ROOT_FOLDER
        } else {
            &self.folder
        }
    }

    pub fn is_root(&self) -> bool {
        self.folder() == ROOT_FOLDER
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn path_of(&self, entry: &Entry) -> FilePath {
        join(self.folder(), &entry.name)
    }
}

/// One row of the slot browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row<'a> {
    Parent,
    Entry(&'a Entry),
}

impl<'a> Row<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Row::Parent => PARENT_ENTRY,
            Row::Entry(entry) => &entry.name,
        }
    }
}

/// Outcome of selecting a file slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The browser moved to another folder; stay on the screen.
    Navigated,
    /// A G-code file was chosen.
    Play(FilePath),
    /// The slot is empty.
    Nothing,
}

/// Folder listing seen through a window of [`FILE_SLOTS`] rows.
///
/// Rows are `..` (except at the root) followed by the folder entries.
pub struct FileBrowser {
    listing: Listing,
    offset: usize,
}

impl FileBrowser {
    pub const fn new() -> Self {
        Self {
            listing: Listing::empty(),
            offset: 0,
        }
    }

    pub fn open(&mut self, fs: &dyn FileSystem, folder: &str) {
        self.listing = Listing::load(fs, folder);
        self.offset = 0;
        debug!(
            "browsing {} ({} entries)",
            self.listing.folder(),
            self.listing.entries().len()
        );
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    fn has_parent_row(&self) -> bool {
        !self.listing.is_root()
    }

    fn row_count(&self) -> usize {
        self.listing.entries().len() + usize::from(self.has_parent_row())
    }

    fn row(&self, row: usize) -> Option<Row<'_>> {
        match (self.has_parent_row(), row) {
            (true, 0) => Some(Row::Parent),
            (true, n) => self.listing.entries().get(n - 1).map(Row::Entry),
            (false, n) => self.listing.entries().get(n).map(Row::Entry),
        }
    }

    /// Row displayed in a window slot, if any.
    pub fn slot(&self, slot: usize) -> Option<Row<'_>> {
        self.row(self.offset + slot)
    }

    /// Scroll the window by one row. Returns whether it moved.
    pub fn shift(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Up if self.offset > 0 => {
                self.offset -= 1;
                true
            }
            Direction::Down if self.offset + FILE_SLOTS < self.row_count() => {
                self.offset += 1;
                true
            }
            _ => false,
        }
    }

    pub fn select(&mut self, slot: usize, fs: &dyn FileSystem) -> Selection {
        let target = match self.slot(slot) {
            None => return Selection::Nothing,
            Some(Row::Parent) => copy_path(parent_folder(self.listing.folder())),
            Some(Row::Entry(entry)) if entry.is_folder => self.listing.path_of(entry),
            Some(Row::Entry(entry)) if is_gcode(&entry.name) => {
                let path = self.listing.path_of(entry);
                info!("play requested: {}", path.as_str());
                return Selection::Play(path);
            }
            Some(Row::Entry(_)) => return Selection::Nothing,
        };
        self.open(fs, &target);
        Selection::Navigated
    }
}

impl Default for FileBrowser {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory filesystem double: a flat list of absolute paths, folders
/// marked with a trailing `/`.
#[cfg(test)]
pub struct MemoryFs {
    pub paths: std::vec::Vec<&'static str>,
}

#[cfg(test)]
impl FileSystem for MemoryFs {
    fn list(&self, folder: &str, visit: &mut dyn FnMut(&str)) -> bool {
        let prefix = if folder.ends_with('/') {
            std::string::String::from(folder)
        } else {
            std::format!("{}/", folder)
        };
        let mut found = folder == ROOT_FOLDER;
        for path in &self.paths {
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                let rest = rest.trim_end_matches('/');
                if !rest.is_empty() && !rest.contains('/') {
                    found = true;
                    visit(rest);
                }
            }
        }
        found
    }

    fn is_folder(&self, path: &str) -> bool {
        self.paths
            .iter()
            .any(|p| p.strip_suffix('/') == Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sd_card() -> MemoryFs {
        MemoryFs {
            paths: std::vec![
                "/sd/",
                "/sd/benchy.gcode",
                "/sd/notes.txt",
                "/sd/config",
                "/sd/System Volume Information/",
                "/sd/parts/",
                "/sd/parts/gear.G",
                "/sd/parts/bracket.gcode",
            ],
        }
    }

    #[test]
    fn acceptance_rules() {
        assert!(is_gcode("part.gcode"));
        assert!(is_gcode("PART.G"));
        assert!(!is_gcode("part.txt"));
        assert!(is_acceptable("folder"));
        assert!(!is_acceptable("config"));
        assert!(!is_acceptable("System Volume Information"));
        assert!(!is_acceptable("readme.md"));
        assert!(!is_acceptable(".."));
    }

    #[test]
    fn path_helpers() {
        assert_eq!(join("/", "sd").as_str(), "/sd");
        assert_eq!(join("/sd", "a.g").as_str(), "/sd/a.g");
        assert_eq!(parent_folder("/sd/parts"), "/sd");
        assert_eq!(parent_folder("/sd"), "/");
        assert_eq!(parent_folder("/"), "/");
    }

    #[test]
    fn listing_filters_entries() {
        let fs = sd_card();
        let listing = Listing::load(&fs, "/sd");
        let names: std::vec::Vec<&str> =
            listing.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["benchy.gcode", "parts"]);
        assert!(listing.entries()[1].is_folder);
        assert!(!listing.is_root());
    }

    #[test]
    fn browser_window_and_parent_row() {
        let fs = sd_card();
        let mut browser = FileBrowser::new();
        browser.open(&fs, "/sd");

        assert_eq!(browser.slot(0), Some(Row::Parent));
        assert_eq!(browser.slot(1).map(|r| r.name()), Some("benchy.gcode"));
        assert_eq!(browser.slot(2).map(|r| r.name()), Some("parts"));
        // Three rows fit exactly: nothing to scroll.
        assert!(!browser.shift(Direction::Down));
        assert!(!browser.shift(Direction::Up));
    }

    #[test]
    fn selecting_rows() {
        let fs = sd_card();
        let mut browser = FileBrowser::new();
        browser.open(&fs, "/sd");

        assert_eq!(browser.select(2, &fs), Selection::Navigated);
        assert_eq!(browser.listing().folder(), "/sd/parts");

        match browser.select(2, &fs) {
            Selection::Play(path) => assert_eq!(path.as_str(), "/sd/parts/bracket.gcode"),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(browser.select(0, &fs), Selection::Navigated);
        assert_eq!(browser.listing().folder(), "/sd");
    }

    #[test]
    fn root_has_no_parent_row() {
        let fs = sd_card();
        let mut browser = FileBrowser::new();
        browser.open(&fs, ROOT_FOLDER);
        assert_eq!(browser.slot(0).map(|r| r.name()), Some("sd"));
        assert_eq!(browser.slot(1), None);
        assert_eq!(browser.select(1, &fs), Selection::Nothing);
    }
}
