//! Unified error type for the panel.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (feature `defmt`) for on-target logging.

use core::fmt;

use crate::ui::graph::GroupId;

/// Top-level error type used across the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Menu graph construction
    /// A group handle that is not part of the arena.
    UnknownGroup(GroupId),

    /// An item index beyond the items of its group.
    IndexOutOfRange { group: GroupId, index: usize },

    /// Items, links and layout cells of a group differ in length.
    LengthMismatch { group: GroupId },

    /// A placeholder link was never patched.
    UnassignedLink { group: GroupId, index: usize },

    /// A link points at a group or item that does not exist.
    DanglingTarget { group: GroupId, index: usize },

    /// The group arena is at capacity.
    ArenaFull,

    /// A group has more items than the link table can hold.
    TooManyItems,

    // Runtime
    /// The command queue was full; the newest action was dropped.
    QueueFull,

    /// Flushing the display failed.
    Display,

    /// Reading persisted settings failed.
    Storage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownGroup(group) => write!(f, "unknown group {}", group.0),
            Error::IndexOutOfRange { group, index } => {
                write!(f, "index {} out of range in group {}", index, group.0)
            }
            Error::LengthMismatch { group } => {
                write!(f, "items, links and cells differ in group {}", group.0)
            }
            Error::UnassignedLink { group, index } => {
                write!(f, "link {} of group {} never assigned", index, group.0)
            }
            Error::DanglingTarget { group, index } => {
                write!(f, "link {} of group {} points nowhere", index, group.0)
            }
            Error::ArenaFull => f.write_str("menu arena full"),
            Error::TooManyItems => f.write_str("too many items in group"),
            Error::QueueFull => f.write_str("command queue full"),
            Error::Display => f.write_str("display error"),
            Error::Storage => f.write_str("settings storage error"),
        }
    }
}
