//! Local control panel for a motion controller.
//!
//! Everything the panel does without hardware lives in this library so
//! it can be tested on the host: the menu graph and its cursor, render
//! policies, button debounce, the deferred command queue and the panel
//! controller that ties them together.
//!
//! Usage: `cargo test --lib` (host) or
//! `cargo run --release --features embedded` (nRF52840 + probe-rs).
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].

#![cfg_attr(not(test), no_std)]

// Logging macros first: `macro_rules!` scoping is textual.
mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Core
// ═══════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod error;
pub mod machine;
pub mod queue;
pub mod registry;
pub mod state;

// ═══════════════════════════════════════════════════════════════════════════
// User interface
// ═══════════════════════════════════════════════════════════════════════════

pub mod files;
pub mod panel;
pub mod screens;
pub mod settings;
pub mod ui;

// ═══════════════════════════════════════════════════════════════════════════
// Machine-side modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod link;
pub mod spindle;

#[cfg(feature = "embedded")]
pub mod storage;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::panel::menus;

    #[test]
    fn shipped_screens_have_distinct_names() {
        let tree = menus::build().unwrap();
        let mut names: std::vec::Vec<&str> = tree.graph.iter().map(|(_, g)| g.name()).collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn error_messages_name_the_group() {
        let err = crate::Error::UnassignedLink {
            group: crate::ui::graph::GroupId(3),
            index: 1,
        };
        assert_eq!(std::format!("{}", err), "link 1 of group 3 never assigned");
    }
}
