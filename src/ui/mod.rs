//! User interface subsystem - menu graph, navigation cursor and rendering.
//!
//! The UI is a fixed graph of screens ([`graph::Group`]) built once at
//! startup. A [`widget::Widget`] walks that graph in response to button
//! events and renders the current screen through its [`layout::Layout`]
//! onto a [`surface::Surface`].
//!
//! ## Components
//!
//! - **Buttons**: 3 tactile switches sampled at a fixed rate (UP, DOWN, SELECT)
//! - **Graph**: screens, items and the links between them
//! - **Render**: one drawing routine per (policy, item kind)
//! - **Display**: SSD1306 128×64 OLED via embedded-graphics

pub mod buttons;
#[cfg(any(test, feature = "embedded"))]
pub mod display;
pub mod graph;
pub mod input_logic;
pub mod item;
pub mod layout;
pub mod render;
pub mod surface;
pub mod widget;

/// Events the widget reacts to.
///
/// Up/Down/Ok are synthesized from button activations (SELECT maps to
/// Ok); Tick is emitted once per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Tick,
    Up,
    Down,
    Ok,
}

/// Direction of a saturated cursor move, handed to edge hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}
