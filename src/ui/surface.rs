//! Drawing primitives the renderer issues.
//!
//! A [`Surface`] is a monochrome raster: rectangles and single-line text
//! in a fixed monospace font. The OLED adapter lives in `ui::display`.

use crate::error::Error;

/// Text colour relative to the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ink {
    /// Lit pixels on a dark background.
    Normal,
    /// Dark pixels, for text inside a filled box.
    Inverted,
}

pub trait Surface {
    fn clear(&mut self);

    fn draw_rectangle(&mut self, x: i32, y: i32, w: u32, h: u32, filled: bool);

    /// Print `text` with its top-left corner at `(x, y)`.
    fn print(&mut self, x: i32, y: i32, text: &str, ink: Ink);

    /// Push the finished frame to the panel.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// One recorded drawing call.
#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Clear,
    Rect {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        filled: bool,
    },
    Text {
        x: i32,
        y: i32,
        text: std::string::String,
        ink: Ink,
    },
}

/// Surface double that records every call.
#[cfg(test)]
#[derive(Default)]
pub struct Recorder {
    pub ops: std::vec::Vec<Op>,
    pub frames: usize,
}

#[cfg(test)]
impl Recorder {
    /// Every printed string, in drawing order.
    pub fn texts(&self) -> std::vec::Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Surface for Recorder {
    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(Op::Clear);
    }

    fn draw_rectangle(&mut self, x: i32, y: i32, w: u32, h: u32, filled: bool) {
        self.ops.push(Op::Rect { x, y, w, h, filled });
    }

    fn print(&mut self, x: i32, y: i32, text: &str, ink: Ink) {
        self.ops.push(Op::Text {
            x,
            y,
            text: text.into(),
            ink,
        });
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.frames += 1;
        Ok(())
    }
}
