//! Screen geometry: one cell per item slot.

/// Pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dimensions {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Dimensions {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// How a cell is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderPolicy {
    /// Outline box, caption in normal ink.
    Default,
    /// Filled box, inverted caption.
    Active,
}

/// An item slot: its rectangle and the policies used when the slot is
/// unselected and selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub area: Dimensions,
    pub idle: RenderPolicy,
    pub selected: RenderPolicy,
}

impl Cell {
    /// Cell with the stock policies.
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            area: Dimensions::new(x, y, w, h),
            idle: RenderPolicy::Default,
            selected: RenderPolicy::Active,
        }
    }

    pub fn policy(&self, selected: bool) -> RenderPolicy {
        if selected {
            self.selected
        } else {
            self.idle
        }
    }
}

/// Ordered cells of a screen. Cell `i` holds item `i`.
#[derive(Debug)]
pub struct Layout {
    cells: &'static [Cell],
}

impl Layout {
    pub const fn new(cells: &'static [Cell]) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &'static [Cell] {
        self.cells
    }

    /// `(cell, item, policy)` for every slot, the policy chosen by
    /// whether the slot index equals `selected`.
    pub fn slots<'i, T>(
        &self,
        items: &'i [T],
        selected: usize,
    ) -> impl Iterator<Item = (&'static Cell, &'i T, RenderPolicy)> + 'i {
        self.cells
            .iter()
            .zip(items)
            .enumerate()
            .map(move |(index, (cell, item))| (cell, item, cell.policy(index == selected)))
    }
}

// Stock layouts for the 128×64 panel.

/// 3 × 2 grid of large buttons, filled column by column so Up/Down
/// moves vertically first.
pub static GRID_6: Layout = Layout::new(&[
    Cell::new(0, 0, 43, 32),
    Cell::new(0, 32, 43, 32),
    Cell::new(43, 0, 43, 32),
    Cell::new(43, 32, 43, 32),
    Cell::new(86, 0, 42, 32),
    Cell::new(86, 32, 42, 32),
]);

/// Four full-width rows without side margin.
pub static ROWS_4: Layout = Layout::new(&[
    Cell::new(0, 0, 128, 16),
    Cell::new(0, 16, 128, 16),
    Cell::new(0, 32, 128, 16),
    Cell::new(0, 48, 128, 16),
]);

pub static STACK_3: Layout = Layout::new(&[
    Cell::new(2, 0, 124, 21),
    Cell::new(2, 21, 124, 22),
    Cell::new(2, 42, 124, 22),
]);

pub static STACK_4: Layout = Layout::new(&[
    Cell::new(2, 0, 124, 16),
    Cell::new(2, 16, 124, 16),
    Cell::new(2, 32, 124, 16),
    Cell::new(2, 48, 124, 16),
]);

pub static STACK_5: Layout = Layout::new(&[
    Cell::new(2, 0, 124, 13),
    Cell::new(2, 13, 124, 13),
    Cell::new(2, 26, 124, 13),
    Cell::new(2, 39, 124, 13),
    Cell::new(2, 52, 124, 12),
]);

/// Question and answer halves.
pub static MODAL_2: Layout = Layout::new(&[Cell::new(0, 0, 128, 32), Cell::new(0, 32, 128, 32)]);

/// Whole screen.
pub static SPLASH: Layout = Layout::new(&[Cell::new(0, 0, 128, 64)]);
