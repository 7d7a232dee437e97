//! Cursor arithmetic shared by the widget and the screen-class lister.
//!
//! Both directions saturate: the cursor never wraps around.

/// Move selection cursor one item up.
pub fn select_prev(selected: usize) -> usize {
    selected.saturating_sub(1)
}

/// Move selection cursor one item down if another item exists.
pub fn select_next(selected: usize, item_count: usize) -> usize {
    if selected + 1 < item_count {
        selected + 1
    } else {
        selected
    }
}

/// Clamp a cursor into `[0, item_count)`. An empty list pins it at 0.
pub fn clamp_index(selected: usize, item_count: usize) -> usize {
    selected.min(item_count.saturating_sub(1))
}
