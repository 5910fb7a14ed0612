//! Viewport math for the process table.

/// Lines taken by the header and footer around the table.
pub const CHROME_ROWS: usize = 14;
/// Smallest number of table rows ever shown.
pub const MIN_VISIBLE_ROWS: usize = 5;

/// Table height for a terminal with `terminal_rows` rows.
///
/// `terminal_rows - 14`, clamped to `[5, max_rows]`.
pub fn viewport_height(terminal_rows: u16, max_rows: usize) -> usize {
    (terminal_rows as usize)
        .saturating_sub(CHROME_ROWS)
        .clamp(MIN_VISIBLE_ROWS, max_rows.max(MIN_VISIBLE_ROWS))
}

/// New scroll offset that keeps `selected` visible.
///
/// Scrolls up to `selected` when it is above the window, down so it is the
/// last visible row when it is below, and otherwise leaves the offset alone.
pub fn window(len: usize, selected: usize, height: usize, current_offset: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let height = height.max(1);

    if selected < current_offset {
        selected
    } else if selected >= current_offset + height {
        selected + 1 - height
    } else {
        current_offset
    }
}
