//! Layout Engine: pure mapping from an editor snapshot plus a content
//! width to wrapped visual rows and a visual cursor position.

mod grid;
mod wrap;

pub use grid::{
    compute_layout, move_visual_down, move_visual_up, on_first_visual_row, on_last_visual_row,
    Layout, CHROME_ROWS,
};
pub use wrap::{wrap_line, Segment};
