//! Renderer: the bottom-region compositor and its output plumbing.
//!
//! Given a layout and the prior band height, the renderer emits the
//! minimal set of terminal writes to repaint the editor and status
//! line, and separately appends finished lines to the scrollback above
//! them.

mod output;
mod screen;
mod theme;

pub use output::OutputBuffer;
pub use screen::{AppendKind, Screen};
pub use theme::Theme;
