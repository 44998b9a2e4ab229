//! Editor Model: logical multi-line buffer, cursor, and input history.
//!
//! Everything in this module is pure data plus mutation operations.
//! No I/O happens here; out-of-range inputs are clamped, never rejected.

mod history;
mod model;

pub use history::{History, HISTORY_CAP};
pub use model::{is_word_boundary, Editor};
