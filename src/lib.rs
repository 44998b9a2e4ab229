//! # Tideline
//!
//! An embeddable scrollback-friendly editor pinned to the bottom of
//! the terminal.
//!
//! Tideline keeps a persistent multi-line input editor at the bottom of
//! the screen, with a status line above it and a growing scrollback
//! region above that. Host applications interleave asynchronous
//! background output (log lines, events) with live user text entry
//! without corrupting the display.
//!
//! ## Core concepts
//!
//! - **Editor model**: logical buffer, cursor, and bounded input
//!   history with draft preservation; pure data, no I/O
//! - **Soft-wrap layout**: pure mapping from the buffer to bounded-width
//!   visual rows and back, for vertical cursor travel
//! - **Bottom-region compositor**: repaints only the reserved bottom
//!   band, auto-growing it without flicker or scroll jumps
//! - **Event bus**: one FIFO queue, many producers, a single consuming
//!   loop that owns every terminal write
//!
//! ## Example
//!
//! ```rust,ignore
//! use tideline::{Engine, EngineConfig};
//!
//! let engine = Engine::with_config(EngineConfig::default())?;
//! let handle = engine.handle();
//!
//! std::thread::spawn(move || {
//!     handle.print(["background output goes above the editor"]);
//! });
//!
//! engine.run(|text| println!("submitted: {text}"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod editor;
pub mod engine;
pub mod layout;
pub mod render;

// Re-exports for convenience
pub use editor::{Editor, History, HISTORY_CAP};
pub use engine::{Engine, EngineConfig, EngineHandle, KeyCode, KeyEvent, KeyMods, UiEvent};
pub use layout::{compute_layout, wrap_line, Layout, Segment};
pub use render::{AppendKind, Screen, Theme};
