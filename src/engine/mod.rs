//! Event Bus & Engine Loop: message-passing concurrency for the
//! bottom-of-screen editor.
//!
//! - **Input reader**: polls terminal keys on its own thread, forwards
//!   decoded keys onto the bus.
//! - **Host producers**: any number of threads holding an
//!   [`EngineHandle`] enqueue scrollback output and status updates.
//! - **Engine loop**: the single consumer; drains the bus in FIFO
//!   order, mutates the editor, and owns every terminal write.
//!
//! ```text
//! ┌──────────────┐      UiEvent::Key       ┌──────────────┐
//! │ Input Thread │ ──────────────────────▶ │              │
//! └──────────────┘                         │ Engine Loop  │──▶ terminal
//! ┌──────────────┐  UiEvent::Append/Status │              │
//! │ Host Threads │ ──────────────────────▶ │              │
//! └──────────────┘                         └──────────────┘
//! ```

#[allow(clippy::module_inception)]
mod engine;
mod event;
mod input;

pub use engine::{Engine, EngineConfig, EngineHandle};
pub use event::{KeyCode, KeyEvent, KeyMods, UiEvent};
pub use input::InputReader;
