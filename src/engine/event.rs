//! Event types carried on the bus between producers and the engine
//! loop.

use bitflags::bitflags;

use crate::render::AppendKind;

/// Key codes for keyboard input.
///
/// A simplified subset of the terminal backend's key space; keys the
/// engine never binds are not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab key.
    Tab,
    /// Delete key.
    Delete,
    /// Escape key.
    Esc,
}

bitflags! {
    /// Modifier keys held during a keypress.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyMods: u8 {
        /// Shift key held.
        const SHIFT = 1;
        /// Control key held.
        const CONTROL = 1 << 1;
        /// Alt/Option key held.
        const ALT = 1 << 2;
        /// Super/Command/Windows key held.
        const SUPER = 1 << 3;
    }
}

/// One decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Modifiers held during the keypress.
    pub mods: KeyMods,
}

/// Events consumed by the engine loop, in FIFO order.
///
/// Producers transfer ownership of the payload to the bus; the loop
/// consumes each event exactly once.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A decoded keypress from the input reader.
    Key(KeyEvent),
    /// Finished lines to append to the scrollback.
    Append {
        /// The lines, one scrollback line each.
        lines: Vec<String>,
        /// Styling to apply.
        kind: AppendKind,
    },
    /// Replace the transient status message.
    Status(String),
}
