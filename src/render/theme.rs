//! Region colors for the bottom region and scrollback.

use crossterm::style::Color;

/// Colors applied per screen region.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Prompt and continuation prefix of the live editor.
    pub prompt: Color,
    /// Live editor text.
    pub editor: Color,
    /// Submitted input echoed to scrollback.
    pub history: Color,
    /// Plain scrollback output.
    pub scrollback: Color,
    /// Error-styled scrollback output.
    pub error: Color,
    /// The status line.
    pub status: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prompt: Color::Cyan,
            editor: Color::Reset,
            history: Color::DarkCyan,
            scrollback: Color::Reset,
            error: Color::Red,
            status: Color::DarkGrey,
        }
    }
}
