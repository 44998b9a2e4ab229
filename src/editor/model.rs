//! The logical text buffer and cursor.

use super::history::History;

/// Characters that separate words for word motion and word deletion.
///
/// Space, tab, and a fixed punctuation set common in paths and code.
pub fn is_word_boundary(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '/' | '\\' | '-' | '[' | ']' | '(' | ')' | '{' | '}' | '.' | ','
    )
}

/// Byte offset of the `col`-th character of `line`.
fn byte_at(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
}

/// Number of characters in `line`.
fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Split `text` on line breaks. Bare `\n`, bare `\r`, and `\r\n` each
/// count as exactly one break.
fn split_breaks(text: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => parts.push(String::new()),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                parts.push(String::new());
            }
            c => {
                if let Some(last) = parts.last_mut() {
                    last.push(c);
                }
            }
        }
    }
    parts
}

/// A multi-line text buffer with a cursor and submission history.
///
/// The buffer always holds at least one line. The cursor column is a
/// character offset and may rest one past the final character of its
/// line. Mutations never fail; positions are clamped instead.
#[derive(Debug)]
pub struct Editor {
    /// Logical lines. Invariant: never empty.
    lines: Vec<String>,
    /// Cursor line, `0 <= cursor_line < lines.len()`.
    cursor_line: usize,
    /// Cursor column in characters, `0 <= cursor_col <= line chars`.
    cursor_col: usize,
    /// Remembered column for repeated vertical moves.
    preferred_col: Option<usize>,
    /// Previously submitted texts plus browsing state.
    history: History,
}

impl Editor {
    /// Create an empty editor: one empty line, cursor at the origin.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            preferred_col: None,
            history: History::new(),
        }
    }

    /// The logical lines of the buffer.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Current `(line, column)` cursor position, column in characters.
    pub const fn cursor(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    /// Whether the buffer is a single empty line.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// The submission history.
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Whether the editor is currently browsing history.
    pub const fn is_browsing_history(&self) -> bool {
        self.history.index().is_some()
    }

    /// Join all lines with `\n` into one string.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Move the cursor, clamping both coordinates into range.
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor_line = line.min(self.lines.len() - 1);
        self.cursor_col = col.min(char_len(&self.lines[self.cursor_line]));
    }

    fn current_line(&self) -> &str {
        &self.lines[self.cursor_line]
    }

    fn current_line_len(&self) -> usize {
        char_len(self.current_line())
    }

    // --- Cursor motion ---

    /// One character left, crossing to the end of the previous line at
    /// column zero.
    pub fn move_left(&mut self) {
        self.preferred_col = None;
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
        }
    }

    /// One character right, crossing to the start of the next line at
    /// end of line.
    pub fn move_right(&mut self) {
        self.preferred_col = None;
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    fn vertical_to(&mut self, line: usize) {
        let want = *self.preferred_col.get_or_insert(self.cursor_col);
        self.cursor_line = line;
        self.cursor_col = want.min(self.current_line_len());
    }

    /// One logical line up, keeping the preferred column when possible.
    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.vertical_to(self.cursor_line - 1);
        }
    }

    /// One logical line down, keeping the preferred column when possible.
    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.vertical_to(self.cursor_line + 1);
        }
    }

    /// Start of the current logical line.
    pub fn move_line_start(&mut self) {
        self.preferred_col = None;
        self.cursor_col = 0;
    }

    /// End of the current logical line.
    pub fn move_line_end(&mut self) {
        self.preferred_col = None;
        self.cursor_col = self.current_line_len();
    }

    /// First character of the entire buffer.
    pub fn move_buffer_start(&mut self) {
        self.preferred_col = None;
        self.cursor_line = 0;
        self.cursor_col = 0;
    }

    /// One past the last character of the entire buffer.
    pub fn move_buffer_end(&mut self) {
        self.preferred_col = None;
        self.cursor_line = self.lines.len() - 1;
        self.cursor_col = self.current_line_len();
    }

    /// Skip any separators to the left, then the word they delimit.
    pub fn move_word_left(&mut self) {
        self.preferred_col = None;
        if self.cursor_col == 0 {
            if self.cursor_line > 0 {
                self.cursor_line -= 1;
                self.cursor_col = self.current_line_len();
            }
            return;
        }
        let chars: Vec<char> = self.current_line().chars().collect();
        let mut col = self.cursor_col;
        while col > 0 && is_word_boundary(chars[col - 1]) {
            col -= 1;
        }
        while col > 0 && !is_word_boundary(chars[col - 1]) {
            col -= 1;
        }
        self.cursor_col = col;
    }

    /// Skip any separators to the right, then the word that follows.
    pub fn move_word_right(&mut self) {
        self.preferred_col = None;
        let len = self.current_line_len();
        if self.cursor_col >= len {
            if self.cursor_line + 1 < self.lines.len() {
                self.cursor_line += 1;
                self.cursor_col = 0;
            }
            return;
        }
        let chars: Vec<char> = self.current_line().chars().collect();
        let mut col = self.cursor_col;
        while col < len && is_word_boundary(chars[col]) {
            col += 1;
        }
        while col < len && !is_word_boundary(chars[col]) {
            col += 1;
        }
        self.cursor_col = col;
    }

    // --- Mutation ---

    /// Insert text at the cursor. Line breaks in `text` split the
    /// current line; the cursor ends up after the inserted text.
    pub fn insert(&mut self, text: &str) {
        self.preferred_col = None;
        let mut parts = split_breaks(text);
        let byte = byte_at(self.current_line(), self.cursor_col);
        let tail = self.lines[self.cursor_line].split_off(byte);
        let first = parts.remove(0);
        self.cursor_col += char_len(&first);
        self.lines[self.cursor_line].push_str(&first);
        if parts.is_empty() {
            self.lines[self.cursor_line].push_str(&tail);
            return;
        }
        let last_idx = parts.len() - 1;
        let mut insert_at = self.cursor_line + 1;
        for (i, mut part) in parts.into_iter().enumerate() {
            if i == last_idx {
                self.cursor_line = insert_at;
                self.cursor_col = char_len(&part);
                part.push_str(&tail);
            }
            self.lines.insert(insert_at, part);
            insert_at += 1;
        }
    }

    /// Delete the character before the cursor, merging with the
    /// previous line at column zero.
    pub fn delete_back(&mut self) {
        self.preferred_col = None;
        if self.cursor_col > 0 {
            let start = byte_at(self.current_line(), self.cursor_col - 1);
            let end = byte_at(self.current_line(), self.cursor_col);
            self.lines[self.cursor_line].replace_range(start..end, "");
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let removed = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.lines[self.cursor_line].push_str(&removed);
        }
    }

    /// Delete the character at the cursor, merging with the next line
    /// at end of line.
    pub fn delete_forward(&mut self) {
        self.preferred_col = None;
        if self.cursor_col < self.current_line_len() {
            let start = byte_at(self.current_line(), self.cursor_col);
            let end = byte_at(self.current_line(), self.cursor_col + 1);
            self.lines[self.cursor_line].replace_range(start..end, "");
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
        }
    }

    /// Delete from the start of the line to the cursor.
    pub fn delete_to_line_start(&mut self) {
        self.preferred_col = None;
        let end = byte_at(self.current_line(), self.cursor_col);
        self.lines[self.cursor_line].replace_range(..end, "");
        self.cursor_col = 0;
    }

    /// Delete from the cursor to the end of the line.
    pub fn delete_to_line_end(&mut self) {
        self.preferred_col = None;
        let start = byte_at(self.current_line(), self.cursor_col);
        self.lines[self.cursor_line].truncate(start);
    }

    /// Delete forward to the next word edge.
    ///
    /// On a separator, the entire contiguous run of separators is
    /// removed. Otherwise the run of word characters is removed,
    /// stopping before the first separator. At end of line this merges
    /// with the next line instead.
    pub fn delete_word_forward(&mut self) {
        self.preferred_col = None;
        let len = self.current_line_len();
        if self.cursor_col >= len {
            self.delete_forward();
            return;
        }
        let chars: Vec<char> = self.current_line().chars().collect();
        let mut end = self.cursor_col;
        if is_word_boundary(chars[end]) {
            while end < len && is_word_boundary(chars[end]) {
                end += 1;
            }
        } else {
            while end < len && !is_word_boundary(chars[end]) {
                end += 1;
            }
        }
        let from = byte_at(self.current_line(), self.cursor_col);
        let to = byte_at(self.current_line(), end);
        self.lines[self.cursor_line].replace_range(from..to, "");
    }

    /// Delete backward to the previous word edge, with the same
    /// separator-run rule as [`Self::delete_word_forward`]. At column
    /// zero this merges with the previous line instead.
    pub fn delete_word_back(&mut self) {
        self.preferred_col = None;
        if self.cursor_col == 0 {
            self.delete_back();
            return;
        }
        let chars: Vec<char> = self.current_line().chars().collect();
        let mut start = self.cursor_col;
        if is_word_boundary(chars[start - 1]) {
            while start > 0 && is_word_boundary(chars[start - 1]) {
                start -= 1;
            }
        } else {
            while start > 0 && !is_word_boundary(chars[start - 1]) {
                start -= 1;
            }
        }
        let from = byte_at(self.current_line(), start);
        let to = byte_at(self.current_line(), self.cursor_col);
        self.lines[self.cursor_line].replace_range(from..to, "");
        self.cursor_col = start;
    }

    /// Replace the entire buffer with `text`, cursor at the end.
    pub fn reset(&mut self, text: &str) {
        self.preferred_col = None;
        self.lines = split_breaks(text);
        self.cursor_line = self.lines.len() - 1;
        self.cursor_col = char_len(&self.lines[self.cursor_line]);
    }

    /// Reset to a single empty line and forget any history draft.
    pub fn clear(&mut self) {
        self.preferred_col = None;
        self.lines = vec![String::new()];
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.history.discard_draft();
    }

    // --- History ---

    /// Record a submission in history and leave browsing mode.
    pub fn commit_history(&mut self, text: &str) {
        self.history.push(text);
    }

    /// Load the next older history entry.
    ///
    /// Entering browsing captures the current buffer as a draft when it
    /// is non-empty. Repeated calls stop at the oldest entry.
    pub fn history_back(&mut self) {
        let current = self.text();
        if let Some(entry) = self.history.step_back(&current) {
            self.reset(&entry);
        }
    }

    /// Load the next newer history entry.
    ///
    /// Stepping past the newest entry exits browsing and restores the
    /// draft if one was captured, otherwise clears the buffer.
    pub fn history_forward(&mut self) {
        match self.history.step_forward() {
            super::history::Forward::Entry(entry) => self.reset(&entry),
            super::history::Forward::Draft(draft) => self.reset(&draft),
            super::history::Forward::Cleared => {
                self.lines = vec![String::new()];
                self.cursor_line = 0;
                self.cursor_col = 0;
                self.preferred_col = None;
            }
            super::history::Forward::NotBrowsing => {}
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(text: &str) -> Editor {
        let mut e = Editor::new();
        e.reset(text);
        e
    }

    #[test]
    fn starts_with_one_empty_line() {
        let e = Editor::new();
        assert_eq!(e.lines(), &[String::new()]);
        assert_eq!(e.cursor(), (0, 0));
        assert!(e.is_empty());
    }

    #[test]
    fn insert_splits_on_all_break_kinds() {
        let mut e = Editor::new();
        e.insert("a\nb\rc\r\nd");
        assert_eq!(e.lines(), &["a", "b", "c", "d"]);
        assert_eq!(e.cursor(), (3, 1));
    }

    #[test]
    fn insert_mid_line_preserves_tail() {
        let mut e = editor_with("hello");
        e.set_cursor(0, 2);
        e.insert("X\nY");
        assert_eq!(e.lines(), &["heX", "Yllo"]);
        assert_eq!(e.cursor(), (1, 1));
    }

    #[test]
    fn backspace_merges_lines() {
        let mut e = editor_with("ab\ncd");
        e.set_cursor(1, 0);
        e.delete_back();
        assert_eq!(e.lines(), &["abcd"]);
        assert_eq!(e.cursor(), (0, 2));
    }

    #[test]
    fn delete_forward_merges_lines() {
        let mut e = editor_with("ab\ncd");
        e.set_cursor(0, 2);
        e.delete_forward();
        assert_eq!(e.lines(), &["abcd"]);
        assert_eq!(e.cursor(), (0, 2));
    }

    #[test]
    fn left_right_cross_line_boundaries() {
        let mut e = editor_with("ab\ncd");
        e.set_cursor(0, 2);
        e.move_right();
        assert_eq!(e.cursor(), (1, 0));
        e.move_left();
        assert_eq!(e.cursor(), (0, 2));
    }

    #[test]
    fn vertical_motion_keeps_preferred_column() {
        let mut e = editor_with("long line here\nab\nanother long line");
        e.set_cursor(0, 10);
        e.move_down();
        assert_eq!(e.cursor(), (1, 2));
        e.move_down();
        assert_eq!(e.cursor(), (2, 10));
    }

    #[test]
    fn word_motion_skips_separator_runs() {
        let mut e = editor_with("foo  bar/baz");
        e.move_buffer_start();
        e.move_word_right();
        assert_eq!(e.cursor(), (0, 3));
        e.move_word_right();
        assert_eq!(e.cursor(), (0, 8));
        e.move_word_left();
        assert_eq!(e.cursor(), (0, 5));
    }

    #[test]
    fn delete_word_forward_removes_separator_run_only() {
        let mut e = editor_with("foo/bar");
        e.set_cursor(0, 3);
        e.delete_word_forward();
        assert_eq!(e.lines(), &["foobar"]);
        assert_eq!(e.cursor(), (0, 3));
    }

    #[test]
    fn delete_word_forward_stops_before_separator() {
        let mut e = editor_with("foo bar");
        e.set_cursor(0, 4);
        e.delete_word_forward();
        assert_eq!(e.lines(), &["foo "]);
    }

    #[test]
    fn delete_word_back_removes_word_run() {
        let mut e = editor_with("foo bar");
        e.move_buffer_end();
        e.delete_word_back();
        assert_eq!(e.lines(), &["foo "]);
        e.delete_word_back();
        assert_eq!(e.lines(), &["foo"]);
    }

    #[test]
    fn line_kills() {
        let mut e = editor_with("hello world");
        e.set_cursor(0, 5);
        e.delete_to_line_end();
        assert_eq!(e.lines(), &["hello"]);
        e.delete_to_line_start();
        assert_eq!(e.lines(), &[""]);
        assert_eq!(e.cursor(), (0, 0));
    }

    #[test]
    fn serialize_reset_round_trip() {
        let mut e = editor_with("one\ntwo\n\nthree");
        let text = e.text();
        e.reset(&text);
        assert_eq!(e.text(), text);
    }

    #[test]
    fn invariants_hold_under_edit_sequences() {
        let mut e = Editor::new();
        e.insert("abc\ndef");
        e.delete_back();
        e.delete_back();
        e.delete_back();
        e.delete_back();
        e.delete_forward();
        e.delete_to_line_start();
        e.delete_word_back();
        assert!(!e.lines().is_empty());
        let (line, col) = e.cursor();
        assert!(line < e.lines().len());
        assert!(col <= e.lines()[line].chars().count());
    }

    #[test]
    fn clear_resets_to_origin() {
        let mut e = editor_with("some\ntext");
        e.clear();
        assert!(e.is_empty());
        assert_eq!(e.cursor(), (0, 0));
    }

    #[test]
    fn set_cursor_clamps() {
        let mut e = editor_with("ab");
        e.set_cursor(10, 10);
        assert_eq!(e.cursor(), (0, 2));
    }

    #[test]
    fn unicode_columns_are_char_based() {
        let mut e = editor_with("héllo");
        e.set_cursor(0, 2);
        e.delete_back();
        assert_eq!(e.lines(), &["hllo"]);
        assert_eq!(e.cursor(), (0, 1));
    }
}
