//! Greedy word wrap of one logical line into bounded-width segments.

/// One visually wrapped slice of a logical line.
///
/// `start` and `len` are character offsets into the line, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Character offset of the first character of the slice.
    pub start: usize,
    /// Number of characters in the slice.
    pub len: usize,
}

impl Segment {
    /// Character offset one past the last character of the slice.
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Wrap `line` into segments of at most `width` characters.
///
/// The effective width is at least 1. An empty line yields exactly one
/// zero-length segment so it still occupies a visual row. When a break
/// is needed mid-line, the last space inside the window wins and stays
/// with the preceding segment; with no space in the window the line is
/// hard-broken at the width boundary. Every produced segment of a
/// non-empty line has length >= 1, guaranteeing forward progress.
pub fn wrap_line(line: &str, width: usize) -> Vec<Segment> {
    let width = width.max(1);
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![Segment { start: 0, len: 0 }];
    }
    let mut segments = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let remaining = chars.len() - start;
        if remaining <= width {
            segments.push(Segment { start, len: remaining });
            break;
        }
        let window = &chars[start..start + width];
        let brk = window
            .iter()
            .rposition(|&c| c == ' ')
            .map_or(width, |i| i + 1);
        let len = brk.max(1);
        segments.push(Segment { start, len });
        start += len;
    }
    segments
}
