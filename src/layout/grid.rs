//! The visual grid: wrapped rows, cursor mapping, and vertical motion
//! across wrapped segments.

use super::wrap::{wrap_line, Segment};
use crate::editor::Editor;

/// Rows the bottom region reserves beyond the wrapped text itself: one
/// blank separator above, one blank row below, one status row.
pub const CHROME_ROWS: usize = 3;

/// Derived visual form of an [`Editor`] at a given content width.
///
/// Recomputed on every draw and discarded; never persisted.
#[derive(Debug)]
pub struct Layout {
    /// Visual rows in order, one string per wrapped segment.
    pub rows: Vec<String>,
    /// Row index of the cursor within `rows`.
    pub cursor_row: usize,
    /// Character offset of the cursor within its row.
    pub cursor_col: usize,
}

impl Layout {
    /// Bottom-region rows this layout needs, chrome included.
    pub fn required_height(&self) -> usize {
        self.rows.len() + CHROME_ROWS
    }
}

/// One row of the visual map: which logical line it slices, and where.
#[derive(Debug, Clone, Copy)]
struct VisualRow {
    line: usize,
    segment: Segment,
    last_of_line: bool,
}

fn build_rows(editor: &Editor, width: usize) -> Vec<VisualRow> {
    let mut rows = Vec::new();
    for (line_idx, line) in editor.lines().iter().enumerate() {
        let segments = wrap_line(line, width);
        let last = segments.len() - 1;
        for (seg_idx, segment) in segments.into_iter().enumerate() {
            rows.push(VisualRow {
                line: line_idx,
                segment,
                last_of_line: seg_idx == last,
            });
        }
    }
    rows
}

/// A cursor position belongs to a segment when it falls within
/// `[start, end)`, or equals `end` exactly on the last segment of its
/// line (the cursor may rest just past the final character).
fn owns_cursor(row: &VisualRow, col: usize) -> bool {
    (col >= row.segment.start && col < row.segment.end())
        || (row.last_of_line && col == row.segment.end())
}

fn cursor_row_index(rows: &[VisualRow], editor: &Editor) -> usize {
    let (line, col) = editor.cursor();
    rows.iter()
        .position(|row| row.line == line && owns_cursor(row, col))
        .unwrap_or(0)
}

/// Wrap every logical line of `editor` at `width` and locate the cursor
/// in visual coordinates.
pub fn compute_layout(editor: &Editor, width: usize) -> Layout {
    let visual = build_rows(editor, width);
    let cursor_row = cursor_row_index(&visual, editor);
    let (_, col) = editor.cursor();
    let cursor_col = col.saturating_sub(visual.get(cursor_row).map_or(0, |r| r.segment.start));
    let rows: Vec<String> = visual
        .iter()
        .map(|row| {
            let chars: Vec<char> = editor.lines()[row.line].chars().collect();
            chars[row.segment.start..row.segment.end()].iter().collect()
        })
        .collect();
    if rows.is_empty() {
        // Unreachable given the empty-line rule, but guarded.
        return Layout {
            rows: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
        };
    }
    Layout {
        rows,
        cursor_row,
        cursor_col,
    }
}

/// Whether the cursor sits on the first visual row.
pub fn on_first_visual_row(editor: &Editor, width: usize) -> bool {
    let rows = build_rows(editor, width);
    cursor_row_index(&rows, editor) == 0
}

/// Whether the cursor sits on the last visual row.
pub fn on_last_visual_row(editor: &Editor, width: usize) -> bool {
    let rows = build_rows(editor, width);
    cursor_row_index(&rows, editor) + 1 == rows.len()
}

fn move_to_row(editor: &mut Editor, rows: &[VisualRow], from: usize, to: usize) {
    let (_, col) = editor.cursor();
    let offset = col.saturating_sub(rows[from].segment.start);
    let target = rows[to];
    // The offset may rest at segment end only on the last segment of a
    // line; anywhere else that position belongs to the next segment.
    let max_offset = if target.last_of_line {
        target.segment.len
    } else {
        target.segment.len.saturating_sub(1)
    };
    let clamped = offset.min(max_offset);
    editor.set_cursor(target.line, target.segment.start + clamped);
}

/// Move the cursor one visual row up, staying within the same logical
/// line's earlier segment when one exists, otherwise entering the last
/// segment of the previous logical line. The offset within the segment
/// is preserved, clamped to the destination's bounds.
pub fn move_visual_up(editor: &mut Editor, width: usize) {
    let rows = build_rows(editor, width);
    let current = cursor_row_index(&rows, editor);
    if current > 0 {
        move_to_row(editor, &rows, current, current - 1);
    }
}

/// Move the cursor one visual row down; symmetric to
/// [`move_visual_up`].
pub fn move_visual_down(editor: &mut Editor, width: usize) {
    let rows = build_rows(editor, width);
    let current = cursor_row_index(&rows, editor);
    if current + 1 < rows.len() {
        move_to_row(editor, &rows, current, current + 1);
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
    fn empty_editor_has_one_row_and_origin_cursor() {
        let layout = compute_layout(&Editor::new(), 10);
        assert_eq!(layout.rows, vec![String::new()]);
        assert_eq!((layout.cursor_row, layout.cursor_col), (0, 0));
        assert_eq!(layout.required_height(), 4);
    }

    #[test]
    fn rows_concatenate_across_logical_lines() {
        let e = editor_with("hello world foo\nbar");
        let layout = compute_layout(&e, 7);
        assert_eq!(layout.rows, vec!["hello ", "world ", "foo", "bar"]);
    }

    #[test]
    fn cursor_rests_past_final_character_of_last_segment() {
        let e = editor_with("hello world foo");
        let layout = compute_layout(&e, 7);
        assert_eq!((layout.cursor_row, layout.cursor_col), (2, 3));
    }

    #[test]
    fn cursor_at_segment_boundary_belongs_to_next_segment() {
        let mut e = editor_with("abcdef");
        e.set_cursor(0, 3);
        let layout = compute_layout(&e, 3);
        assert_eq!((layout.cursor_row, layout.cursor_col), (1, 0));
    }

    #[test]
    fn visual_up_moves_within_a_wrapped_line() {
        let mut e = editor_with("abc def ghi");
        e.set_cursor(0, 9);
        move_visual_up(&mut e, 4);
        assert_eq!(e.cursor(), (0, 5));
        move_visual_up(&mut e, 4);
        assert_eq!(e.cursor(), (0, 1));
    }

    #[test]
    fn visual_down_enters_next_logical_line() {
        let mut e = editor_with("ab\ncd");
        e.set_cursor(0, 1);
        move_visual_down(&mut e, 10);
        assert_eq!(e.cursor(), (1, 1));
    }

    #[test]
    fn visual_motion_clamps_offset_to_destination() {
        let mut e = editor_with("abcdefgh\nxy");
        e.set_cursor(0, 7);
        move_visual_down(&mut e, 20);
        assert_eq!(e.cursor(), (1, 2));
    }

    #[test]
    fn boundary_row_queries() {
        let mut e = editor_with("hello world foo");
        e.set_cursor(0, 0);
        assert!(on_first_visual_row(&e, 7));
        assert!(!on_last_visual_row(&e, 7));
        e.set_cursor(0, 14);
        assert!(on_last_visual_row(&e, 7));
    }

    #[test]
    fn single_unwrapped_line_is_both_first_and_last_row() {
        let e = editor_with("short");
        assert!(on_first_visual_row(&e, 40));
        assert!(on_last_visual_row(&e, 40));
    }
}
