//! The bottom-region compositor.
//!
//! `Screen` owns the terminal output stream and repaints the reserved
//! bottom band (editor rows plus status line) either in place or
//! sequentially after scrollback has been appended above it. It also
//! maintains the sticky height high-water mark that keeps the band from
//! shrinking mid-edit.

use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::output::OutputBuffer;
use super::theme::Theme;
use crate::editor::Editor;
use crate::layout::{compute_layout, wrap_line, Layout, CHROME_ROWS};

/// Styling applied to a batch of scrollback lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendKind {
    /// Arbitrary producer output.
    Plain,
    /// Error-styled producer output.
    Error,
    /// Submitted editor input, wrapped and prefixed like the live
    /// editor.
    History,
}

/// Ratchet the sticky high-water mark against the currently desired
/// band height and return the effective reserved height.
///
/// The mark is seeded by the first computed height, only ever grows
/// while held, and is cleared (forcing re-seeding) on submission.
pub(crate) fn ratchet(sticky: &mut usize, desired: usize) -> usize {
    if *sticky == 0 || desired > *sticky {
        *sticky = desired;
    }
    *sticky
}

/// Rows a repaint must erase: the band currently on screen or the new
/// band, whichever is taller. Records `reserved` as the newly painted
/// height.
///
/// After a submission resets the sticky mark, the next paint reserves
/// fewer rows than the band still occupying the screen; erasing only
/// the new extent would leave the top of the old band behind.
fn erase_extent(painted: &mut usize, reserved: usize) -> usize {
    let extent = (*painted).max(reserved);
    *painted = reserved;
    extent
}

/// Truncate `text` to at most `max` terminal columns, breaking between
/// graphemes.
fn truncate_to_width(text: &str, max: usize) -> &str {
    let mut used = 0;
    let mut end = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > max {
            break;
        }
        used += w;
        end += grapheme.len();
    }
    &text[..end]
}

/// Terminal column of the cursor within `row`, counting `cursor_col`
/// characters from the start.
fn cursor_column(row: &str, cursor_col: usize) -> usize {
    let byte = row
        .char_indices()
        .nth(cursor_col)
        .map_or(row.len(), |(i, _)| i);
    row[..byte].width()
}

#[allow(clippy::cast_possible_truncation)]
fn to_u16(value: usize) -> u16 {
    value.min(usize::from(u16::MAX)) as u16
}

/// Owner of the terminal stream and the bottom-region draw state.
///
/// All composite updates (in-place redraws and scrollback appends) are
/// built into an [`OutputBuffer`] and flushed in one syscall. A
/// `Screen` is owned and driven by a single loop, which is what keeps
/// composite updates from interleaving their writes.
#[derive(Debug)]
pub struct Screen {
    out: OutputBuffer,
    stdout: Stdout,
    theme: Theme,
    prompt: String,
    continuation: String,
    prompt_width: usize,
    sticky_height: usize,
    /// Band height of the last paint, still occupying the screen.
    painted: usize,
    status: String,
}

impl Screen {
    /// Create a screen writing to stdout.
    ///
    /// `prompt_width` overrides the display width of the prefixes when
    /// they carry sequences the width calculation cannot see.
    pub fn new(
        theme: Theme,
        prompt: impl Into<String>,
        continuation: impl Into<String>,
        prompt_width: Option<usize>,
    ) -> Self {
        let prompt = prompt.into();
        let continuation = continuation.into();
        let prompt_width =
            prompt_width.unwrap_or_else(|| prompt.width().max(continuation.width()));
        Self {
            out: OutputBuffer::new(),
            stdout: io::stdout(),
            theme,
            prompt,
            continuation,
            prompt_width,
            sticky_height: 0,
            painted: 0,
            status: String::new(),
        }
    }

    /// Replace the transient status message.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Clear the sticky high-water mark so the next draw recomputes the
    /// reserved height from scratch.
    pub fn reset_sticky(&mut self) {
        self.sticky_height = 0;
    }

    /// Columns available to editor text after the prompt prefix.
    pub fn content_width(&self, terminal_width: u16) -> usize {
        usize::from(terminal_width)
            .saturating_sub(self.prompt_width)
            .max(1)
    }

    /// Repaint the bottom region in place at its fixed screen position.
    pub fn draw(&mut self, editor: &Editor, size: (u16, u16)) -> io::Result<()> {
        let (width, height) = size;
        let layout = compute_layout(editor, self.content_width(width));
        let reserved =
            ratchet(&mut self.sticky_height, layout.required_height()).min(usize::from(height));
        if reserved == 0 {
            return Ok(());
        }
        let erase = erase_extent(&mut self.painted, reserved).min(usize::from(height));
        let top = usize::from(height) - reserved;

        // Leftover rows above the band from a taller previous paint.
        for row in 0..erase - reserved {
            queue!(
                self.out,
                MoveTo(0, to_u16(usize::from(height) - erase + row)),
                Clear(ClearType::CurrentLine)
            )?;
        }
        let band = self.band_rows(&layout, width, reserved)?;
        for (i, row) in band.iter().enumerate() {
            queue!(
                self.out,
                MoveTo(0, to_u16(top + i)),
                Clear(ClearType::CurrentLine)
            )?;
            self.out.write_all(row)?;
        }
        self.place_cursor(&layout, top, reserved)?;
        self.out.flush_to(&mut self.stdout)
    }

    /// Append finished lines to the scrollback above the bottom region,
    /// then reprint the region sequentially.
    ///
    /// The band is erased and the appended lines are written forward
    /// from its top row; their line feeds push earlier output up the
    /// screen. The band is then rebuilt by writing forward rather than
    /// repositioning each row, because the append itself is sequential
    /// terminal output and the region's final position is only settled
    /// once the last row is out.
    pub fn append(
        &mut self,
        lines: &[String],
        kind: AppendKind,
        editor: &Editor,
        size: (u16, u16),
    ) -> io::Result<()> {
        let (width, height) = size;
        let content_width = self.content_width(width);
        let layout = compute_layout(editor, content_width);
        let reserved =
            ratchet(&mut self.sticky_height, layout.required_height()).min(usize::from(height));
        if reserved == 0 {
            return Ok(());
        }
        // Erase at the height still on screen, which exceeds `reserved`
        // right after a submission reset the sticky mark; the appended
        // lines then consume the reclaimed rows.
        let erase = erase_extent(&mut self.painted, reserved).min(usize::from(height));
        let top = usize::from(height) - erase;

        for row in 0..erase {
            queue!(
                self.out,
                MoveTo(0, to_u16(top + row)),
                Clear(ClearType::CurrentLine)
            )?;
        }
        queue!(self.out, MoveTo(0, to_u16(top)))?;
        match kind {
            AppendKind::History => self.queue_history_lines(lines, content_width)?,
            AppendKind::Plain => self.queue_plain_lines(lines, width, self.theme.scrollback)?,
            AppendKind::Error => self.queue_plain_lines(lines, width, self.theme.error)?,
        }

        let band = self.band_rows(&layout, width, reserved)?;
        let last = band.len() - 1;
        for (i, row) in band.iter().enumerate() {
            queue!(self.out, Clear(ClearType::CurrentLine))?;
            self.out.write_all(row)?;
            if i != last {
                queue!(self.out, Print("\r\n"))?;
            }
        }
        self.place_cursor(&layout, usize::from(height) - reserved, reserved)?;
        self.out.flush_to(&mut self.stdout)
    }

    /// Queue submitted input styled and wrapped exactly as it appeared
    /// in the live editor.
    fn queue_history_lines(&mut self, lines: &[String], content_width: usize) -> io::Result<()> {
        for line in lines {
            let chars: Vec<char> = line.chars().collect();
            for (i, segment) in wrap_line(line, content_width).iter().enumerate() {
                let prefix = if i == 0 { &self.prompt } else { &self.continuation };
                let text: String = chars[segment.start..segment.start + segment.len]
                    .iter()
                    .collect();
                queue!(
                    self.out,
                    Clear(ClearType::CurrentLine),
                    SetForegroundColor(self.theme.history),
                    Print(prefix),
                    Print(text),
                    ResetColor,
                    Print("\r\n")
                )?;
            }
        }
        Ok(())
    }

    /// Queue producer output truncated to the terminal width.
    fn queue_plain_lines(
        &mut self,
        lines: &[String],
        width: u16,
        color: crossterm::style::Color,
    ) -> io::Result<()> {
        for line in lines {
            queue!(
                self.out,
                Clear(ClearType::CurrentLine),
                SetForegroundColor(color),
                Print(truncate_to_width(line, usize::from(width))),
                ResetColor,
                Print("\r\n")
            )?;
        }
        Ok(())
    }

    /// Rows of editor text the band can show; when the layout is taller
    /// than the band, the window ending at the cursor row wins.
    fn visible_rows<'a>(&self, layout: &'a Layout, reserved: usize) -> (&'a [String], usize) {
        let max_rows = reserved.saturating_sub(CHROME_ROWS).max(1);
        let skip = (layout.cursor_row + 1).saturating_sub(max_rows);
        let end = (skip + max_rows).min(layout.rows.len());
        (&layout.rows[skip..end], skip)
    }

    /// Render the band into one byte string per reserved row: padding
    /// rows, a blank separator, prompt-prefixed text rows, a blank row,
    /// and the status line.
    fn band_rows(&self, layout: &Layout, width: u16, reserved: usize) -> io::Result<Vec<Vec<u8>>> {
        let (rows, skip) = self.visible_rows(layout, reserved);
        let pad = reserved.saturating_sub(rows.len() + CHROME_ROWS);
        let mut band: Vec<Vec<u8>> = vec![Vec::new(); reserved];
        for (i, text) in rows.iter().enumerate() {
            let slot = pad + 1 + i;
            if slot + 1 >= reserved {
                break;
            }
            let prefix = if skip + i == 0 { &self.prompt } else { &self.continuation };
            let mut bytes = Vec::new();
            queue!(
                bytes,
                SetForegroundColor(self.theme.prompt),
                Print(prefix),
                SetForegroundColor(self.theme.editor),
                Print(text),
                ResetColor
            )?;
            band[slot] = bytes;
        }
        let mut bytes = Vec::new();
        queue!(
            bytes,
            SetForegroundColor(self.theme.status),
            Print(truncate_to_width(&self.status, usize::from(width))),
            ResetColor
        )?;
        band[reserved - 1] = bytes;
        Ok(band)
    }

    /// Position the terminal cursor at the mapped visual location,
    /// offset by the prompt width.
    fn place_cursor(&mut self, layout: &Layout, top: usize, reserved: usize) -> io::Result<()> {
        let (rows, skip) = self.visible_rows(layout, reserved);
        let pad = reserved.saturating_sub(rows.len() + CHROME_ROWS);
        let visible_row = layout.cursor_row.saturating_sub(skip);
        let row = (top + pad + 1 + visible_row).min(top + reserved - 1);
        let col = self.prompt_width
            + rows
                .get(visible_row)
                .map_or(0, |r| cursor_column(r, layout.cursor_col));
        queue!(self.out, MoveTo(to_u16(col), to_u16(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratchet_seeds_then_holds() {
        let mut sticky = 0;
        assert_eq!(ratchet(&mut sticky, 4), 4);
        assert_eq!(ratchet(&mut sticky, 4), 4);
        // Growth ratchets upward.
        assert_eq!(ratchet(&mut sticky, 7), 7);
        // Shrinking content does not shrink the band.
        assert_eq!(ratchet(&mut sticky, 5), 7);
    }

    #[test]
    fn erase_covers_previously_painted_rows() {
        let mut painted = 0;
        assert_eq!(erase_extent(&mut painted, 6), 6);
        // A shrunken band still erases at the on-screen height once.
        assert_eq!(erase_extent(&mut painted, 4), 6);
        assert_eq!(erase_extent(&mut painted, 4), 4);
    }

    #[test]
    fn append_after_submission_erases_the_taller_band() {
        // A three-line buffer paints a six-row band; after the buffer
        // clears and the sticky mark resets, the next paint reserves
        // four rows but must still erase all six on screen.
        let mut editor = Editor::new();
        editor.insert("one\ntwo\nthree");
        let mut sticky = 0;
        let mut painted = 0;
        let tall = compute_layout(&editor, 40).required_height();
        assert_eq!(erase_extent(&mut painted, ratchet(&mut sticky, tall)), 6);

        editor.clear();
        sticky = 0;
        let short = compute_layout(&editor, 40).required_height();
        let erased = erase_extent(&mut painted, ratchet(&mut sticky, short));
        assert!(erased >= 6, "erased {erased} rows with 6 rows on screen");
    }

    #[test]
    fn ratchet_reseeds_after_reset() {
        let mut sticky = 0;
        ratchet(&mut sticky, 9);
        sticky = 0;
        assert_eq!(ratchet(&mut sticky, 4), 4);
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("hello", 10), "hello");
        // A wide CJK character does not fit in a single column.
        assert_eq!(truncate_to_width("日本", 3), "日");
    }

    #[test]
    fn cursor_column_counts_display_width() {
        assert_eq!(cursor_column("abc", 2), 2);
        assert_eq!(cursor_column("日本", 1), 2);
        assert_eq!(cursor_column("ab", 5), 2);
    }

    #[test]
    fn content_width_accounts_for_prompt() {
        let screen = Screen::new(Theme::default(), "> ", "  ", None);
        assert_eq!(screen.content_width(80), 78);
        assert_eq!(screen.content_width(1), 1);
    }

    #[test]
    fn band_rows_have_one_slot_per_reserved_row() {
        let screen = Screen::new(Theme::default(), "> ", "  ", None);
        let mut editor = Editor::new();
        editor.insert("hello");
        let layout = compute_layout(&editor, 40);
        let band = screen.band_rows(&layout, 80, layout.required_height()).unwrap();
        assert_eq!(band.len(), 4);
        // Separator rows above and below the text stay blank.
        assert!(band[0].is_empty());
        assert!(!band[1].is_empty());
        assert!(band[2].is_empty());
    }
}
