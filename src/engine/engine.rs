//! Engine: the event-bus consumer that ties editing, layout, and
//! rendering together.
//!
//! The engine owns the terminal for the duration of [`Engine::run`].
//! Producers (the input reader and any host threads holding an
//! [`EngineHandle`]) enqueue events on the bus; the run loop drains
//! them one at a time, mutates the editor, and redraws the bottom
//! region. All terminal writes happen on the loop, which is what keeps
//! composite updates from interleaving.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use crossterm::terminal;

use super::event::{KeyCode, KeyEvent, KeyMods, UiEvent};
use super::input::InputReader;
use crate::editor::Editor;
use crate::layout::{move_visual_down, move_visual_up, on_first_visual_row, on_last_visual_row};
use crate::render::{AppendKind, Screen, Theme};

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix of the first visual row of the editor.
    pub prompt: String,
    /// Prefix of wrapped continuation rows.
    pub continuation: String,
    /// Display width of the prefixes; derived from their content when
    /// `None`.
    pub prompt_width: Option<usize>,
    /// Region colors.
    pub theme: Theme,
    /// Echo submitted input to the scrollback with history styling
    /// instead of plain styling.
    pub echo_history: bool,
    /// Whether the Escape key stops the engine.
    pub stop_on_escape: bool,
    /// Input poll timeout for the keyboard thread.
    pub input_poll_timeout: Duration,
    /// How often the idle loop re-checks the terminal size.
    pub resize_poll_interval: Duration,
    /// Idle sleep between empty bus checks.
    pub idle_sleep: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            continuation: "  ".to_string(),
            prompt_width: None,
            theme: Theme::default(),
            echo_history: true,
            stop_on_escape: true,
            input_poll_timeout: Duration::from_millis(10),
            resize_poll_interval: Duration::from_millis(250),
            idle_sleep: Duration::from_millis(5),
        }
    }
}

/// Restores the terminal on drop, however the run loop exits.
#[derive(Debug)]
struct RawModeGuard;

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

const fn pack_dims(width: u16, height: u16) -> u32 {
    ((width as u32) << 16) | height as u32
}

#[allow(clippy::cast_possible_truncation)]
const fn unpack_dims(packed: u32) -> (u16, u16) {
    ((packed >> 16) as u16, packed as u16)
}

/// Serialize the buffer for submission.
///
/// A non-empty buffer is recorded in history (consecutive duplicates
/// suppressed, oldest evicted past the cap, browsing reset) and the
/// text is returned. An empty buffer yields `None` and records
/// nothing. Clearing the editor is the caller's job, after the host
/// callback has run.
fn take_submission(editor: &mut Editor) -> Option<String> {
    let text = editor.text();
    if text.is_empty() {
        return None;
    }
    editor.commit_history(&text);
    Some(text)
}

/// A cloneable producer-side handle to a running engine.
///
/// Handles outlive the run loop safely; events sent after shutdown are
/// dropped with the bus.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: Sender<UiEvent>,
    running: Arc<AtomicBool>,
    dims: Arc<AtomicU32>,
}

impl EngineHandle {
    /// Ask the engine to stop. The loop drains already-queued events
    /// before exiting.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the engine loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Last known terminal dimensions as `(width, height)`.
    pub fn size(&self) -> (u16, u16) {
        unpack_dims(self.dims.load(Ordering::SeqCst))
    }

    /// Replace the transient status message.
    pub fn status(&self, text: impl Into<String>) {
        let _ = self.tx.send(UiEvent::Status(text.into()));
    }

    /// Append finished lines to the scrollback.
    pub fn print<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let _ = self.tx.send(UiEvent::Append {
            lines,
            kind: AppendKind::Plain,
        });
    }

    /// Append error-styled lines to the scrollback.
    pub fn print_error<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let _ = self.tx.send(UiEvent::Append {
            lines,
            kind: AppendKind::Error,
        });
    }
}

/// The scrollback-friendly bottom-of-screen editor engine.
///
/// Construct one with [`Engine::new`], grab producer handles with
/// [`Engine::handle`], then call [`Engine::run`], which blocks until
/// the engine is stopped. Entering raw mode is the only fatal startup
/// error; the terminal is restored on every exit path, including a
/// panicking submit callback.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    editor: Editor,
    screen: Screen,
    events_tx: Sender<UiEvent>,
    events_rx: Receiver<UiEvent>,
    running: Arc<AtomicBool>,
    dims: Arc<AtomicU32>,
    width: u16,
    height: u16,
    input: Option<InputReader>,
    _raw: RawModeGuard,
}

impl Engine {
    /// Create an engine with the default configuration.
    pub fn new() -> io::Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine, entering raw mode.
    ///
    /// Failure to enter raw mode is fatal: the engine is not created
    /// and must not be run.
    pub fn with_config(config: EngineConfig) -> io::Result<Self> {
        let raw = RawModeGuard::new()?;
        let (width, height) = terminal::size()?;
        let (events_tx, events_rx) = unbounded();
        let screen = Screen::new(
            config.theme,
            config.prompt.clone(),
            config.continuation.clone(),
            config.prompt_width,
        );
        Ok(Self {
            config,
            editor: Editor::new(),
            screen,
            events_tx,
            events_rx,
            running: Arc::new(AtomicBool::new(false)),
            dims: Arc::new(AtomicU32::new(pack_dims(width, height))),
            width,
            height,
            input: None,
            _raw: raw,
        })
    }

    /// A producer handle for status updates, scrollback output, and
    /// stop requests.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            tx: self.events_tx.clone(),
            running: self.running.clone(),
            dims: self.dims.clone(),
        }
    }

    /// Run the engine until stopped.
    ///
    /// `on_submit` is invoked synchronously on this loop with the full
    /// submitted text, line breaks preserved, for every non-empty
    /// submission. Panics from the callback propagate, but the
    /// terminal is still restored.
    pub fn run<F>(mut self, mut on_submit: F) -> io::Result<()>
    where
        F: FnMut(&str),
    {
        self.running.store(true, Ordering::SeqCst);
        self.input = Some(InputReader::spawn(
            self.events_tx.clone(),
            self.config.input_poll_timeout,
        ));
        let result = self.run_loop(&mut on_submit);
        self.running.store(false, Ordering::SeqCst);
        // Joined here on both exits; an unwinding callback reaches the
        // reader's drop, which also joins, before raw mode is restored.
        if let Some(input) = self.input.take() {
            input.join();
        }
        result
    }

    fn run_loop<F>(&mut self, on_submit: &mut F) -> io::Result<()>
    where
        F: FnMut(&str),
    {
        self.screen.draw(&self.editor, (self.width, self.height))?;

        let mut last_size_poll = Instant::now();
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => self.dispatch(event, on_submit)?,
                Err(TryRecvError::Empty) => {
                    // Exit only on a pass that confirms the bus is
                    // drained, so no event posted before the stop
                    // request is lost.
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    if last_size_poll.elapsed() >= self.config.resize_poll_interval {
                        last_size_poll = Instant::now();
                        self.poll_resize()?;
                    } else {
                        thread::sleep(self.config.idle_sleep);
                    }
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(())
    }

    fn dispatch<F>(&mut self, event: UiEvent, on_submit: &mut F) -> io::Result<()>
    where
        F: FnMut(&str),
    {
        let size = self.refresh_size();
        match event {
            UiEvent::Key(key) => self.handle_key(key, size, on_submit),
            UiEvent::Append { lines, kind } => {
                self.screen.append(&lines, kind, &self.editor, size)
            }
            UiEvent::Status(text) => {
                self.screen.set_status(text);
                self.screen.draw(&self.editor, size)
            }
        }
    }

    /// Dimensions taken fresh at the start of each composite update.
    fn refresh_size(&mut self) -> (u16, u16) {
        if let Ok((width, height)) = terminal::size() {
            self.width = width;
            self.height = height;
            self.dims.store(pack_dims(width, height), Ordering::SeqCst);
        }
        (self.width, self.height)
    }

    fn poll_resize(&mut self) -> io::Result<()> {
        let before = (self.width, self.height);
        let now = self.refresh_size();
        if now == before {
            return Ok(());
        }
        self.screen.draw(&self.editor, now)
    }

    #[allow(clippy::too_many_lines)]
    fn handle_key<F>(&mut self, key: KeyEvent, size: (u16, u16), on_submit: &mut F) -> io::Result<()>
    where
        F: FnMut(&str),
    {
        let width = self.screen.content_width(size.0);
        let ctrl = key.mods.contains(KeyMods::CONTROL);
        let alt = key.mods.contains(KeyMods::ALT);
        let shift = key.mods.contains(KeyMods::SHIFT);
        match key.code {
            // A modified Enter is a soft return: break the line, do not
            // submit.
            KeyCode::Enter if ctrl || alt || shift => self.editor.insert("\n"),
            KeyCode::Enter => return self.submit(size, on_submit),
            KeyCode::Char('c') if ctrl => {
                self.running.store(false, Ordering::SeqCst);
                return Ok(());
            }
            KeyCode::Char('j') if ctrl => self.editor.insert("\n"),
            KeyCode::Char('a') if ctrl => self.editor.move_line_start(),
            KeyCode::Char('e') if ctrl => self.editor.move_line_end(),
            KeyCode::Char('u') if ctrl => self.editor.delete_to_line_start(),
            KeyCode::Char('k') if ctrl => self.editor.delete_to_line_end(),
            KeyCode::Char('w') if ctrl => self.editor.delete_word_back(),
            KeyCode::Char('b') if alt => self.editor.move_word_left(),
            KeyCode::Char('f') if alt => self.editor.move_word_right(),
            KeyCode::Char('d') if alt => self.editor.delete_word_forward(),
            KeyCode::Char(c) if !ctrl && !alt => self.editor.insert(c.encode_utf8(&mut [0; 4])),
            KeyCode::Char(c) => {
                let modifier = if ctrl { "ctrl" } else { "alt" };
                self.screen.set_status(format!("unbound key: {modifier}+{c}"));
            }
            KeyCode::Tab => self.editor.insert("    "),
            KeyCode::Backspace if ctrl || alt => self.editor.delete_word_back(),
            KeyCode::Backspace => self.editor.delete_back(),
            KeyCode::Delete if ctrl || alt => self.editor.delete_word_forward(),
            KeyCode::Delete => self.editor.delete_forward(),
            KeyCode::Left if ctrl || alt => self.editor.move_word_left(),
            KeyCode::Right if ctrl || alt => self.editor.move_word_right(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home if ctrl => self.editor.move_buffer_start(),
            KeyCode::End if ctrl => self.editor.move_buffer_end(),
            KeyCode::Home => self.editor.move_line_start(),
            KeyCode::End => self.editor.move_line_end(),
            KeyCode::PageUp => self.editor.move_buffer_start(),
            KeyCode::PageDown => self.editor.move_buffer_end(),
            KeyCode::Up => self.key_up(shift, width),
            KeyCode::Down => self.key_down(shift, width),
            KeyCode::Esc => {
                if self.config.stop_on_escape {
                    self.running.store(false, Ordering::SeqCst);
                    return Ok(());
                }
                self.screen.set_status("unbound key: escape");
            }
            KeyCode::F(n) => self.screen.set_status(format!("unbound key: F{n}")),
        }
        self.screen.draw(&self.editor, size)
    }

    /// Up on the first visual row recalls older history (falling back
    /// to line start with no history); Shift forces literal visual
    /// motion.
    fn key_up(&mut self, shift: bool, width: usize) {
        if !shift && on_first_visual_row(&self.editor, width) {
            if self.editor.history().is_empty() {
                self.editor.move_line_start();
            } else {
                self.editor.history_back();
            }
        } else {
            move_visual_up(&mut self.editor, width);
        }
    }

    /// Down on the last visual row steps toward newer history while
    /// browsing, otherwise moves to line end; Shift forces literal
    /// visual motion.
    fn key_down(&mut self, shift: bool, width: usize) {
        if !shift && on_last_visual_row(&self.editor, width) {
            if self.editor.is_browsing_history() {
                self.editor.history_forward();
            } else {
                self.editor.move_line_end();
            }
        } else {
            move_visual_down(&mut self.editor, width);
        }
    }

    fn submit<F>(&mut self, size: (u16, u16), on_submit: &mut F) -> io::Result<()>
    where
        F: FnMut(&str),
    {
        let Some(text) = take_submission(&mut self.editor) else {
            self.screen.set_status("nothing to submit");
            return self.screen.draw(&self.editor, size);
        };
        on_submit(&text);
        self.editor.clear();
        self.screen.reset_sticky();
        self.screen.set_status("");
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let kind = if self.config.echo_history {
            AppendKind::History
        } else {
            AppendKind::Plain
        };
        self.screen.append(&lines, kind, &self.editor, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle() -> (EngineHandle, Receiver<UiEvent>) {
        let (tx, rx) = unbounded();
        let handle = EngineHandle {
            tx,
            running: Arc::new(AtomicBool::new(true)),
            dims: Arc::new(AtomicU32::new(pack_dims(80, 24))),
        };
        (handle, rx)
    }

    #[test]
    fn dims_pack_round_trip() {
        assert_eq!(unpack_dims(pack_dims(213, 58)), (213, 58));
        assert_eq!(unpack_dims(pack_dims(0, 0)), (0, 0));
        assert_eq!(unpack_dims(pack_dims(u16::MAX, u16::MAX)), (u16::MAX, u16::MAX));
    }

    #[test]
    fn handle_stop_flips_running() {
        let (handle, _rx) = test_handle();
        assert!(handle.is_running());
        handle.stop();
        assert!(!handle.is_running());
    }

    #[test]
    fn handle_reports_size() {
        let (handle, _rx) = test_handle();
        assert_eq!(handle.size(), (80, 24));
    }

    #[test]
    fn handle_enqueues_in_order() {
        let (handle, rx) = test_handle();
        handle.status("working");
        handle.print(["a", "b"]);
        handle.print_error(["boom"]);

        assert!(matches!(rx.try_recv(), Ok(UiEvent::Status(s)) if s == "working"));
        match rx.try_recv() {
            Ok(UiEvent::Append { lines, kind }) => {
                assert_eq!(lines, vec!["a", "b"]);
                assert_eq!(kind, AppendKind::Plain);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            rx.try_recv(),
            Ok(UiEvent::Append { kind: AppendKind::Error, .. })
        ));
    }

    #[test]
    fn bus_preserves_per_producer_order() {
        let (tx, rx) = unbounded::<UiEvent>();
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        tx.send(UiEvent::Status(format!("{p}:{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        drop(tx);

        let mut last_seen = [-1i64; 4];
        while let Ok(UiEvent::Status(tag)) = rx.try_recv() {
            let (p, i) = tag.split_once(':').unwrap();
            let p: usize = p.parse().unwrap();
            let i: i64 = i.parse().unwrap();
            assert!(i > last_seen[p], "producer {p} reordered");
            last_seen[p] = i;
        }
        assert!(last_seen.iter().all(|&i| i == 99));
    }

    #[test]
    fn take_submission_records_history() {
        let mut editor = Editor::new();
        editor.insert("hi");
        let text = take_submission(&mut editor);
        assert_eq!(text.as_deref(), Some("hi"));
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.history().get(0), Some("hi"));
    }

    #[test]
    fn take_submission_suppresses_consecutive_duplicates() {
        let mut editor = Editor::new();
        editor.insert("x");
        take_submission(&mut editor);
        editor.clear();
        editor.insert("x");
        take_submission(&mut editor);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn take_submission_ignores_empty_buffer() {
        let mut editor = Editor::new();
        assert!(take_submission(&mut editor).is_none());
        assert_eq!(editor.history().len(), 0);
    }

    #[test]
    fn take_submission_preserves_line_breaks() {
        let mut editor = Editor::new();
        editor.insert("one\ntwo");
        assert_eq!(take_submission(&mut editor).as_deref(), Some("one\ntwo"));
    }
}
