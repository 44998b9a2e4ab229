//! Input reader: dedicated thread polling terminal key events.
//!
//! The reader runs in its own thread and uses the terminal backend's
//! event polling to capture keypresses without blocking the engine
//! loop. Decoded keys are forwarded onto the event bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind};

use super::event::{KeyCode, KeyEvent, KeyMods, UiEvent};

/// Handle to the input polling thread.
///
/// Dropping the reader signals shutdown and joins the thread, so the
/// poller never outlives its owner.
#[derive(Debug)]
pub struct InputReader {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl InputReader {
    /// Spawn the input thread.
    ///
    /// `sender` carries decoded keys to the engine loop; `poll_timeout`
    /// bounds how long each poll waits before re-checking shutdown.
    pub fn spawn(sender: Sender<UiEvent>, poll_timeout: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tideline-input".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &shutdown_clone, poll_timeout);
            })
            .expect("failed to spawn input thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the input thread to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Signal shutdown and wait for the thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(sender: &Sender<UiEvent>, shutdown: &Arc<AtomicBool>, poll_timeout: Duration) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(raw) => {
                        if let Some(key) = Self::convert_event(&raw) {
                            if sender.send(UiEvent::Key(key)).is_err() {
                                // Receiver dropped, exit.
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = sender.send(UiEvent::Status(format!("input error: {e}")));
                    }
                },
                Ok(false) => {
                    // No event; loop again to observe shutdown.
                }
                Err(e) => {
                    let _ = sender.send(UiEvent::Status(format!("input error: {e}")));
                }
            }
        }
    }

    /// Convert a backend event to a decoded key, dropping everything
    /// the engine does not consume (mouse, focus, releases).
    fn convert_event(raw: &Event) -> Option<KeyEvent> {
        match raw {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let code = Self::convert_key_code(key.code)?;
                Some(KeyEvent {
                    code,
                    mods: Self::convert_modifiers(key.modifiers),
                })
            }
            // Resize is observed by the engine loop's size poll.
            _ => None,
        }
    }

    fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
        Some(match code {
            event::KeyCode::Char(c) => KeyCode::Char(c),
            event::KeyCode::F(n) => KeyCode::F(n),
            event::KeyCode::Backspace => KeyCode::Backspace,
            event::KeyCode::Enter => KeyCode::Enter,
            event::KeyCode::Left => KeyCode::Left,
            event::KeyCode::Right => KeyCode::Right,
            event::KeyCode::Up => KeyCode::Up,
            event::KeyCode::Down => KeyCode::Down,
            event::KeyCode::Home => KeyCode::Home,
            event::KeyCode::End => KeyCode::End,
            event::KeyCode::PageUp => KeyCode::PageUp,
            event::KeyCode::PageDown => KeyCode::PageDown,
            event::KeyCode::Tab => KeyCode::Tab,
            event::KeyCode::Delete => KeyCode::Delete,
            event::KeyCode::Esc => KeyCode::Esc,
            _ => return None,
        })
    }

    fn convert_modifiers(mods: event::KeyModifiers) -> KeyMods {
        let mut out = KeyMods::empty();
        if mods.contains(event::KeyModifiers::SHIFT) {
            out |= KeyMods::SHIFT;
        }
        if mods.contains(event::KeyModifiers::CONTROL) {
            out |= KeyMods::CONTROL;
        }
        if mods.contains(event::KeyModifiers::ALT) {
            out |= KeyMods::ALT;
        }
        if mods.contains(event::KeyModifiers::SUPER) {
            out |= KeyMods::SUPER;
        }
        out
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn drop_joins_the_poll_thread() {
        let (tx, _rx) = unbounded();
        let reader = InputReader::spawn(tx, Duration::from_millis(1));
        let shutdown = reader.shutdown.clone();
        drop(reader);
        assert!(shutdown.load(Ordering::Relaxed));
        // The thread's clone of the flag is gone once it has exited.
        assert_eq!(Arc::strong_count(&shutdown), 1);
    }
}
