//! Submission history with draft preservation.

use std::collections::VecDeque;

/// Maximum number of retained submissions; the oldest entry is evicted
/// past this bound.
pub const HISTORY_CAP: usize = 500;

/// Result of stepping toward newer history.
#[derive(Debug)]
pub(crate) enum Forward {
    /// A newer entry to load.
    Entry(String),
    /// Browsing exited; restore this draft.
    Draft(String),
    /// Browsing exited with no draft to restore.
    Cleared,
    /// Not browsing; nothing to do.
    NotBrowsing,
}

/// Ordered record of previously submitted texts.
///
/// Browsing state lives here too: the current index (if any) and the
/// draft the user was composing before browsing began.
#[derive(Debug, Default)]
pub struct History {
    entries: VecDeque<String>,
    /// `None` means not browsing.
    index: Option<usize>,
    draft: Option<String>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `idx`, oldest first.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.entries.get(idx).map(String::as_str)
    }

    /// Current browsing index, `None` when not browsing.
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Record a submission and leave browsing mode.
    ///
    /// A submission identical to the most recent entry is not stored
    /// twice; the oldest entry is evicted past [`HISTORY_CAP`].
    pub fn push(&mut self, text: &str) {
        self.index = None;
        if text.is_empty() || self.entries.back().is_some_and(|last| last == text) {
            return;
        }
        self.entries.push_back(text.to_string());
        while self.entries.len() > HISTORY_CAP {
            self.entries.pop_front();
        }
    }

    /// Drop any captured draft.
    pub fn discard_draft(&mut self) {
        self.draft = None;
    }

    /// Step toward older entries, capturing `current` as a draft when
    /// browsing begins with a non-empty buffer. Returns the entry to
    /// load, or `None` at the oldest entry (or with no history at all).
    pub(crate) fn step_back(&mut self, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.index {
            None => {
                if !current.is_empty() {
                    self.draft = Some(current.to_string());
                }
                self.entries.len() - 1
            }
            Some(0) => return None,
            Some(i) => i - 1,
        };
        self.index = Some(next);
        self.entries.get(next).cloned()
    }

    /// Step toward newer entries; past the newest one, browsing exits
    /// and the draft (if any) is handed back.
    pub(crate) fn step_forward(&mut self) -> Forward {
        match self.index {
            None => Forward::NotBrowsing,
            Some(i) if i + 1 < self.entries.len() => {
                self.index = Some(i + 1);
                Forward::Entry(self.entries[i + 1].clone())
            }
            Some(_) => {
                self.index = None;
                self.draft.take().map_or(Forward::Cleared, Forward::Draft)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Editor;

    #[test]
    fn push_dedupes_consecutive_submissions() {
        let mut h = History::new();
        h.push("x");
        h.push("x");
        assert_eq!(h.len(), 1);
        h.push("y");
        h.push("x");
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut h = History::new();
        for i in 0..=HISTORY_CAP {
            h.push(&format!("entry {i}"));
        }
        assert_eq!(h.len(), HISTORY_CAP);
        assert_eq!(h.get(0), Some("entry 1"));
        assert_eq!(h.get(HISTORY_CAP - 1), Some(&*format!("entry {HISTORY_CAP}")));
    }

    #[test]
    fn back_stops_at_oldest() {
        let mut e = Editor::new();
        e.commit_history("one");
        e.commit_history("two");
        e.history_back();
        assert_eq!(e.text(), "two");
        e.history_back();
        assert_eq!(e.text(), "one");
        e.history_back();
        assert_eq!(e.text(), "one");
    }

    #[test]
    fn draft_restored_after_browsing_past_newest() {
        let mut e = Editor::new();
        e.commit_history("old");
        e.insert("abc");
        e.history_back();
        assert_eq!(e.text(), "old");
        e.history_forward();
        assert_eq!(e.text(), "abc");
        assert!(!e.is_browsing_history());
    }

    #[test]
    fn forward_without_draft_clears_buffer() {
        let mut e = Editor::new();
        e.commit_history("old");
        e.history_back();
        e.history_forward();
        assert!(e.is_empty());
    }

    #[test]
    fn forward_when_not_browsing_is_a_no_op() {
        let mut e = Editor::new();
        e.commit_history("old");
        e.insert("typed");
        e.history_forward();
        assert_eq!(e.text(), "typed");
    }

    #[test]
    fn empty_submission_is_not_recorded() {
        let mut h = History::new();
        h.push("");
        assert!(h.is_empty());
    }
}
