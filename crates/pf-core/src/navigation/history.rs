//! Navigation history with a cursor

use std::collections::VecDeque;
use tracing::debug;

use super::NavigationEntry;

/// Default number of entries kept before the oldest is evicted
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Browser-style history: pushing while not at the tail drops the forward
/// entries, back/forward only move the cursor.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<NavigationEntry>,
    cursor: Option<usize>,
    limit: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// History that keeps at most `limit` entries (at least one)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, entry: NavigationEntry) {
        if let Some(cursor) = self.cursor {
            let dropped = self.entries.len() - (cursor + 1);
            if dropped > 0 {
                debug!("Discarding {} forward history entries", dropped);
                self.entries.truncate(cursor + 1);
            }
        }

        self.entries.push_back(entry);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back; `None` at the start of history
    pub fn back(&mut self) -> Option<&NavigationEntry> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                self.entries.get(cursor - 1)
            }
            _ => None,
        }
    }

    /// Step forward; `None` at the tail
    pub fn forward(&mut self) -> Option<&NavigationEntry> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.cursor = Some(cursor + 1);
                self.entries.get(cursor + 1)
            }
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Cursor position, `None` when empty
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> impl Iterator<Item = &NavigationEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PageParams;

    fn entry(seq: u64, page: &str) -> NavigationEntry {
        NavigationEntry::new(seq, page, PageParams::new())
    }

    fn pages(history: &HistoryStack) -> Vec<&str> {
        history.entries().map(|e| e.page()).collect()
    }

    #[test]
    fn test_push_after_back_truncates_forward_entries() {
        let mut history = HistoryStack::new();
        history.push(entry(0, "A"));
        history.push(entry(1, "B"));
        history.push(entry(2, "C"));
        assert_eq!(history.cursor(), Some(2));

        assert_eq!(history.back().map(|e| e.page()), Some("B"));
        history.push(entry(3, "D"));

        assert_eq!(pages(&history), vec!["A", "B", "D"]);
        assert_eq!(history.cursor(), Some(2));
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_back_and_forward_are_bounded() {
        let mut history = HistoryStack::new();
        assert!(history.back().is_none());
        assert!(history.forward().is_none());
        assert!(history.current().is_none());
        assert_eq!(history.cursor(), None);

        history.push(entry(0, "A"));
        assert!(history.back().is_none());
        assert!(history.forward().is_none());
        assert_eq!(history.cursor(), Some(0));

        history.push(entry(1, "B"));
        assert!(history.forward().is_none());
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_back_and_forward_do_not_mutate_entries() {
        let mut history = HistoryStack::new();
        history.push(entry(0, "home"));
        history.push(entry(1, "settings"));

        assert!(history.can_go_back());
        assert_eq!(history.back().map(|e| e.seq()), Some(0));
        assert!(history.can_go_forward());
        assert_eq!(history.forward().map(|e| e.page()), Some("settings"));
        assert_eq!(pages(&history), vec!["home", "settings"]);
        assert_eq!(history.current().map(|e| e.seq()), Some(1));
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = HistoryStack::with_limit(3);
        for (seq, page) in ["A", "B", "C", "D"].into_iter().enumerate() {
            history.push(entry(seq as u64, page));
        }

        assert_eq!(pages(&history), vec!["B", "C", "D"]);
        assert_eq!(history.cursor(), Some(2));

        history.back();
        history.back();
        assert!(!history.can_go_back());
        assert_eq!(history.current().map(|e| e.page()), Some("B"));
    }

    #[test]
    fn test_zero_limit_keeps_one_entry() {
        let mut history = HistoryStack::with_limit(0);
        history.push(entry(0, "A"));
        history.push(entry(1, "B"));
        assert_eq!(pages(&history), vec!["B"]);
        assert_eq!(history.limit(), 1);
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryStack::new();
        history.push(entry(0, "A"));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
    }
}
