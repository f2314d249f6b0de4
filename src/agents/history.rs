use std::collections::VecDeque;

/// Lines kept from earlier steps of one question
pub const HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity FIFO of prompt lines; pushing past capacity evicts the oldest
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    lines: VecDeque<String>,
    capacity: usize,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The newest `n` lines, oldest first
    pub fn last(&self, n: usize) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .skip(self.lines.len().saturating_sub(n))
            .map(String::as_str)
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
