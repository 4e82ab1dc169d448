//! History store: a fixed-capacity circular buffer of past command lines,
//! grounded on `shell_history.c`.
//!
//! Logical index 0 is always the most recent entry; logical index
//! `count - 1` is the oldest. The mapping to the physical ring slot is
//! `(head - logical_index) mod capacity`, carried over unchanged from the
//! original `get_buffer_index`.
//!
//! Entries are stored as raw bytes, not `String`: recalling a line with
//! Up/Down must hand back exactly what was typed, including any byte in
//! `0x80..=0xFF` that isn't part of a valid UTF-8 sequence (spec §13).

pub const MIN_CAPACITY: usize = 4;
pub const MAX_CAPACITY: usize = 32;

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == b' ' || b == b'\t')
}

/// A fixed-capacity, newest-first command history with its own browse
/// cursor for Up/Down navigation.
pub struct History {
    entries: Vec<Vec<u8>>,
    capacity: usize,
    max_entry_len: usize,
    count: usize,
    head: usize,
    /// `None` means "at current input", `Some(i)` is the logical index
    /// currently displayed while browsing.
    browse: Option<usize>,
}

impl History {
    pub fn new(capacity: usize, max_entry_len: usize) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            entries: vec![Vec::new(); capacity],
            capacity,
            max_entry_len,
            count: 0,
            head: 0,
            browse: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_browsing(&self) -> bool {
        self.browse.is_some()
    }

    fn buffer_index(&self, logical_index: usize) -> usize {
        (self.head + self.capacity - logical_index % self.capacity) % self.capacity
    }

    /// Append a command line. Rejects empty/whitespace-only input and
    /// consecutive duplicates of the most recent entry; always resets
    /// the browse cursor back to "current input" afterward, whether or
    /// not anything was actually stored.
    pub fn add<T: AsRef<[u8]>>(&mut self, cmd: T) -> bool {
        let cmd = cmd.as_ref();
        let stored = if is_blank(cmd) {
            false
        } else if self.count > 0 && self.entries[self.head] == cmd {
            false
        } else {
            let new_head = if self.count == 0 { 0 } else { (self.head + 1) % self.capacity };
            let mut truncated = cmd.to_vec();
            truncated.truncate(self.max_entry_len.saturating_sub(1));
            self.entries[new_head] = truncated;
            self.head = new_head;
            if self.count < self.capacity {
                self.count += 1;
            }
            true
        };
        self.browse = None;
        stored
    }

    /// Up arrow: move the browse cursor one step older. Once at the
    /// oldest entry it stays put and keeps returning that entry.
    pub fn prev(&mut self) -> Option<&[u8]> {
        if self.count == 0 {
            return None;
        }
        let next_index = match self.browse {
            None => 0,
            Some(i) => i + 1,
        };
        if next_index >= self.count {
            return self.browse.map(|i| self.entries[self.buffer_index(i)].as_slice());
        }
        self.browse = Some(next_index);
        Some(self.entries[self.buffer_index(next_index)].as_slice())
    }

    /// Down arrow: move the browse cursor one step newer. Moving past
    /// the newest entry resets to "current input" and returns `None`,
    /// signaling the caller to restore the line it had stashed.
    pub fn next(&mut self) -> Option<&[u8]> {
        let current = self.browse?;
        if current == 0 {
            self.browse = None;
            return None;
        }
        self.browse = Some(current - 1);
        Some(self.entries[self.buffer_index(current - 1)].as_slice())
    }

    pub fn reset_browse(&mut self) {
        self.browse = None;
    }

    /// Entry at a logical index (0 = newest), oldest-to-newest iteration
    /// helpers build on this.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.count {
            return None;
        }
        Some(self.entries[self.buffer_index(index)].as_slice())
    }

    pub fn clear(&mut self) {
        self.count = 0;
        self.head = 0;
        self.browse = None;
        for entry in &mut self.entries {
            entry.clear();
        }
    }

    /// Iterate entries oldest-first, for listing commands like the demo
    /// binary's `history` built-in.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.count).rev().map(move |i| self.get(i).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_prev_returns_most_recent_first() {
        let mut h = History::new(4, 64);
        h.add("one");
        h.add("two");
        assert_eq!(h.prev(), Some(&b"two"[..]));
        assert_eq!(h.prev(), Some(&b"one"[..]));
    }

    #[test]
    fn prev_stays_put_at_oldest() {
        let mut h = History::new(4, 64);
        h.add("one");
        h.add("two");
        h.prev();
        h.prev();
        assert_eq!(h.prev(), Some(&b"one"[..]));
    }

    #[test]
    fn next_past_newest_returns_none() {
        let mut h = History::new(4, 64);
        h.add("one");
        h.prev();
        assert_eq!(h.next(), None);
        assert!(!h.is_browsing());
    }

    #[test]
    fn rejects_empty_and_whitespace_only() {
        let mut h = History::new(4, 64);
        assert!(!h.add(""));
        assert!(!h.add("   \t  "));
        assert_eq!(h.count(), 0);
    }

    #[test]
    fn rejects_consecutive_duplicate_but_allows_nonconsecutive() {
        let mut h = History::new(4, 64);
        h.add("ls");
        assert!(!h.add("ls"));
        h.add("pwd");
        assert!(h.add("ls"));
        assert_eq!(h.count(), 3);
    }

    #[test]
    fn fifo_eviction_when_full() {
        let mut h = History::new(MIN_CAPACITY, 64);
        for i in 0..(MIN_CAPACITY + 2) {
            h.add(format!("cmd{i}"));
        }
        assert_eq!(h.count(), MIN_CAPACITY);
        assert_eq!(h.get(0), Some(&b"cmd5"[..]));
        assert_eq!(h.get(MIN_CAPACITY - 1), Some(&b"cmd2"[..]));
    }

    #[test]
    fn add_always_resets_browse() {
        let mut h = History::new(4, 64);
        h.add("one");
        h.add("two");
        h.prev();
        assert!(h.is_browsing());
        h.add("three");
        assert!(!h.is_browsing());
    }

    #[test]
    fn preserves_bytes_that_are_not_valid_utf8() {
        let mut h = History::new(4, 64);
        let raw: &[u8] = &[b'x', 0xE9, 0xFF];
        assert!(h.add(raw));
        assert_eq!(h.prev(), Some(raw));
    }
}
