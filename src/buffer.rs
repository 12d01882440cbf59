//! Fixed-capacity circular log of timestamp words.
//!
//! # Design
//!
//! - One `u32` per entry, `N` entries, statically sized
//! - Write cursor `pos` always in `[0, N)`
//! - `full` latches once the cursor has wrapped; from then on every write
//!   overwrites the oldest entry
//!
//! The log itself does not gate or filter writes; the recorder decides what
//! reaches it.

use crate::codec::TimestampWord;

/// Circular log of `N` timestamp words.
pub struct TimestampLog<const N: usize> {
    words: [TimestampWord; N],
    pos: usize,
    full: bool,
}

impl<const N: usize> TimestampLog<N> {
    const NOT_EMPTY: () = assert!(N > 0, "timestamp log needs at least one entry");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NOT_EMPTY;
        Self {
            words: [TimestampWord::EMPTY; N],
            pos: 0,
            full: false,
        }
    }

    /// Store `word` at the cursor and advance it.
    ///
    /// Returns the slot that was written.
    #[inline(always)]
    pub fn push(&mut self, word: TimestampWord) -> usize {
        let slot = self.pos;
        self.words[slot] = word;
        self.pos += 1;
        if self.pos >= N {
            self.pos = 0;
            self.full = true;
        }
        slot
    }

    /// Word the next `push` will overwrite, once the log has wrapped.
    ///
    /// Before the first wrap the slot ahead of the cursor holds nothing
    /// meaningful and `None` is returned.
    #[inline(always)]
    pub fn peek_overwrite(&self) -> Option<TimestampWord> {
        if self.full {
            Some(self.words[self.pos])
        } else {
            None
        }
    }

    /// Forget all entries. Stale words stay in memory until overwritten.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.full = false;
    }

    /// Current write cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        if self.full {
            N
        } else {
            self.pos
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Slot of the oldest valid entry.
    pub fn start(&self) -> usize {
        if self.full {
            self.pos
        } else {
            0
        }
    }

    /// Entries in chronological order, oldest first, with their slots.
    pub fn iter(&self) -> impl Iterator<Item = (usize, TimestampWord)> + '_ {
        let start = self.start();
        (0..self.len()).map(move |i| {
            let slot = (start + i) % N;
            (slot, self.words[slot])
        })
    }
}

impl<const N: usize> Default for TimestampLog<N> {
    fn default() -> Self {
        Self::new()
    }
}
