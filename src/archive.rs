//! Display metadata of threads that exited while their removal is still
//! inside the log window.
//!
//! Each removal writes a sentinel into the timestamp log. As long as that
//! sentinel is in the window, older entries may carry the removed thread's
//! number, so its name and priority are kept here. Entries are archived in
//! the order their sentinels are written and leave in the same order, when
//! the log cursor is about to overwrite the sentinel's slot.

use crate::codec::MAX_THREAD_NUMBER;
use crate::config::{EXITED_DYNAMIC_THREAD, NONAME};
use crate::registry::{KernelThread, ThreadStorage};

// =============================================================================
// Archived Metadata
// =============================================================================

/// What is known about a thread after it exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovedInfo {
    /// Statically allocated thread; its name outlives it.
    Retained {
        name: Option<&'static str>,
        priority: u8,
        logged: bool,
    },
    /// Thread whose memory was released on exit; the name is unavailable.
    Freed { priority: u8, logged: bool },
}

impl RemovedInfo {
    /// Capture the metadata of an exiting thread while its handle is valid.
    pub fn capture<H: KernelThread>(handle: &H, logged: bool) -> Self {
        match handle.storage() {
            ThreadStorage::Static => RemovedInfo::Retained {
                name: handle.name(),
                priority: handle.priority(),
                logged,
            },
            ThreadStorage::Dynamic => RemovedInfo::Freed {
                priority: handle.priority(),
                logged,
            },
        }
    }

    /// Name to display.
    pub fn name(&self) -> &'static str {
        match self {
            RemovedInfo::Retained { name, .. } => name.unwrap_or(NONAME),
            RemovedInfo::Freed { .. } => EXITED_DYNAMIC_THREAD,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            RemovedInfo::Retained { priority, .. } | RemovedInfo::Freed { priority, .. } => {
                *priority
            }
        }
    }

    pub fn logged(&self) -> bool {
        match self {
            RemovedInfo::Retained { logged, .. } | RemovedInfo::Freed { logged, .. } => *logged,
        }
    }
}

/// One archived removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovedEntry {
    /// Number the thread held when it was removed.
    pub number: u8,
    pub info: RemovedInfo,
    /// Log slot holding the removal sentinel.
    pub sentinel_slot: usize,
}

// =============================================================================
// Archive
// =============================================================================

/// Circular archive of up to `M` removed threads.
pub struct RemovedArchive<const M: usize> {
    entries: [Option<RemovedEntry>; M],
    /// Next write position.
    head: usize,
    /// Position of the oldest entry.
    oldest: usize,
    count: usize,
}

impl<const M: usize> RemovedArchive<M> {
    const CAPACITY_FITS: () = assert!(
        M <= MAX_THREAD_NUMBER as usize,
        "archive cannot hold more removals than there are thread numbers"
    );

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS;
        Self {
            entries: [None; M],
            head: 0,
            oldest: 0,
            count: 0,
        }
    }

    /// Archive a removal whose sentinel sits in log slot `sentinel_slot`.
    ///
    /// Returns `false` when the archive is full; the removal then stays in
    /// the log but its metadata is lost.
    pub fn archive(&mut self, number: u8, info: RemovedInfo, sentinel_slot: usize) -> bool {
        if self.count >= M {
            return false;
        }
        self.entries[self.head] = Some(RemovedEntry {
            number,
            info,
            sentinel_slot,
        });
        self.head = (self.head + 1) % M;
        self.count += 1;
        true
    }

    /// Drop the oldest entry if its sentinel is the one in `sentinel_slot`.
    ///
    /// Called right before the log overwrites a sentinel. A sentinel whose
    /// removal was never archived matches nothing and leaves the archive
    /// untouched.
    pub fn age_out(&mut self, sentinel_slot: usize) -> bool {
        if self.count == 0 {
            return false;
        }
        match self.entries[self.oldest] {
            Some(entry) if entry.sentinel_slot == sentinel_slot => {
                self.entries[self.oldest] = None;
                self.oldest = (self.oldest + 1) % M;
                self.count -= 1;
                true
            }
            _ => false,
        }
    }

    /// First archived removal of a thread numbered `number`, oldest first.
    pub fn resolve(&self, number: u8) -> Option<&RemovedEntry> {
        self.iter().find(|entry| entry.number == number)
    }

    /// Archived removals, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RemovedEntry> + '_ {
        (0..self.count).filter_map(move |i| self.entries[(self.oldest + i) % M].as_ref())
    }

    pub fn clear(&mut self) {
        self.entries = [None; M];
        self.head = 0;
        self.oldest = 0;
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= M
    }

    pub const fn capacity(&self) -> usize {
        M
    }
}

impl<const M: usize> Default for RemovedArchive<M> {
    fn default() -> Self {
        Self::new()
    }
}
