//! Creation-ordered registry of live threads.
//!
//! The registry gives every live thread a number: its 1-based position in
//! creation order among the threads still alive. Numbers are recomputed by a
//! scan each time they are needed, so a thread's number drops when an older
//! sibling exits.
//!
//! Records live in a fixed arena of slots owned by the registry and are
//! chained oldest to newest through slot indices. Nothing is stored inside
//! the host's thread objects; the registry only keeps the handle value.
//!
//! # Costs
//!
//! - `add`: O(1), the slot comes from a free stack or the unused tail.
//! - `remove`, `find_position`, `find_pair`: O(k), k the thread's position.

use crate::codec::MAX_THREAD_NUMBER;
use crate::error::RecorderError;

// =============================================================================
// Host Thread Interface
// =============================================================================

/// How the host allocated a thread, which decides what survives its exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadStorage {
    /// Statically allocated: the name stays readable after exit.
    Static,
    /// Heap or pool allocated: the thread's memory is released on exit.
    Dynamic,
}

/// Handle onto a thread owned by the host kernel.
///
/// The recorder compares handles for identity and reads metadata through
/// them while the thread is live. It never dereferences a handle after the
/// thread's exit hook has run.
pub trait KernelThread: Copy + Eq {
    /// Thread name, if the kernel gave it one.
    fn name(&self) -> Option<&'static str>;

    /// Scheduling priority.
    fn priority(&self) -> u8;

    /// How the thread was allocated.
    fn storage(&self) -> ThreadStorage;
}

// =============================================================================
// Records
// =============================================================================

#[derive(Clone, Copy)]
struct ThreadRecord<H> {
    handle: H,
    log_enabled: bool,
    older: Option<usize>,
    newer: Option<usize>,
}

/// A live thread together with the number it currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisteredThread<H> {
    pub number: u8,
    pub handle: H,
    pub logged: bool,
}

/// One side of a context switch as seen by the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Participant {
    /// Current number, 0 when the thread is not registered.
    pub number: u8,
    /// Whether the thread's switches are recorded.
    pub logged: bool,
}

impl Participant {
    /// An unregistered thread: no number and never logged.
    pub const NONE: Self = Self {
        number: 0,
        logged: false,
    };
}

// =============================================================================
// Registry
// =============================================================================

/// Registry of up to `N` live threads, `N` at most 63.
pub struct ThreadRegistry<H, const N: usize> {
    slots: [Option<ThreadRecord<H>>; N],
    /// Stack of released slot indices.
    free: [usize; N],
    free_len: usize,
    /// Slots at or above this index have never been used.
    high_water: usize,
    first: Option<usize>,
    last: Option<usize>,
    live: usize,
    default_log: bool,
}

impl<H: KernelThread, const N: usize> ThreadRegistry<H, N> {
    const CAPACITY_FITS: () = assert!(
        N <= MAX_THREAD_NUMBER as usize,
        "registry capacity must not exceed the largest encodable thread number"
    );

    /// Create an empty registry.
    ///
    /// `default_log` is the log flag given to threads added from now on.
    pub const fn new(default_log: bool) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS;
        Self {
            slots: [const { None }; N],
            free: [0; N],
            free_len: 0,
            high_water: 0,
            first: None,
            last: None,
            live: 0,
            default_log,
        }
    }

    /// Append a newly created thread after the youngest live one.
    pub fn add(&mut self, handle: H) -> Result<(), RecorderError> {
        let slot = self.alloc_slot().ok_or(RecorderError::RegistryFull)?;

        self.slots[slot] = Some(ThreadRecord {
            handle,
            log_enabled: self.default_log,
            older: self.last,
            newer: None,
        });

        match self.last {
            Some(last) => {
                if let Some(record) = self.slots[last].as_mut() {
                    record.newer = Some(slot);
                }
            }
            None => self.first = Some(slot),
        }
        self.last = Some(slot);
        self.live += 1;
        Ok(())
    }

    /// Unlink an exiting thread.
    ///
    /// Returns the number the thread held at the moment of removal, which is
    /// the number its removal sentinel must carry, or `None` if the handle
    /// was not registered.
    pub fn remove(&mut self, handle: H) -> Option<RegisteredThread<H>> {
        let (number, slot) = self
            .chain()
            .find(|(_, _, record)| record.handle == handle)
            .map(|(number, slot, _)| (number, slot))?;
        let record = self.slots[slot].take()?;

        match record.older {
            Some(older) => {
                if let Some(prev) = self.slots[older].as_mut() {
                    prev.newer = record.newer;
                }
            }
            None => self.first = record.newer,
        }
        match record.newer {
            Some(newer) => {
                if let Some(next) = self.slots[newer].as_mut() {
                    next.older = record.older;
                }
            }
            None => self.last = record.older,
        }

        self.free[self.free_len] = slot;
        self.free_len += 1;
        self.live -= 1;

        Some(RegisteredThread {
            number,
            handle: record.handle,
            logged: record.log_enabled,
        })
    }

    /// Current number of `handle`, if registered.
    pub fn find_position(&self, handle: H) -> Option<u8> {
        self.chain()
            .find(|(_, _, record)| record.handle == handle)
            .map(|(number, _, _)| number)
    }

    /// Resolve both sides of a switch with a single scan.
    ///
    /// Returns `(incoming, outgoing)`. The scan stops as soon as both are
    /// found; an unregistered side comes back as [`Participant::NONE`].
    pub fn find_pair(&self, in_handle: H, out_handle: H) -> (Participant, Participant) {
        let mut incoming = None;
        let mut outgoing = None;

        for (number, _, record) in self.chain() {
            let participant = Participant {
                number,
                logged: record.log_enabled,
            };
            if incoming.is_none() && record.handle == in_handle {
                incoming = Some(participant);
            }
            if outgoing.is_none() && record.handle == out_handle {
                outgoing = Some(participant);
            }
            if incoming.is_some() && outgoing.is_some() {
                break;
            }
        }

        (
            incoming.unwrap_or(Participant::NONE),
            outgoing.unwrap_or(Participant::NONE),
        )
    }

    /// Live thread currently holding `number`.
    pub fn resolve(&self, number: u8) -> Option<RegisteredThread<H>> {
        if number == 0 {
            return None;
        }
        self.iter().find(|thread| thread.number == number)
    }

    /// Enable or disable recording of one thread's switches.
    pub fn set_log_flag(&mut self, handle: H, enabled: bool) -> Result<(), RecorderError> {
        let slot = self
            .chain()
            .find(|(_, _, record)| record.handle == handle)
            .map(|(_, slot, _)| slot)
            .ok_or(RecorderError::NotRegistered)?;
        if let Some(record) = self.slots[slot].as_mut() {
            record.log_enabled = enabled;
        }
        Ok(())
    }

    /// Log flag given to threads added from now on.
    pub fn default_log(&self) -> bool {
        self.default_log
    }

    pub fn set_default_log(&mut self, enabled: bool) {
        self.default_log = enabled;
    }

    /// Live threads, oldest first, with their current numbers.
    pub fn iter(&self) -> impl Iterator<Item = RegisteredThread<H>> + '_ {
        self.chain().map(|(number, _, record)| RegisteredThread {
            number,
            handle: record.handle,
            logged: record.log_enabled,
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    fn alloc_slot(&mut self) -> Option<usize> {
        if self.free_len > 0 {
            self.free_len -= 1;
            Some(self.free[self.free_len])
        } else if self.high_water < N {
            let slot = self.high_water;
            self.high_water += 1;
            Some(slot)
        } else {
            None
        }
    }

    fn chain(&self) -> Chain<'_, H> {
        Chain {
            slots: &self.slots,
            next: self.first,
            number: 0,
        }
    }
}

/// Walk of the creation-order chain yielding `(number, slot, record)`.
struct Chain<'a, H> {
    slots: &'a [Option<ThreadRecord<H>>],
    next: Option<usize>,
    number: u8,
}

impl<'a, H> Iterator for Chain<'a, H> {
    type Item = (u8, usize, &'a ThreadRecord<H>);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.next?;
        let record = self.slots[slot].as_ref()?;
        self.next = record.newer;
        self.number += 1;
        Some((self.number, slot, record))
    }
}
