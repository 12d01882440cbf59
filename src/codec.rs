//! Bit-packed encoding of context switch timestamps.
//!
//! Every log entry is a single `u32` so that the hot path stores one word and
//! the whole log stays small enough to live in a static:
//!
//! ```text
//! 31                  12 11        6 5         0
//! +---------------------+-----------+-----------+
//! |  tick (20 bits)     | out (6)   | in (6)    |
//! +---------------------+-----------+-----------+
//! ```
//!
//! Thread numbers run from 1 to 63, 0 meaning "no thread". A word whose out
//! and in numbers are equal and non-zero is a removal sentinel rather than a
//! switch. The tick wraps every 2^20 ticks; out-of-range inputs are silently
//! truncated.

use core::fmt;

// =============================================================================
// Layout
// =============================================================================

/// Bit offset of the in-thread number.
pub const IN_SHIFT: u32 = 0;

/// Bit offset of the out-thread number.
pub const OUT_SHIFT: u32 = 6;

/// Bit offset of the tick.
pub const TICK_SHIFT: u32 = 12;

/// Mask of a thread number once shifted down.
pub const THREAD_MASK: u32 = 0x3F;

/// Mask of the tick once shifted down (20 bits).
pub const TICK_MASK: u32 = 0xF_FFFF;

/// Largest thread number a word can carry.
pub const MAX_THREAD_NUMBER: u8 = THREAD_MASK as u8;

/// Pack a tick and two thread numbers into one word.
#[inline(always)]
pub const fn encode(tick: u32, out_number: u8, in_number: u8) -> u32 {
    ((tick & TICK_MASK) << TICK_SHIFT)
        | (((out_number as u32) & THREAD_MASK) << OUT_SHIFT)
        | (((in_number as u32) & THREAD_MASK) << IN_SHIFT)
}

/// Unpack a word into `(tick, out_number, in_number)`.
#[inline(always)]
pub const fn decode(word: u32) -> (u32, u8, u8) {
    (
        (word >> TICK_SHIFT) & TICK_MASK,
        ((word >> OUT_SHIFT) & THREAD_MASK) as u8,
        ((word >> IN_SHIFT) & THREAD_MASK) as u8,
    )
}

// =============================================================================
// Timestamp Word
// =============================================================================

/// One entry of the timestamp log.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct TimestampWord(u32);

impl TimestampWord {
    /// The all-zero word a fresh log slot holds.
    pub const EMPTY: Self = Self(0);

    /// Create a context switch entry.
    #[inline(always)]
    pub const fn new(tick: u32, out_number: u8, in_number: u8) -> Self {
        Self(encode(tick, out_number, in_number))
    }

    /// Create the sentinel marking the removal of thread `number`.
    #[inline(always)]
    pub const fn removal(tick: u32, number: u8) -> Self {
        Self(encode(tick, number, number))
    }

    /// Tick at which the entry was recorded, modulo 2^20.
    #[inline(always)]
    pub const fn tick(self) -> u32 {
        (self.0 >> TICK_SHIFT) & TICK_MASK
    }

    /// Number of the thread that stopped running (0 if none).
    #[inline(always)]
    pub const fn out_number(self) -> u8 {
        ((self.0 >> OUT_SHIFT) & THREAD_MASK) as u8
    }

    /// Number of the thread that started running (0 if none).
    #[inline(always)]
    pub const fn in_number(self) -> u8 {
        ((self.0 >> IN_SHIFT) & THREAD_MASK) as u8
    }

    /// Whether this entry marks a thread removal instead of a switch.
    #[inline(always)]
    pub const fn is_removal(self) -> bool {
        let out = self.out_number();
        out != 0 && out == self.in_number()
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TimestampWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampWord")
            .field("tick", &self.tick())
            .field("out", &self.out_number())
            .field("in", &self.in_number())
            .finish()
    }
}

const _: () = assert!(
    TICK_SHIFT + 20 == 32,
    "tick field must occupy the top 20 bits"
);
