//! Timeline reconstruction: turns the chronological event stream into the
//! intervals during which each thread was running.
//!
//! Feed it the words of a readout in order, or lines of a text dump through
//! [`parse_event_line`]. A switch closes the outgoing thread's span and opens
//! the incoming one; a removal sentinel closes the removed thread's span and
//! moves the state of every younger thread down one number, the way the
//! registry renumbered them.
//!
//! ```text
//!   From 1 to 2 at 10     2 opens at 10, 1 had been running since the window start
//!   From 2 to 1 at 14     2: [10, 14]
//!   From 1 to 1 at 20     removal of 1, 1: [14, 20]
//! ```

use crate::codec::{TimestampWord, MAX_THREAD_NUMBER, TICK_MASK};

const SLOTS: usize = MAX_THREAD_NUMBER as usize + 1;

/// One interval during which thread `number` was running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSpan {
    pub number: u8,
    pub start: u32,
    pub end: u32,
}

impl RunSpan {
    /// Length in ticks, across at most one wrap of the 20-bit tick field.
    pub fn duration(&self) -> u32 {
        self.end.wrapping_sub(self.start) & TICK_MASK
    }
}

/// Incremental span builder.
pub struct TimelineBuilder {
    open: [Option<u32>; SLOTS],
    seen: [bool; SLOTS],
    window_start: Option<u32>,
}

impl TimelineBuilder {
    pub const fn new() -> Self {
        Self {
            open: [None; SLOTS],
            seen: [false; SLOTS],
            window_start: None,
        }
    }

    /// Process the next word of the stream.
    pub fn feed(&mut self, word: TimestampWord, mut emit: impl FnMut(RunSpan)) {
        let tick = word.tick();
        let window_start = *self.window_start.get_or_insert(tick);

        if word.is_removal() {
            let number = word.in_number();
            if let Some(span) = self.close(number, tick, window_start) {
                emit(span);
            }
            self.renumber_after(number);
            return;
        }

        let (out, incoming) = (word.out_number(), word.in_number());
        if out != 0 {
            if let Some(span) = self.close(out, tick, window_start) {
                emit(span);
            }
        }
        if incoming != 0 {
            self.open[incoming as usize] = Some(tick);
            self.seen[incoming as usize] = true;
        }
    }

    /// Close every span still open at `tick`, in thread number order.
    pub fn finish(&mut self, tick: u32, mut emit: impl FnMut(RunSpan)) {
        for number in 1..SLOTS {
            if let Some(start) = self.open[number].take() {
                emit(RunSpan {
                    number: number as u8,
                    start,
                    end: tick & TICK_MASK,
                });
            }
        }
    }

    /// Threads with an open span.
    pub fn running(&self) -> impl Iterator<Item = u8> + '_ {
        (1..SLOTS)
            .filter(move |&number| self.open[number].is_some())
            .map(|number| number as u8)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Younger threads move down one number when `removed` exits.
    fn renumber_after(&mut self, removed: u8) {
        let index = removed as usize;
        self.open.copy_within(index + 1.., index);
        self.seen.copy_within(index + 1.., index);
        self.open[SLOTS - 1] = None;
        self.seen[SLOTS - 1] = false;
    }

    /// A thread seen leaving before it was ever seen entering has been
    /// running since the window start.
    fn close(&mut self, number: u8, tick: u32, window_start: u32) -> Option<RunSpan> {
        let index = number as usize;
        let start = match self.open[index].take() {
            Some(start) => start,
            None if !self.seen[index] => window_start,
            None => return None,
        };
        self.seen[index] = true;
        Some(RunSpan {
            number,
            start,
            end: tick,
        })
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one `From %2d to %2d at %7d` line back into a word.
///
/// Trailing `\r\n` is accepted; anything else that does not match returns
/// `None`.
pub fn parse_event_line(line: &str) -> Option<TimestampWord> {
    let mut fields = line.split_whitespace();
    if fields.next()? != "From" {
        return None;
    }
    let out: u8 = fields.next()?.parse().ok()?;
    if fields.next()? != "to" {
        return None;
    }
    let incoming: u8 = fields.next()?.parse().ok()?;
    if fields.next()? != "at" {
        return None;
    }
    let tick: u32 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || out > MAX_THREAD_NUMBER || incoming > MAX_THREAD_NUMBER {
        return None;
    }
    Some(TimestampWord::new(tick, out, incoming))
}
