//! Line-oriented text output of a recording.
//!
//! Writers take any [`core::fmt::Write`] sink (a serial port wrapper on the
//! kernel, a `String` in tests) and any [`Readout`] source. Every line ends
//! with `\r\n` for serial terminals.
//!
//! # Output Format
//!
//! ```text
//! Triggered at     950
//! From  1 to  2 at     900
//! From  2 to  1 at     904
//! From  3 to  3 at     910
//! ```
//!
//! The first line only appears when a trigger is set. A line with equal
//! numbers is a thread removal. Numbers are fixed-width so the lines can be
//! cut by column; [`parse_event_line`](crate::timeline::parse_event_line)
//! reads them back.
//!
//! ```text
//! Thread number  1 : Prio =  64, Log = Yes, Name = main
//! Thread number  2 : Prio =   1, Log =  No, Name = idle
//! Deleted threads:
//! Thread number  3 : Prio =  10, Log = Yes, Name = Exited dynamic thread
//! ```

use core::fmt::{self, Write};

use crate::query::{Readout, ThreadSummary};
use crate::stats::RecorderStats;

const DELETED_HEADER: &str = "Deleted threads: \r\n";

// =============================================================================
// Event Dump
// =============================================================================

/// Write the whole log, oldest first, one `From .. to .. at ..` line per
/// entry.
///
/// The writer is paused while the log is read.
pub fn write_timestamps<R: Readout, W: Write>(readout: &mut R, out: &mut W) -> fmt::Result {
    if let Some(tick) = readout.trigger_tick() {
        write!(out, "Triggered at {:7}\r\n", tick)?;
    }

    readout
        .for_each_event(|event| {
            write!(
                out,
                "From {:2} to {:2} at {:7}\r\n",
                event.out_number(),
                event.in_number(),
                event.tick()
            )
        })
        .map(|_| ())
}

// =============================================================================
// Thread Listing
// =============================================================================

/// Write the live threads in creation order, then the archived removed
/// threads under a `Deleted threads:` header.
///
/// The header is written even when nothing was removed.
pub fn write_thread_list<R: Readout, W: Write>(readout: &mut R, out: &mut W) -> fmt::Result {
    let mut in_archive = false;
    readout.for_each_thread(|thread| {
        if thread.exited && !in_archive {
            out.write_str(DELETED_HEADER)?;
            in_archive = true;
        }
        write_thread_line(out, thread)
    })?;

    if !in_archive {
        out.write_str(DELETED_HEADER)?;
    }
    Ok(())
}

fn write_thread_line<W: Write>(out: &mut W, thread: &ThreadSummary) -> fmt::Result {
    write!(
        out,
        "Thread number {:2} : Prio = {:3}, Log = {:>3}, Name = {}\r\n",
        thread.number,
        thread.priority,
        if thread.logged { "Yes" } else { "No" },
        thread.name
    )
}

// =============================================================================
// Control Feedback
// =============================================================================

/// Confirmation of `set_trigger`; `name` is the trigger in effect.
pub fn write_trigger_set<W: Write>(out: &mut W, name: &str, tick: u32) -> fmt::Result {
    write!(out, "Trigger set by {} at {:7}\r\n", name, tick)
}

/// Confirmation of `reset_trigger`.
pub fn write_run_mode<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str("Run mode\r\n")
}

/// Diagnostic counters, one `[STATS]` line each.
pub fn write_stats<W: Write>(out: &mut W, stats: &RecorderStats) -> fmt::Result {
    let counters = [
        ("RECORDED", stats.recorded),
        ("FILTERED", stats.filtered),
        ("GATED", stats.gated),
        ("ARCHIVE_OVERFLOWS", stats.archive_overflows),
        ("UNTRACKED_THREADS", stats.untracked_threads),
    ];
    for (name, value) in counters {
        write!(out, "[STATS] {}: {}\r\n", name, value)?;
    }
    Ok(())
}
