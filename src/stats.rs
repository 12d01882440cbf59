//! Diagnostic counters kept by the recorder.
//!
//! Plain integers bumped from the hooks; the hooks already run with the
//! scheduler locked so no atomics are needed here.

/// Counters describing what the recorder could not keep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Entries written to the log (switches and sentinels).
    pub recorded: u64,
    /// Switches dropped because neither thread is logged.
    pub filtered: u64,
    /// Switches and removals dropped while paused or after the trigger window closed.
    pub gated: u64,
    /// Removals whose metadata did not fit in the archive.
    pub archive_overflows: u64,
    /// Threads that could not be registered.
    pub untracked_threads: u64,
}

impl RecorderStats {
    pub const fn new() -> Self {
        Self {
            recorded: 0,
            filtered: 0,
            gated: 0,
            archive_overflows: 0,
            untracked_threads: 0,
        }
    }
}
