//! The recorder: registry, log, archive and trigger behind one owned value.
//!
//! The host kernel owns one `Recorder` (directly, or through
//! [`SharedRecorder`](crate::SharedRecorder) when it must live in a static)
//! and calls its hooks:
//!
//! ```text
//!   thread init hook     -> thread_created(handle)
//!   thread exit hook     -> thread_exited(handle, now)
//!   context switch hook  -> context_switch(in, out, now)
//! ```
//!
//! Hooks never fail and never allocate. Their cost is bounded by one scan of
//! the live threads.

use crate::archive::{RemovedArchive, RemovedInfo};
use crate::buffer::TimestampLog;
use crate::codec::TimestampWord;
use crate::config::{DEFAULT_LOG_CAPACITY, DEFAULT_LOG_NEW_THREADS, MAX_REMOVED_THREADS, MAX_THREADS};
use crate::error::RecorderError;
use crate::registry::{KernelThread, ThreadRegistry};
use crate::stats::RecorderStats;
use crate::trigger::{window_budget, TriggerMode, TriggerState};

/// Scheduling timestamp recorder.
///
/// - `LOG`: entries in the circular timestamp log
/// - `ARCHIVE`: removed threads kept for display (at most 63)
/// - `THREADS`: live threads that can be numbered (at most 63)
pub struct Recorder<
    H,
    const LOG: usize = DEFAULT_LOG_CAPACITY,
    const ARCHIVE: usize = MAX_REMOVED_THREADS,
    const THREADS: usize = MAX_THREADS,
> {
    pub(crate) registry: ThreadRegistry<H, THREADS>,
    pub(crate) log: TimestampLog<LOG>,
    pub(crate) archive: RemovedArchive<ARCHIVE>,
    pub(crate) trigger: TriggerState,
    pub(crate) paused: bool,
    pub(crate) stats: RecorderStats,
}

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize>
    Recorder<H, LOG, ARCHIVE, THREADS>
{
    /// Create a recorder in `Run` mode with an empty log.
    ///
    /// `default_log` decides whether threads created from now on are logged.
    pub const fn new(default_log: bool) -> Self {
        Self {
            registry: ThreadRegistry::new(default_log),
            log: TimestampLog::new(),
            archive: RemovedArchive::new(),
            trigger: TriggerState::new(),
            paused: false,
            stats: RecorderStats::new(),
        }
    }

    /// Clear the log, archive, trigger and counters.
    ///
    /// Live threads stay registered. Intended for kernel start-up, after the
    /// threads created before the recorder existed have been added.
    pub fn init(&mut self) {
        self.log.reset();
        self.archive.clear();
        self.trigger = TriggerState::new();
        self.paused = false;
        self.stats = RecorderStats::new();

        log::info!(
            "Timestamp recorder initialized ({} entries, {} removed threads, {} live threads max, default log {})",
            LOG,
            ARCHIVE,
            THREADS,
            self.registry.default_log()
        );
    }

    // =========================================================================
    // Kernel Hooks
    // =========================================================================

    /// Thread creation hook.
    ///
    /// A thread that does not fit in the registry stays untracked: it never
    /// gets a number and its switches only appear through the other side.
    pub fn thread_created(&mut self, handle: H) {
        if let Err(err) = self.registry.add(handle) {
            self.stats.untracked_threads += 1;
            log::warn!("Timestamp recorder: cannot track new thread: {}", err);
        }
    }

    /// Thread exit hook.
    ///
    /// Unlinks the thread, writes a removal sentinel carrying the number it
    /// held, and archives its display metadata if there is room.
    pub fn thread_exited(&mut self, handle: H, tick: u32) {
        let Some(thread) = self.registry.remove(handle) else {
            return;
        };

        if !self.can_record() {
            self.stats.gated += 1;
            return;
        }

        let slot = self.store(TimestampWord::removal(tick, thread.number));
        let info = RemovedInfo::capture(&thread.handle, thread.logged);
        if !self.archive.archive(thread.number, info, slot) {
            self.stats.archive_overflows += 1;
        }
    }

    /// Context switch hook: `out_handle` stops, `in_handle` starts.
    ///
    /// The switch is stored only if at least one of the two threads is
    /// logged. A switch from a thread to itself is ignored.
    #[inline]
    pub fn context_switch(&mut self, in_handle: H, out_handle: H, tick: u32) {
        if !self.can_record() {
            self.stats.gated += 1;
            return;
        }
        if in_handle == out_handle {
            return;
        }

        let (incoming, outgoing) = self.registry.find_pair(in_handle, out_handle);
        if !incoming.logged && !outgoing.logged {
            self.stats.filtered += 1;
            return;
        }

        self.store(TimestampWord::new(tick, outgoing.number, incoming.number));
    }

    #[inline(always)]
    fn can_record(&self) -> bool {
        !self.paused && self.trigger.window_open()
    }

    /// Write one entry, retiring the archived removal whose sentinel it
    /// overwrites. Returns the slot written.
    #[inline(always)]
    fn store(&mut self, word: TimestampWord) -> usize {
        if let Some(previous) = self.log.peek_overwrite() {
            if previous.is_removal() {
                self.archive.age_out(self.log.position());
            }
        }
        let slot = self.log.push(word);
        self.trigger.consume();
        self.stats.recorded += 1;
        slot
    }

    // =========================================================================
    // Control Surface
    // =========================================================================

    /// Set the trigger at `tick`.
    ///
    /// Returns the name of the trigger in effect, which is the previous one
    /// if a trigger was already set.
    pub fn set_trigger(&mut self, name: &'static str, tick: u32) -> &'static str {
        if self.trigger.is_triggered() {
            return self.trigger.arm(name, tick, 0);
        }

        let budget = window_budget(self.log.position(), self.log.is_full(), LOG);
        let current = self.trigger.arm(name, tick, budget);
        log::info!(
            "Timestamp trigger set by {} at {} ({} entries left)",
            name,
            tick,
            budget
        );
        current
    }

    /// Leave `Triggered` mode and restart recording from an empty log.
    ///
    /// Returns `false` (and changes nothing) if no trigger was set.
    pub fn reset_trigger(&mut self) -> bool {
        if !self.trigger.disarm() {
            return false;
        }
        // Old entries would sit next to new ones across the paused gap
        self.log.reset();
        self.archive.clear();
        log::info!("Timestamp trigger reset, run mode");
        true
    }

    /// Log flag given to threads created from now on.
    pub fn set_default_log(&mut self, enabled: bool) {
        self.registry.set_default_log(enabled);
    }

    pub fn default_log(&self) -> bool {
        self.registry.default_log()
    }

    /// Enable or disable recording of one live thread.
    pub fn set_log_flag(&mut self, handle: H, enabled: bool) -> Result<(), RecorderError> {
        self.registry.set_log_flag(handle, enabled)
    }

    /// Stop writing entries until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> TriggerMode {
        self.trigger.mode()
    }

    pub fn trigger(&self) -> &TriggerState {
        &self.trigger
    }

    pub fn log(&self) -> &TimestampLog<LOG> {
        &self.log
    }

    pub fn registry(&self) -> &ThreadRegistry<H, THREADS> {
        &self.registry
    }

    pub fn archive(&self) -> &RemovedArchive<ARCHIVE> {
        &self.archive
    }

    pub fn stats(&self) -> &RecorderStats {
        &self.stats
    }
}

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize> Default
    for Recorder<H, LOG, ARCHIVE, THREADS>
{
    fn default() -> Self {
        Self::new(DEFAULT_LOG_NEW_THREADS)
    }
}
