//! A recorder that can live in a `static`.
//!
//! `SharedRecorder` wraps a [`Recorder`] in a spin lock and runs every locked
//! section with interrupts masked, so that on a single core a hook can never
//! find the lock held by the code it interrupted.
//!
//! # Protocol
//!
//! - `context_switch` only `try_lock`s. If the lock is taken the switch is
//!   dropped and counted in [`contended`](SharedRecorder::contended).
//! - `thread_created` and `thread_exited` always lock: losing one would put
//!   the registry out of step with the kernel.
//! - Readers pause the recorder, then take the lock once per entry and call
//!   the visitor with the lock released. Switches arriving meanwhile are
//!   gated by the pause. A thread exiting mid-read still renumbers the
//!   younger threads; the remaining entries are labelled against the new
//!   numbering.
//!
//! # Hold Time
//!
//! Hooks hold the lock for one registry scan, at most `THREADS` records.
//! A readout section holds it for one `event_at`: a walk to the entry plus
//! one replay of the newer entries per side, each at most `LOG` words, and
//! an archive scan of at most `ARCHIVE` entries when a replay hits a
//! removal. That bounds every masked section by roughly
//! `3 * LOG + 2 * ARCHIVE` word reads; a whole dump costs O(LOG²) reads
//! spread over `LOG` separate sections.
//!
//! This assumes one writer. Genuinely parallel writers on several cores
//! need the host to serialise the hooks itself.

use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use crate::config::{DEFAULT_LOG_CAPACITY, MAX_REMOVED_THREADS, MAX_THREADS};
use crate::critical::without_interrupts;
use crate::error::RecorderError;
use crate::query::{Readout, ThreadSummary, TimestampEvent};
use crate::recorder::Recorder;
use crate::registry::KernelThread;
use crate::stats::RecorderStats;
use crate::trigger::TriggerMode;

/// Spin-locked recorder for use from a `static`.
pub struct SharedRecorder<
    H,
    const LOG: usize = DEFAULT_LOG_CAPACITY,
    const ARCHIVE: usize = MAX_REMOVED_THREADS,
    const THREADS: usize = MAX_THREADS,
> {
    inner: Mutex<Recorder<H, LOG, ARCHIVE, THREADS>>,
    contended: AtomicUsize,
}

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize>
    SharedRecorder<H, LOG, ARCHIVE, THREADS>
{
    pub const fn new(default_log: bool) -> Self {
        Self {
            inner: Mutex::new(Recorder::new(default_log)),
            contended: AtomicUsize::new(0),
        }
    }

    /// Run `f` on the recorder with the lock held and interrupts masked.
    pub fn locked<R>(&self, f: impl FnOnce(&mut Recorder<H, LOG, ARCHIVE, THREADS>) -> R) -> R {
        without_interrupts(|| f(&mut *self.inner.lock()))
    }

    pub fn init(&self) {
        self.contended.store(0, Ordering::Relaxed);
        self.locked(|recorder| recorder.init());
    }

    // =========================================================================
    // Kernel Hooks
    // =========================================================================

    pub fn thread_created(&self, handle: H) {
        self.locked(|recorder| recorder.thread_created(handle));
    }

    pub fn thread_exited(&self, handle: H, tick: u32) {
        self.locked(|recorder| recorder.thread_exited(handle, tick));
    }

    /// Record a switch unless the lock is taken.
    #[inline]
    pub fn context_switch(&self, in_handle: H, out_handle: H, tick: u32) {
        without_interrupts(|| match self.inner.try_lock() {
            Some(mut recorder) => recorder.context_switch(in_handle, out_handle, tick),
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    /// Switches dropped because the lock was taken.
    pub fn contended(&self) -> usize {
        self.contended.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Control Surface
    // =========================================================================

    pub fn set_trigger(&self, name: &'static str, tick: u32) -> &'static str {
        self.locked(|recorder| recorder.set_trigger(name, tick))
    }

    pub fn reset_trigger(&self) -> bool {
        self.locked(|recorder| recorder.reset_trigger())
    }

    pub fn set_default_log(&self, enabled: bool) {
        self.locked(|recorder| recorder.set_default_log(enabled));
    }

    pub fn set_log_flag(&self, handle: H, enabled: bool) -> Result<(), RecorderError> {
        self.locked(|recorder| recorder.set_log_flag(handle, enabled))
    }

    pub fn pause(&self) {
        self.locked(|recorder| recorder.pause());
    }

    pub fn resume(&self) {
        self.locked(|recorder| recorder.resume());
    }

    pub fn mode(&self) -> TriggerMode {
        self.locked(|recorder| recorder.mode())
    }

    pub fn stats(&self) -> RecorderStats {
        self.locked(|recorder| *recorder.stats())
    }

    // =========================================================================
    // Read Side
    // =========================================================================

    /// Visit every logged entry, oldest first, without holding the lock
    /// across visitor calls.
    pub fn for_each_event<E, F>(&self, mut visitor: F) -> Result<usize, E>
    where
        F: FnMut(&TimestampEvent) -> Result<(), E>,
    {
        let was_paused = self.locked(|recorder| {
            let was_paused = recorder.is_paused();
            recorder.pause();
            was_paused
        });
        log::debug!("Timestamp recorder paused for readout");

        let mut visited = 0;
        let mut result = Ok(());
        while let Some(event) = self.locked(|recorder| recorder.event_at(visited)) {
            result = visitor(&event);
            if result.is_err() {
                break;
            }
            visited += 1;
        }

        if !was_paused {
            self.resume();
        }
        log::debug!("Timestamp recorder readout done ({} entries)", visited);
        result.map(|()| visited)
    }

    /// Visit the thread listing, one lock per line.
    pub fn for_each_thread<E, F>(&self, mut visitor: F) -> Result<usize, E>
    where
        F: FnMut(&ThreadSummary) -> Result<(), E>,
    {
        let mut visited = 0;
        while let Some(summary) = self.locked(|recorder| recorder.thread_at(visited)) {
            visitor(&summary)?;
            visited += 1;
        }
        Ok(visited)
    }
}

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize> Default
    for SharedRecorder<H, LOG, ARCHIVE, THREADS>
{
    fn default() -> Self {
        Self {
            inner: Mutex::new(Recorder::default()),
            contended: AtomicUsize::new(0),
        }
    }
}

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize> Readout
    for &SharedRecorder<H, LOG, ARCHIVE, THREADS>
{
    fn trigger_tick(&mut self) -> Option<u32> {
        self.locked(|recorder| {
            let trigger = recorder.trigger();
            trigger.is_triggered().then(|| trigger.tick())
        })
    }

    fn for_each_event<E, F>(&mut self, visitor: F) -> Result<usize, E>
    where
        F: FnMut(&TimestampEvent) -> Result<(), E>,
    {
        SharedRecorder::for_each_event(*self, visitor)
    }

    fn for_each_thread<E, F>(&mut self, visitor: F) -> Result<usize, E>
    where
        F: FnMut(&ThreadSummary) -> Result<(), E>,
    {
        SharedRecorder::for_each_thread(*self, visitor)
    }
}
