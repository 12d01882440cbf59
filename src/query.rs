//! Read side: chronological traversal of the log with thread names resolved.
//!
//! Numbers in the log are positions that were valid when each entry was
//! written. Every removal logged after an entry renumbered the threads above
//! it, so a number is resolved by replaying those removals forward: either
//! one of them removed the thread (its name comes from the archive) or the
//! thread is still alive under its current number. Anything left unresolved
//! gets a placeholder label, never an error.
//!
//! ```text
//!   From 2 to 3 at 10     2 is B, 3 is C: both move down at 12
//!   From 1 to 1 at 12     removal of A, threads above 1 move down
//!   From 2 to 1 at 15     live numbering: 1 = B, 2 = C
//! ```

use crate::archive::RemovedEntry;
use crate::codec::TimestampWord;
use crate::config::{NONAME, NO_THREAD, UNKNOWN_THREAD};
use crate::recorder::Recorder;
use crate::registry::KernelThread;

// =============================================================================
// Resolved Views
// =============================================================================

/// Display identity of one side of a logged event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadLabel {
    /// Number 0: no thread on this side.
    Nobody,
    /// A thread that is still alive.
    Live {
        number: u8,
        name: Option<&'static str>,
        priority: u8,
        logged: bool,
    },
    /// An exited thread still in the archive.
    Removed(RemovedEntry),
    /// A number nothing resolves to any more.
    Unresolved { number: u8 },
}

impl ThreadLabel {
    pub fn number(&self) -> u8 {
        match self {
            ThreadLabel::Nobody => 0,
            ThreadLabel::Live { number, .. } | ThreadLabel::Unresolved { number } => *number,
            ThreadLabel::Removed(entry) => entry.number,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThreadLabel::Nobody => NO_THREAD,
            ThreadLabel::Live { name, .. } => name.unwrap_or(NONAME),
            ThreadLabel::Removed(entry) => entry.info.name(),
            ThreadLabel::Unresolved { .. } => UNKNOWN_THREAD,
        }
    }
}

/// Kind of a logged entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Switch,
    Removal,
}

/// A decoded log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampEvent {
    pub word: TimestampWord,
    /// Thread that stopped running (the removed thread for a removal).
    pub from: ThreadLabel,
    /// Thread that started running (the removed thread for a removal).
    pub to: ThreadLabel,
}

impl TimestampEvent {
    pub fn tick(&self) -> u32 {
        self.word.tick()
    }

    pub fn out_number(&self) -> u8 {
        self.word.out_number()
    }

    pub fn in_number(&self) -> u8 {
        self.word.in_number()
    }

    pub fn kind(&self) -> EventKind {
        if self.word.is_removal() {
            EventKind::Removal
        } else {
            EventKind::Switch
        }
    }
}

/// One line of the thread listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadSummary {
    pub number: u8,
    pub name: &'static str,
    pub priority: u8,
    pub logged: bool,
    /// Listed from the archive of removed threads.
    pub exited: bool,
}

// =============================================================================
// Readout Interface
// =============================================================================

/// Anything the output writers can read a recording from.
pub trait Readout {
    /// Tick of the trigger, if one is set.
    fn trigger_tick(&mut self) -> Option<u32>;

    /// Visit every logged entry, oldest first, with the writer paused.
    ///
    /// Stops at the first visitor error and returns it. Returns the number of
    /// entries visited otherwise.
    fn for_each_event<E, F>(&mut self, visitor: F) -> Result<usize, E>
    where
        F: FnMut(&TimestampEvent) -> Result<(), E>;

    /// Visit live threads in creation order, then archived removed threads.
    fn for_each_thread<E, F>(&mut self, visitor: F) -> Result<usize, E>
    where
        F: FnMut(&ThreadSummary) -> Result<(), E>;
}

// =============================================================================
// Recorder Traversal
// =============================================================================

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize>
    Recorder<H, LOG, ARCHIVE, THREADS>
{
    /// Visit every logged entry, oldest first.
    ///
    /// The writer is paused for the duration and resumed afterwards, also
    /// when the visitor bails out early. A recorder that was already paused
    /// stays paused.
    pub fn for_each_event<E, F>(&mut self, mut visitor: F) -> Result<usize, E>
    where
        F: FnMut(&TimestampEvent) -> Result<(), E>,
    {
        let was_paused = self.paused;
        self.paused = true;

        let mut visited = 0;
        let mut result = Ok(());
        while let Some(event) = self.event_at(visited) {
            result = visitor(&event);
            if result.is_err() {
                break;
            }
            visited += 1;
        }

        self.paused = was_paused;
        result.map(|()| visited)
    }

    /// The entry `age` positions after the oldest one, resolved.
    pub fn event_at(&self, age: usize) -> Option<TimestampEvent> {
        let (_, word) = self.log.iter().nth(age)?;
        Some(TimestampEvent {
            word,
            from: self.label(word.out_number(), age),
            to: self.label(word.in_number(), age),
        })
    }

    /// Resolve `number` as it appears in the entry `age` positions after the
    /// oldest one.
    ///
    /// Replays the removals logged from that entry on: a removal at the
    /// tracked position names the thread, a removal below it shifts it down
    /// by one. Whatever position survives the replay is looked up among the
    /// live threads. O(log length) per call.
    pub fn label(&self, number: u8, age: usize) -> ThreadLabel {
        if number == 0 {
            return ThreadLabel::Nobody;
        }

        let mut position = number;
        for (slot, word) in self.log.iter().skip(age) {
            if !word.is_removal() {
                continue;
            }
            let removed = word.in_number();
            if removed == position {
                return self
                    .archive
                    .iter()
                    .find(|entry| entry.sentinel_slot == slot)
                    .map(|entry| ThreadLabel::Removed(*entry))
                    .unwrap_or(ThreadLabel::Unresolved { number });
            }
            if removed < position {
                position -= 1;
            }
        }

        match self.registry.resolve(position) {
            Some(thread) => ThreadLabel::Live {
                number,
                name: thread.handle.name(),
                priority: thread.handle.priority(),
                logged: thread.logged,
            },
            None => ThreadLabel::Unresolved { number },
        }
    }

    /// Visit live threads in creation order, then archived removed threads
    /// oldest first.
    pub fn for_each_thread<E, F>(&self, mut visitor: F) -> Result<usize, E>
    where
        F: FnMut(&ThreadSummary) -> Result<(), E>,
    {
        let mut visited = 0;
        for index in 0.. {
            let Some(summary) = self.thread_at(index) else {
                break;
            };
            visitor(&summary)?;
            visited += 1;
        }
        Ok(visited)
    }

    /// The `index`-th line of the thread listing.
    pub fn thread_at(&self, index: usize) -> Option<ThreadSummary> {
        let live = self.registry.len();
        if index < live {
            return self.registry.iter().nth(index).map(|thread| ThreadSummary {
                number: thread.number,
                name: thread.handle.name().unwrap_or(NONAME),
                priority: thread.handle.priority(),
                logged: thread.logged,
                exited: false,
            });
        }

        self.archive
            .iter()
            .nth(index - live)
            .map(|entry| ThreadSummary {
                number: entry.number,
                name: entry.info.name(),
                priority: entry.info.priority(),
                logged: entry.info.logged(),
                exited: true,
            })
    }
}

impl<H: KernelThread, const LOG: usize, const ARCHIVE: usize, const THREADS: usize> Readout
    for Recorder<H, LOG, ARCHIVE, THREADS>
{
    fn trigger_tick(&mut self) -> Option<u32> {
        self.trigger.is_triggered().then(|| self.trigger.tick())
    }

    fn for_each_event<E, F>(&mut self, visitor: F) -> Result<usize, E>
    where
        F: FnMut(&TimestampEvent) -> Result<(), E>,
    {
        Recorder::for_each_event(self, visitor)
    }

    fn for_each_thread<E, F>(&mut self, visitor: F) -> Result<usize, E>
    where
        F: FnMut(&ThreadSummary) -> Result<(), E>,
    {
        Recorder::for_each_thread(self, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXITED_DYNAMIC_THREAD;
    use crate::registry::ThreadStorage;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Named(&'static str, ThreadStorage);

    impl KernelThread for Named {
        fn name(&self) -> Option<&'static str> {
            Some(self.0)
        }
        fn priority(&self) -> u8 {
            self.0.len() as u8
        }
        fn storage(&self) -> ThreadStorage {
            self.1
        }
    }

    const MAIN: Named = Named("main", ThreadStorage::Static);
    const IDLE: Named = Named("idle", ThreadStorage::Static);
    const WORKER: Named = Named("worker", ThreadStorage::Dynamic);

    type Small = Recorder<Named, 8, 4, 8>;

    fn names(recorder: &mut Small) -> Vec<(&'static str, &'static str)> {
        let mut seen = Vec::new();
        recorder
            .for_each_event(|event| {
                seen.push((event.from.name(), event.to.name()));
                Ok::<(), ()>(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_live_threads_resolve_by_name() {
        let mut recorder = Small::new(true);
        recorder.thread_created(MAIN);
        recorder.thread_created(IDLE);
        recorder.context_switch(IDLE, MAIN, 10);
        assert_eq!(names(&mut recorder), vec![("main", "idle")]);
    }

    #[test]
    fn test_removed_thread_resolves_until_renumbered() {
        let mut recorder = Small::new(true);
        recorder.thread_created(MAIN);
        recorder.thread_created(WORKER);
        recorder.context_switch(WORKER, MAIN, 1);
        recorder.context_switch(MAIN, WORKER, 2);
        recorder.thread_exited(WORKER, 3);

        assert_eq!(
            names(&mut recorder),
            vec![
                ("main", EXITED_DYNAMIC_THREAD),
                (EXITED_DYNAMIC_THREAD, "main"),
                (EXITED_DYNAMIC_THREAD, EXITED_DYNAMIC_THREAD),
            ]
        );
    }

    #[test]
    fn test_numbers_before_a_removal_follow_the_shift() {
        let mut recorder = Small::new(true);
        recorder.thread_created(MAIN);
        recorder.thread_created(IDLE);
        recorder.thread_created(WORKER);
        recorder.context_switch(WORKER, IDLE, 1);
        recorder.thread_exited(MAIN, 2);
        recorder.context_switch(IDLE, WORKER, 3);

        assert_eq!(
            names(&mut recorder),
            vec![("idle", "worker"), ("main", "main"), ("worker", "idle")]
        );
    }

    #[test]
    fn test_unresolvable_number_gets_placeholder() {
        let mut recorder = Small::new(true);
        recorder.thread_created(MAIN);
        recorder.thread_created(IDLE);
        recorder.context_switch(IDLE, MAIN, 1);
        // Thread 2 exits while paused: no sentinel, no archive entry
        recorder.pause();
        recorder.thread_exited(IDLE, 2);
        recorder.resume();

        let mut labels = Vec::new();
        recorder
            .for_each_event(|event| {
                labels.push(event.to);
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(labels, vec![ThreadLabel::Unresolved { number: 2 }]);
        assert_eq!(labels[0].name(), UNKNOWN_THREAD);
    }

    #[test]
    fn test_traversal_pauses_and_resumes_on_early_exit() {
        let mut recorder = Small::new(true);
        recorder.thread_created(MAIN);
        recorder.thread_created(IDLE);
        recorder.context_switch(IDLE, MAIN, 1);
        recorder.context_switch(MAIN, IDLE, 2);

        let mut calls = 0;
        let result = recorder.for_each_event(|_| {
            calls += 1;
            Err("stop")
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(calls, 1);
        assert!(!recorder.is_paused());
    }

    #[test]
    fn test_traversal_keeps_existing_pause() {
        let mut recorder = Small::new(true);
        recorder.pause();
        assert_eq!(recorder.for_each_event(|_| Ok::<(), ()>(())), Ok(0));
        assert!(recorder.is_paused());
    }

    #[test]
    fn test_thread_listing_includes_archive() {
        let mut recorder = Small::new(false);
        recorder.thread_created(MAIN);
        recorder.thread_created(WORKER);
        recorder.thread_created(IDLE);
        recorder.set_log_flag(IDLE, true).unwrap();
        recorder.thread_exited(MAIN, 5);

        let mut listing = Vec::new();
        let count = recorder
            .for_each_thread(|t| {
                listing.push((t.number, t.name, t.logged, t.exited));
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            listing,
            vec![
                (1, "worker", false, false),
                (2, "idle", true, false),
                (1, "main", false, true),
            ]
        );
    }
}
