//! Scheduling timestamp recorder.
//!
//! Records which thread stopped and which thread started at every context
//! switch in a fixed-size circular log of packed `u32` words, so that the
//! scheduling activity of a kernel can be dumped and turned into a timeline
//! after the fact.
//!
//! # Architecture
//!
//! ```text
//!  kernel hooks                 Recorder                        readout
//!  ------------     +-------------------------------+     -----------------
//!  thread_created ->| ThreadRegistry (numbers 1..63)|     for_each_event
//!  thread_exited  ->| TimestampLog   (packed words) |---> for_each_thread
//!  context_switch ->| RemovedArchive (exited names) |     output::write_*
//!                   | TriggerState   (window)       |     timeline
//!                   +-------------------------------+
//! ```
//!
//! - Threads are numbered by their position in creation order among live
//!   threads. Numbers are recomputed by scan and shift when a thread exits.
//! - A thread exit writes a removal sentinel (out == in) and archives the
//!   thread's name so older entries can still be labelled. The archive entry
//!   leaves when its sentinel is overwritten.
//! - Setting a trigger lets the log run for half a window more and then
//!   freezes it until the trigger is reset.
//!
//! # Usage
//!
//! ```ignore
//! static RECORDER: SharedRecorder<ThreadRef> = SharedRecorder::new(true);
//!
//! // thread init hook
//! RECORDER.thread_created(thread);
//! // context switch hook
//! RECORDER.context_switch(next, prev, ticks());
//!
//! // shell command
//! output::write_timestamps(&mut &RECORDER, &mut serial)?;
//! ```
//!
//! Everything is statically sized through const generics; the crate never
//! allocates and is `no_std` outside of tests.

#![cfg_attr(not(test), no_std)]

pub mod archive;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod critical;
pub mod error;
pub mod output;
pub mod query;
pub mod recorder;
pub mod registry;
pub mod shared;
pub mod stats;
pub mod timeline;
pub mod trigger;

// Re-export commonly used items
pub use archive::{RemovedArchive, RemovedEntry, RemovedInfo};
pub use buffer::TimestampLog;
pub use codec::{decode, encode, TimestampWord};
pub use error::RecorderError;
pub use query::{EventKind, Readout, ThreadLabel, ThreadSummary, TimestampEvent};
pub use recorder::Recorder;
pub use registry::{KernelThread, ThreadRegistry, ThreadStorage};
pub use shared::SharedRecorder;
pub use stats::RecorderStats;
pub use timeline::{RunSpan, TimelineBuilder};
pub use trigger::TriggerMode;
