//! Compile-time configuration of the recorder.
//!
//! All storage is sized here or through the const parameters of
//! [`Recorder`](crate::Recorder); nothing is allocated at runtime.

use crate::codec::MAX_THREAD_NUMBER;

/// Default number of entries in the timestamp log.
pub const DEFAULT_LOG_CAPACITY: usize = 512;

/// Default number of removed threads whose metadata is kept for display.
pub const MAX_REMOVED_THREADS: usize = 63;

/// Default number of live threads the registry can number.
pub const MAX_THREADS: usize = MAX_THREAD_NUMBER as usize;

/// Whether newly created threads are logged when nobody said otherwise.
pub const DEFAULT_LOG_NEW_THREADS: bool = cfg!(feature = "log_new_threads");

/// Name shown for a thread that never got one.
pub const NONAME: &str = "NONAME";

/// Name shown for a removed thread whose memory was freed with it.
pub const EXITED_DYNAMIC_THREAD: &str = "Exited dynamic thread";

/// Name shown when a number resolves to neither a live nor an archived thread.
pub const UNKNOWN_THREAD: &str = "Unknown thread";

/// Name shown for thread number 0, the side of a switch with no tracked thread.
pub const NO_THREAD: &str = "No thread";
