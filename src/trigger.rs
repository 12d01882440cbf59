//! Trigger state machine bounding the capture window.
//!
//! In `Run` mode the log records continuously, overwriting its oldest
//! entries. Setting a trigger works like an oscilloscope trigger: recording
//! continues for half a log more, so the trigger instant ends up in the
//! middle of the window. When the log does not yet hold half a window of
//! history, the rest of the log is filled instead.
//!
//! ```text
//!            set_trigger()
//!   Run  ------------------->  Triggered
//!    ^                             |
//!    +----- reset_trigger() -------+
//! ```

/// Recorder mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    Run,
    Triggered,
}

/// Number of entries still allowed after a trigger.
///
/// `pos` and `full` describe the log at the trigger instant.
pub const fn window_budget(pos: usize, full: bool, capacity: usize) -> isize {
    if !full && pos <= capacity / 2 {
        (capacity - pos) as isize
    } else {
        (capacity / 2) as isize
    }
}

/// Trigger bookkeeping shared with the write path.
#[derive(Clone, Copy, Debug)]
pub struct TriggerState {
    triggered: bool,
    tick: u32,
    remaining: isize,
    name: Option<&'static str>,
}

impl TriggerState {
    pub const fn new() -> Self {
        Self {
            triggered: false,
            tick: 0,
            remaining: 0,
            name: None,
        }
    }

    /// Enter `Triggered` with `budget` more entries allowed.
    ///
    /// Returns the trigger name now in effect: `name` on success, or the
    /// name of the trigger already set.
    pub fn arm(&mut self, name: &'static str, tick: u32, budget: isize) -> &'static str {
        if self.triggered {
            return self.name.unwrap_or(name);
        }
        self.triggered = true;
        self.tick = tick;
        self.remaining = budget;
        self.name = Some(name);
        name
    }

    /// Go back to `Run`. Returns `false` if no trigger was set.
    pub fn disarm(&mut self) -> bool {
        if !self.triggered {
            return false;
        }
        *self = Self::new();
        true
    }

    /// Whether the window still accepts entries.
    #[inline(always)]
    pub fn window_open(&self) -> bool {
        !self.triggered || self.remaining > 0
    }

    /// Account for one entry written to the log.
    #[inline(always)]
    pub fn consume(&mut self) {
        if self.triggered {
            self.remaining -= 1;
        }
    }

    pub fn mode(&self) -> TriggerMode {
        if self.triggered {
            TriggerMode::Triggered
        } else {
            TriggerMode::Run
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Tick at which the trigger was set (0 in `Run`).
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn remaining(&self) -> isize {
        self.remaining
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }
}

impl Default for TriggerState {
    fn default() -> Self {
        Self::new()
    }
}
