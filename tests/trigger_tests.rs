//! Trigger window: budget computation, gating, and reset.


use fake_kernel::{entries, named, SmallRecorder};
use schedtrace::TriggerMode;

const A: fake_kernel::FakeThread = named(1, "A", 10);
const B: fake_kernel::FakeThread = named(2, "B", 20);

fn recorder_with_writes(writes: u32) -> SmallRecorder {
    let mut recorder = SmallRecorder::new(true);
    recorder.thread_created(A);
    recorder.thread_created(B);
    for tick in 0..writes {
        recorder.context_switch(B, A, tick);
    }
    recorder
}

#[test]
fn full_log_gets_half_a_window() {
    let mut recorder = recorder_with_writes(11);
    assert!(recorder.log().is_full());
    assert_eq!(recorder.log().position(), 3);

    recorder.set_trigger("test", 100);
    assert_eq!(recorder.trigger().remaining(), 4);

    for tick in 100..110 {
        recorder.context_switch(A, B, tick);
    }
    assert_eq!(recorder.stats().recorded, 15);
    assert_eq!(recorder.stats().gated, 6);

    // The trigger ends up mid-window: four entries before, four after
    let ticks: Vec<u32> = entries(&recorder).iter().map(|e| e.0).collect();
    assert_eq!(ticks, vec![7, 8, 9, 10, 100, 101, 102, 103]);
}

#[test]
fn young_log_fills_the_rest() {
    let mut recorder = recorder_with_writes(2);
    recorder.set_trigger("test", 2);
    assert_eq!(recorder.trigger().remaining(), 6);

    for tick in 2..20 {
        recorder.context_switch(B, A, tick);
    }
    assert_eq!(recorder.log().len(), 8);
    assert_eq!(entries(&recorder).last().map(|e| e.0), Some(7));
}

#[test]
fn young_log_past_half_gets_half_a_window() {
    let mut recorder = recorder_with_writes(5);
    recorder.set_trigger("test", 5);
    assert_eq!(recorder.trigger().remaining(), 4);
}

#[test]
fn second_trigger_keeps_the_first() {
    let mut recorder = recorder_with_writes(1);
    assert_eq!(recorder.set_trigger("Shell command", 10), "Shell command");
    assert_eq!(recorder.set_trigger("panic", 20), "Shell command");
    assert_eq!(recorder.trigger().tick(), 10);
    assert_eq!(recorder.trigger().remaining(), 7);
}

#[test]
fn reset_twice_is_reset_once() {
    let mut recorder = recorder_with_writes(11);
    recorder.set_trigger("test", 11);

    assert!(recorder.reset_trigger());
    assert!(!recorder.reset_trigger());

    assert_eq!(recorder.mode(), TriggerMode::Run);
    assert_eq!(recorder.log().position(), 0);
    assert!(!recorder.log().is_full());
    assert!(recorder.trigger().name().is_none());
}

#[test]
fn reset_in_run_mode_leaves_the_log_alone() {
    let mut recorder = recorder_with_writes(3);
    assert!(!recorder.reset_trigger());
    assert_eq!(recorder.log().len(), 3);
}

#[test]
fn recording_resumes_after_reset() {
    let mut recorder = recorder_with_writes(8);
    recorder.set_trigger("test", 8);
    for tick in 8..20 {
        recorder.context_switch(B, A, tick);
    }
    recorder.reset_trigger();

    recorder.context_switch(A, B, 50);
    assert_eq!(entries(&recorder), vec![(50, 2, 1)]);
}
