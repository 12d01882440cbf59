//! Hook-level behaviour of the recorder: numbering, filtering, wraparound
//! and the removed-thread archive.


use fake_kernel::{dynamic, entries, labels, named, SmallRecorder};
use schedtrace::config::{EXITED_DYNAMIC_THREAD, UNKNOWN_THREAD};
use schedtrace::{ThreadLabel, TriggerMode};

const A: fake_kernel::FakeThread = named(1, "A", 10);
const B: fake_kernel::FakeThread = named(2, "B", 20);

#[test]
fn eight_switches_fill_the_log_exactly() {
    let mut recorder = SmallRecorder::new(true);
    recorder.thread_created(A);
    recorder.thread_created(B);

    for tick in 0..8 {
        if tick % 2 == 0 {
            recorder.context_switch(B, A, tick);
        } else {
            recorder.context_switch(A, B, tick);
        }
    }

    assert!(recorder.log().is_full());
    assert_eq!(recorder.log().position(), 0);
    assert_eq!(
        entries(&recorder),
        vec![
            (0, 1, 2),
            (1, 2, 1),
            (2, 1, 2),
            (3, 2, 1),
            (4, 1, 2),
            (5, 2, 1),
            (6, 1, 2),
            (7, 2, 1),
        ]
    );
}

#[test]
fn wraparound_drops_the_oldest_entries() {
    let mut recorder = SmallRecorder::new(true);
    recorder.thread_created(A);
    recorder.thread_created(B);

    for tick in 0..11 {
        recorder.context_switch(B, A, tick);
    }

    let ticks: Vec<u32> = entries(&recorder).iter().map(|e| e.0).collect();
    assert_eq!(ticks, (3..11).collect::<Vec<_>>());
    assert_eq!(recorder.log().position(), 3);
}

#[test]
fn filtering_law() {
    let mut recorder = SmallRecorder::new(false);
    let c = named(3, "C", 1);
    recorder.thread_created(A);
    recorder.thread_created(B);
    recorder.thread_created(c);
    recorder.set_log_flag(c, true).unwrap();

    // Neither side flagged
    recorder.context_switch(B, A, 1);
    recorder.context_switch(A, B, 2);
    assert!(recorder.log().is_empty());

    // One side flagged, either direction
    recorder.context_switch(c, A, 3);
    recorder.context_switch(B, c, 4);
    assert_eq!(entries(&recorder), vec![(3, 1, 3), (4, 3, 2)]);
    assert_eq!(recorder.stats().filtered, 2);
}

#[test]
fn untracked_side_is_recorded_as_zero() {
    let mut recorder = SmallRecorder::new(true);
    recorder.thread_created(A);
    let stranger = named(99, "stranger", 0);

    recorder.context_switch(stranger, A, 5);
    assert_eq!(entries(&recorder), vec![(5, 1, 0)]);
    assert_eq!(labels(&mut recorder), vec![("A", "No thread")]);
}

#[test]
fn numbers_shift_when_an_older_thread_exits() {
    let mut recorder = SmallRecorder::new(true);
    let c = named(3, "C", 1);
    recorder.thread_created(A);
    recorder.thread_created(B);
    recorder.thread_created(c);

    recorder.context_switch(c, B, 1);
    recorder.thread_exited(A, 2);
    recorder.context_switch(B, c, 3);

    // C was 3 before A left, 2 after
    assert_eq!(entries(&recorder), vec![(1, 2, 3), (2, 1, 1), (3, 2, 1)]);
}

#[test]
fn five_exits_overflow_an_archive_of_four() {
    let mut recorder = SmallRecorder::new(true);
    let threads: Vec<_> = (10..15).map(|id| dynamic(id, id as u8)).collect();
    for &thread in &threads {
        recorder.thread_created(thread);
    }
    for (tick, &thread) in threads.iter().rev().enumerate() {
        recorder.thread_exited(thread, tick as u32);
    }

    // Five sentinels logged, numbers 5 down to 1
    assert_eq!(
        entries(&recorder),
        vec![(0, 5, 5), (1, 4, 4), (2, 3, 3), (3, 2, 2), (4, 1, 1)]
    );
    assert_eq!(recorder.archive().len(), 4);
    assert_eq!(recorder.stats().archive_overflows, 1);

    for number in 2..=5 {
        assert!(recorder.archive().resolve(number).is_some());
    }
    assert!(recorder.archive().resolve(1).is_none());

    let names: Vec<_> = labels(&mut recorder).into_iter().map(|(from, _)| from).collect();
    assert_eq!(
        names,
        vec![
            EXITED_DYNAMIC_THREAD,
            EXITED_DYNAMIC_THREAD,
            EXITED_DYNAMIC_THREAD,
            EXITED_DYNAMIC_THREAD,
            UNKNOWN_THREAD,
        ]
    );
}

#[test]
fn archived_name_survives_until_sentinel_scrolls_out() {
    let mut recorder = SmallRecorder::new(true);
    let c = named(3, "C", 1);
    recorder.thread_created(A);
    recorder.thread_created(B);
    recorder.thread_created(c);

    recorder.context_switch(c, A, 1);
    recorder.thread_exited(c, 2);
    let event = recorder.event_at(0).unwrap();
    assert!(matches!(event.to, ThreadLabel::Removed(entry) if entry.number == 3));
    assert_eq!(event.to.name(), "C");

    // Six more writes fill the log, the next one overwrites the first switch
    for tick in 3..9 {
        recorder.context_switch(B, A, tick);
    }
    assert_eq!(recorder.archive().len(), 1);
    recorder.context_switch(A, B, 9);
    assert_eq!(recorder.archive().len(), 1);

    // and the one after that the sentinel
    recorder.context_switch(B, A, 10);
    assert!(recorder.archive().is_empty());
}

#[test]
fn pause_gates_both_switches_and_sentinels() {
    let mut recorder = SmallRecorder::new(true);
    recorder.thread_created(A);
    recorder.thread_created(B);

    recorder.pause();
    recorder.context_switch(B, A, 1);
    recorder.thread_exited(B, 2);
    recorder.resume();

    assert!(recorder.log().is_empty());
    assert!(recorder.archive().is_empty());
    assert_eq!(recorder.stats().gated, 2);
    // The registry still followed the exit
    assert_eq!(recorder.registry().len(), 1);
    assert_eq!(recorder.mode(), TriggerMode::Run);
}

#[test]
fn dropped_writes_do_not_retire_an_archived_removal() {
    let mut recorder = SmallRecorder::new(true);
    let leaving = named(3, "leaving", 5);
    recorder.thread_created(A);
    recorder.thread_created(B);
    recorder.thread_created(leaving);
    recorder.thread_exited(leaving, 0);
    for tick in 1..8 {
        recorder.context_switch(B, A, tick);
    }
    // The cursor now sits on the sentinel
    assert!(recorder.log().is_full());
    assert_eq!(recorder.log().position(), 0);
    assert_eq!(recorder.archive().len(), 1);

    recorder.set_default_log(false);
    let quiet_a = named(4, "quiet a", 1);
    let quiet_b = named(5, "quiet b", 1);
    recorder.thread_created(quiet_a);
    recorder.thread_created(quiet_b);
    recorder.context_switch(quiet_b, quiet_a, 8);

    recorder.pause();
    recorder.context_switch(B, A, 9);
    recorder.resume();

    assert_eq!(recorder.archive().len(), 1);
    assert_eq!(entries(&recorder)[0], (0, 3, 3));
    assert_eq!(recorder.stats().filtered, 1);
    assert_eq!(recorder.stats().gated, 1);

    recorder.context_switch(B, A, 10);
    assert!(recorder.archive().is_empty());
    assert_eq!(entries(&recorder).last(), Some(&(10, 1, 2)));
}
