use crate::{
    DecodedId, Error, SEQUENCE_SPACE, SnowflakeGenerator, SnowflakeId, SystemClock,
    TIMESTAMP_MASK, TimeSource, encode,
};
use core::{cell::Cell, time::Duration};
use std::{collections::HashSet, sync::Arc, sync::Mutex, thread::scope};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Replays `values` one read at a time, then keeps returning the last value.
struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl MockStepTime {
    fn new(values: &[u64]) -> Self {
        Self {
            values: values.to_vec(),
            index: Cell::new(0),
        }
    }
}

impl TimeSource for MockStepTime {
    fn current_millis(&self) -> u64 {
        let i = self.index.get();
        self.index.set(i + 1);
        self.values[i.min(self.values.len() - 1)]
    }
}

/// Advances one millisecond every `reads_per_tick` reads.
struct CountingTime {
    start: u64,
    reads_per_tick: u64,
    reads: Cell<u64>,
}

impl TimeSource for CountingTime {
    fn current_millis(&self) -> u64 {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        self.start + reads / self.reads_per_tick
    }
}

#[test]
fn rejects_out_of_range_worker_ids() {
    for worker_id in [0_i64, 1024, -1, i64::MIN, i64::MAX] {
        match SnowflakeGenerator::new(worker_id) {
            Err(Error::InvalidWorkerId { worker_id: got }) => assert_eq!(got, worker_id),
            other => panic!("worker id {worker_id} accepted: {other:?}"),
        }
    }
}

#[test]
fn accepts_boundary_worker_ids() {
    assert_eq!(SnowflakeGenerator::new(1).unwrap().worker_id(), 1);
    assert_eq!(SnowflakeGenerator::new(1023).unwrap().worker_id(), 1023);
    assert_eq!(SnowflakeGenerator::new(7_u16).unwrap().worker_id(), 7);
}

#[test]
fn first_id_starts_at_sequence_zero() {
    let generator = SnowflakeGenerator::with_time(3, MockTime { millis: 42 }).unwrap();
    let id = generator.next_id();

    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.worker_id(), 3);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = SnowflakeGenerator::with_time(1, MockTime { millis: 42 }).unwrap();
    let id1 = generator.next_id();
    let id2 = generator.next_id();
    let id3 = generator.next_id();

    assert_eq!(
        [id1.sequence(), id2.sequence(), id3.sequence()],
        [0, 1, 2]
    );
    assert!(id1.timestamp() == 42 && id2.timestamp() == 42 && id3.timestamp() == 42);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn sequence_carries_over_when_tick_advances_before_wrap() {
    let generator = SnowflakeGenerator::with_time(1, MockStepTime::new(&[42, 43])).unwrap();
    let id1 = generator.next_id();
    let id2 = generator.next_id();

    assert_eq!((id1.timestamp(), id1.sequence()), (42, 0));
    // The counter only resets on wrap, not on a new tick.
    assert_eq!((id2.timestamp(), id2.sequence()), (43, 1));
}

#[test]
fn exhausted_tick_spins_until_clock_advances() {
    let time = MockStepTime::new(&[42, 42, 42, 43]);
    let generator =
        SnowflakeGenerator::from_components(42, 1, SEQUENCE_SPACE - 1, &time).unwrap();

    let id = generator.next_id();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(time.index.get(), 4);
}

#[test]
fn sequence_never_exceeds_4094_in_one_tick() {
    let time = CountingTime {
        start: 42,
        reads_per_tick: 5_000,
        reads: Cell::new(0),
    };
    let generator = SnowflakeGenerator::with_time(1, time).unwrap();

    for expected in 0..SEQUENCE_SPACE {
        let id = generator.next_id();
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), expected);
    }

    let rolled = generator.next_id();
    assert_eq!(rolled.timestamp(), 43);
    assert_eq!(rolled.sequence(), 0);
}

#[test]
fn next_id_follows_backwards_clock_without_detection() {
    let generator = SnowflakeGenerator::with_time(1, MockStepTime::new(&[50, 40])).unwrap();
    let a = generator.next_id();
    let b = generator.next_id();
    assert!(b < a);
}

#[test]
fn timestamp_past_41_bits_is_packed_without_panicking() {
    let millis = TIMESTAMP_MASK + 1;
    let generator = SnowflakeGenerator::with_time(1, MockTime { millis }).unwrap();

    assert_eq!(generator.next_id().to_raw(), encode(millis, 1, 0));
    assert_eq!(generator.try_next_id().unwrap().to_raw(), encode(millis, 1, 1));
}

#[test]
fn try_next_id_rejects_backwards_clock_and_keeps_state() {
    let time = MockStepTime::new(&[50, 40, 50]);
    let generator = SnowflakeGenerator::with_time(1, &time).unwrap();

    let first = generator.try_next_id().unwrap();
    assert_eq!((first.timestamp(), first.sequence()), (50, 0));

    match generator.try_next_id() {
        Err(Error::ClockMovedBackwards { last, now }) => assert_eq!((last, now), (50, 40)),
        other => panic!("expected backwards clock error, got {other:?}"),
    }

    // The failed call consumed no sequence number.
    let second = generator.try_next_id().unwrap();
    assert_eq!((second.timestamp(), second.sequence()), (50, 1));
}

#[test]
fn try_next_id_detects_backwards_clock_while_spinning() {
    let generator =
        SnowflakeGenerator::from_components(42, 1, SEQUENCE_SPACE - 1, MockStepTime::new(&[42, 41]))
            .unwrap();

    assert!(matches!(
        generator.try_next_id(),
        Err(Error::ClockMovedBackwards { last: 42, now: 41 })
    ));
}

#[test]
fn try_next_id_times_out_on_frozen_clock() {
    let generator =
        SnowflakeGenerator::from_components(42, 1, SEQUENCE_SPACE - 1, MockTime { millis: 42 })
            .unwrap()
            .with_max_spin(Duration::from_millis(5));

    match generator.try_next_id() {
        Err(Error::SpinTimeout { waited }) => assert!(waited >= Duration::from_millis(5)),
        other => panic!("expected spin timeout, got {other:?}"),
    }
}

#[test]
fn try_next_id_matches_next_id_on_healthy_clock() {
    let generator = SnowflakeGenerator::with_time(9, MockTime { millis: 7 })
        .unwrap()
        .with_max_spin(Duration::from_millis(5));
    assert_eq!(generator.max_spin(), Some(Duration::from_millis(5)));

    let a = generator.try_next_id().unwrap();
    let b = generator.next_id();
    assert_eq!(b.to_raw(), a.to_raw() + 1);
}

#[test]
fn load_never_repeats_or_decreases() {
    let generator = SnowflakeGenerator::new(1).unwrap();

    let mut current = generator.next_id().decode();
    for _ in 0..SEQUENCE_SPACE * 10 {
        let next = generator.next_id().decode();

        if next.sequence == 0 {
            assert!(
                next.timestamp > current.timestamp,
                "time must increase for new sequence count"
            );
        }
        if next.timestamp == current.timestamp {
            assert!(
                next.sequence > current.sequence,
                "sequence must increase for unchanged timestamp"
            );
        }
        assert!(u64::from(next.sequence) < SEQUENCE_SPACE);
        assert!(next.id > current.id, "id not increasing");
        assert_eq!(next.worker_id, 1);

        current = next;
    }
}

#[test]
fn threaded_ids_are_unique() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096 * 8;
    const TOTAL_IDS: usize = THREADS * IDS_PER_THREAD;

    let generator = Arc::new(SnowflakeGenerator::new(5).unwrap());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                let mut last: Option<SnowflakeId> = None;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id();
                    // Each thread observes its own calls in lock order.
                    if let Some(last) = last {
                        assert!(id > last);
                    }
                    last = Some(id);
                    local.push(id);
                }
                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id:?}");
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn generator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SnowflakeGenerator<SystemClock>>();
}

#[test]
fn decoded_record_mirrors_generated_id() {
    let generator = SnowflakeGenerator::with_time(1023, MockTime { millis: 1 }).unwrap();
    let id = generator.next_id();

    assert_eq!(
        id.decode(),
        DecodedId {
            id: id.to_raw(),
            timestamp: 1,
            worker_id: 1023,
            sequence: 0,
        }
    );
}

#[test]
fn debug_output_exposes_state() {
    let generator = SnowflakeGenerator::with_time(2, MockTime { millis: 42 }).unwrap();
    generator.next_id();
    let rendered = format!("{generator:?}");
    assert!(rendered.contains("worker_id: 2"));
    assert!(rendered.contains("last_timestamp: 42"));
}
