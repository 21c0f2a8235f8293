//! End-to-end runs of the fixed pipeline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use weektone::aggregate::AggregateState;
use weektone::job::{CancelToken, JobError, ToneJob};
use weektone::sinks::VecSink;
use weektone::snapshot::{deserialize_state, MemoryBackend, PersistenceBackend, PersistenceError};
use weektone::sources::IteratorSource;
use weektone::types::{Event, WeekKey};

const INTERVAL: Duration = Duration::from_millis(200);

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid timestamp")
}

/// Two matching events in the same week fold into one weekly total; an
/// event for another country never contributes.
#[test]
fn accumulates_one_week_and_filters_by_country() {
    let events = vec![
        Event::new("USA", utc("2024-03-05T10:00:00Z"), 2.5),
        Event::new("FRA", utc("2024-03-05T11:00:00Z"), 99.0),
        Event::new("USA", utc("2024-03-06T09:00:00Z"), 1.5),
    ];
    let sink = VecSink::new();

    // country defaults to USA
    let job = ToneJob::builder()
        .source(IteratorSource::new(events))
        .persistence(MemoryBackend::new())
        .sink(sink.clone())
        .batch_interval(INTERVAL)
        .build();
    job.execute().expect("job runs to completion");

    let monday = WeekKey::of(&utc("2024-03-04T00:00:00Z"));
    let updates = sink.take_vec();
    assert!(!updates.is_empty());
    for update in &updates {
        assert_eq!(update.week, monday);
        assert!(update.total <= 4.0);
    }
    let last = updates.last().expect("at least one update");
    assert_eq!(last.total, 4.0);
}

/// A restarted job restores its snapshot and continues the running totals
/// exactly where the previous run left off.
#[test]
fn restart_continues_totals_from_snapshot() {
    let backend = MemoryBackend::new();
    let monday = WeekKey::of(&utc("2024-03-04T00:00:00Z"));

    let first_run = ToneJob::builder()
        .source(IteratorSource::new(vec![
            Event::new("USA", utc("2024-03-05T10:00:00Z"), 2.5),
            Event::new("USA", utc("2024-03-06T09:00:00Z"), 1.5),
        ]))
        .persistence(backend.clone())
        .sink(VecSink::new())
        .country("USA")
        .batch_interval(INTERVAL)
        .build();
    first_run.execute().expect("first run completes");

    let sink = VecSink::new();
    let second_run = ToneJob::builder()
        .source(IteratorSource::new(vec![Event::new(
            "USA",
            utc("2024-03-07T08:00:00Z"),
            3.0,
        )]))
        .persistence(backend.clone())
        .sink(sink.clone())
        .country("USA")
        .batch_interval(INTERVAL)
        .build();
    second_run.execute().expect("second run completes");

    let updates = sink.take_vec();
    let last = updates.last().expect("second run emitted");
    assert_eq!(last.week, monday);
    assert_eq!(last.total, 7.0);

    let bytes = backend.load().expect("loads").expect("snapshot exists");
    let state: AggregateState = deserialize_state(&bytes).expect("decodes");
    assert_eq!(state.total(&monday), Some(7.0));
}

/// A cancelled job exits cleanly without emitting anything.
#[test]
fn cancelled_job_emits_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let sink = VecSink::new();

    let job = ToneJob::builder()
        .source(IteratorSource::new(vec![Event::new(
            "USA",
            utc("2024-03-05T10:00:00Z"),
            2.5,
        )]))
        .persistence(MemoryBackend::new())
        .sink(sink.clone())
        .cancel(cancel)
        .batch_interval(INTERVAL)
        .build();
    job.execute().expect("cancellation is not an error");

    assert!(sink.take_vec().is_empty());
}

/// If the snapshot cannot be saved the batch is not acknowledged: the job
/// fails and nothing is emitted for the batch.
#[test]
fn persistence_failure_aborts_before_emitting() {
    struct FailingBackend;
    impl PersistenceBackend for FailingBackend {
        fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
            Ok(None)
        }
        fn save(&mut self, _state: &[u8]) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }
    }

    let sink = VecSink::new();
    let job = ToneJob::builder()
        .source(IteratorSource::new(vec![Event::new(
            "USA",
            utc("2024-03-05T10:00:00Z"),
            2.5,
        )]))
        .persistence(FailingBackend)
        .sink(sink.clone())
        .batch_interval(INTERVAL)
        .build();

    let err = job.execute().expect_err("save fails");
    assert!(matches!(err, JobError::Persistence(_)));
    assert!(sink.take_vec().is_empty());
}
