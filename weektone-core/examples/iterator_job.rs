//! Runs the job over a handful of in-memory events and prints the weekly
//! totals to stdout.

use std::time::Duration;

use chrono::{DateTime, Utc};
use weektone::job::ToneJob;
use weektone::sinks::StdOutSink;
use weektone::snapshot::NoPersistence;
use weektone::sources::IteratorSource;
use weektone::types::Event;

fn main() {
    tracing_subscriber::fmt::init();

    let added = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
    let events = vec![
        Event::new("USA", added("2024-03-05T10:00:00Z"), 2.5),
        Event::new("USA", added("2024-03-06T09:00:00Z"), 1.5),
        Event::new("FRA", added("2024-03-06T10:00:00Z"), -0.5),
        Event::new("USA", added("2024-03-12T12:00:00Z"), 3.0),
    ];

    ToneJob::builder()
        .source(IteratorSource::new(events))
        .persistence(NoPersistence)
        .sink(StdOutSink::new("USA"))
        .country("USA")
        .batch_interval(Duration::from_millis(100))
        .build()
        .execute()
        .unwrap();
}
