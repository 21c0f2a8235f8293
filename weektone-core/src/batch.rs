//! Time-driven micro-batching of the event feed.

use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::sources::{EventSource, SourceError};
use crate::types::{Event, MicroBatch};

// How long the source thread sleeps when the feed has no event ready
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Collects a source's events into micro-batches on a fixed wall-clock
/// interval.
///
/// The source runs on its own thread and its events are buffered until the
/// next batch boundary. Boundaries are time-driven, not count-driven, so a
/// batch may well be empty. Batches are handed out in strict arrival order
/// with strictly increasing sequence numbers.
pub struct Batcher {
    rx: flume::Receiver<Result<Event, SourceError>>,
    interval: Duration,
    next_seq: u64,
}

impl Batcher {
    /// Spawn `source` on its own thread and batch its output every
    /// `interval`. The source thread ends when the feed is exhausted, the
    /// feed fails, or the batcher is dropped.
    pub fn spawn(mut source: impl EventSource, interval: Duration) -> Self {
        let (tx, rx) = flume::unbounded();
        thread::spawn(move || loop {
            if source.is_finished() {
                break;
            }
            match source.poll() {
                Ok(Some(event)) => {
                    if tx.send(Ok(event)).is_err() {
                        break;
                    }
                }
                Ok(None) => thread::sleep(IDLE_BACKOFF),
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        });
        Self {
            rx,
            interval,
            next_seq: 0,
        }
    }

    /// Re-seat the sequence counter, e.g. to continue numbering after the
    /// last batch applied before a restart.
    pub fn resume_from(&mut self, next_seq: u64) {
        self.next_seq = next_seq;
    }

    /// Block until the current batch interval elapses and return the
    /// interval's events as one batch. `Ok(None)` once the feed is exhausted
    /// and every buffered event has been handed out.
    pub fn next_batch(&mut self) -> Result<Option<MicroBatch>, SourceError> {
        let deadline = Instant::now() + self.interval;
        let mut events = Vec::new();
        let mut disconnected = false;
        loop {
            match self.rx.recv_deadline(deadline) {
                Ok(Ok(event)) => events.push(event),
                Ok(Err(e)) => return Err(e),
                Err(flume::RecvTimeoutError::Timeout) => break,
                Err(flume::RecvTimeoutError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if events.is_empty() && disconnected {
            return Ok(None);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(seq, events = events.len(), "closed micro-batch");
        Ok(Some(MicroBatch { seq, events }))
    }
}
