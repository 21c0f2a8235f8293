//! Wires the fixed topology: source → filter & key → aggregate → sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::{AggregateState, Aggregator};
use crate::batch::Batcher;
use crate::ops;
use crate::sinks::{Sink, WeekTotal};
use crate::snapshot::{deserialize_state, serialize_state, PersistenceBackend, PersistenceError};
use crate::sources::{EventSource, SourceError};

/// Cooperative cancellation for a running job.
///
/// The whole pipeline is cancelled as a unit. Cancelling never interrupts a
/// batch mid-flight; the in-flight batch commits before the loop exits.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the job holding this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The complete streaming job: one source, one filter and key stage, one
/// stateful weekly aggregator, one sink.
#[derive(Builder)]
pub struct ToneJob<S, P, O> {
    source: S,
    persistence: P,
    sink: O,
    /// Country whose events are kept, exact match
    #[builder(into, default = String::from("USA"))]
    country: String,
    /// Wall-clock duration of one micro-batch
    #[builder(default = Duration::from_millis(1000))]
    batch_interval: Duration,
    /// Token cancelling the whole pipeline as a unit
    #[builder(default)]
    cancel: CancelToken,
}

impl<S, P, O> ToneJob<S, P, O>
where
    S: EventSource,
    P: PersistenceBackend,
    O: Sink,
{
    /// Run the job until the feed ends or the job is cancelled.
    ///
    /// State is restored once at startup and saved at every batch boundary
    /// before the batch's totals are emitted: a batch either fully commits,
    /// state persisted and totals emitted, or the job fails with that batch
    /// unacknowledged and nothing emitted.
    pub fn execute(self) -> Result<(), JobError> {
        let Self {
            source,
            mut persistence,
            mut sink,
            country,
            batch_interval,
            cancel,
        } = self;

        let state = match persistence.load()? {
            Some(bytes) => deserialize_state(&bytes)?,
            None => AggregateState::default(),
        };
        info!(country = %country, weeks = state.len(), "starting job");

        let mut batcher = Batcher::spawn(source, batch_interval);
        batcher.resume_from(state.last_applied().map_or(0, |seq| seq + 1));
        let mut aggregator = Aggregator::new(state);

        loop {
            if cancel.is_cancelled() {
                info!("job cancelled");
                break;
            }
            let Some(batch) = batcher.next_batch()? else {
                info!("event feed ended");
                break;
            };
            if batch.events.is_empty() {
                continue;
            }
            let keyed = batch
                .events
                .iter()
                .filter(|event| ops::matches(event, &country))
                .map(|event| (ops::key_of(event), event.avg_tone));
            let emitted = aggregator.apply(batch.seq, keyed);
            if emitted.is_empty() {
                continue;
            }
            let bytes = serialize_state(aggregator.state())?;
            persistence.save(&bytes)?;
            debug!(batch = batch.seq, updates = emitted.len(), "committed batch");
            for (week, total) in emitted {
                sink.sink(WeekTotal { week, total });
            }
        }
        Ok(())
    }
}

/// Terminal failure of a job run
#[derive(Debug, Error)]
pub enum JobError {
    /// The event feed failed; the surrounding runtime should retry
    #[error("event source failed")]
    Source(#[from] SourceError),
    /// Saving or restoring state failed; the current batch was not
    /// acknowledged and nothing was emitted for it
    #[error("state persistence failed")]
    Persistence(#[from] PersistenceError),
}
