//! The stateful heart of the job: a durable running tone total per week.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::ops;
use crate::types::WeekKey;

/// The aggregator's durable state: one running total per week, plus the
/// sequence number of the last batch folded in.
///
/// Entries are created lazily on first contribution and never evicted, so
/// retention is unbounded over the lifetime of the state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateState {
    totals: IndexMap<WeekKey, f64>,
    last_applied: Option<u64>,
}

impl AggregateState {
    /// Running total for the given week, if any batch has contributed to it
    pub fn total(&self, week: &WeekKey) -> Option<f64> {
        self.totals.get(week).copied()
    }

    /// Number of weeks with a running total
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// True if no batch has contributed yet
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sequence number of the last applied batch
    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}

/// Folds filtered, keyed micro-batches into an [AggregateState].
///
/// The aggregator exclusively owns its state; every update goes through
/// [apply](Aggregator::apply) and is deterministic given the prior state and
/// the batch contributions, which is what makes replay after recovery sound.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: AggregateState,
}

impl Aggregator {
    /// Create an aggregator over previously restored state
    pub fn new(state: AggregateState) -> Self {
        Self { state }
    }

    /// The current state, e.g. for snapshotting
    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// Fold one micro-batch worth of `(week, tone)` pairs into the running
    /// totals and return the new total of every week the batch touched,
    /// ordered by week.
    ///
    /// A batch sequence number at or below the last applied one is a replay;
    /// it is ignored entirely so redelivery cannot double-count.
    pub fn apply(
        &mut self,
        batch_seq: u64,
        keyed: impl IntoIterator<Item = (WeekKey, f64)>,
    ) -> Vec<(WeekKey, f64)> {
        if self.state.last_applied.is_some_and(|last| batch_seq <= last) {
            tracing::debug!(batch_seq, "ignoring replayed batch");
            return Vec::new();
        }

        let groups = keyed.into_iter().into_group_map();
        let mut emitted = Vec::with_capacity(groups.len());
        for (week, tones) in groups.into_iter().sorted_unstable_by_key(|(week, _)| *week) {
            let batch_sum = ops::fold(tones);
            let prior = self.state.totals.get(&week).copied().unwrap_or(0.0);
            let new_total = ops::combine(prior, batch_sum);
            self.state.totals.insert(week, new_total);
            emitted.push((week, new_total));
        }
        self.state.last_applied = Some(batch_seq);
        emitted
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn week(s: &str) -> WeekKey {
        let ts: DateTime<Utc> = format!("{s}T12:00:00Z").parse().expect("valid date");
        WeekKey::of(&ts)
    }

    /// totals accumulate across batches: total_n = total_{n-1} + batch_sum_n
    #[test]
    fn accumulates_across_batches() {
        let mut agg = Aggregator::default();
        let wk = week("2024-03-05");

        let first = agg.apply(0, [(wk, 2.5), (wk, 1.5)]);
        assert_eq!(first, vec![(wk, 4.0)]);

        let second = agg.apply(1, [(wk, 3.0)]);
        assert_eq!(second, vec![(wk, 7.0)]);
        assert_eq!(agg.state().total(&wk), Some(7.0));
    }

    /// updating one week never changes another
    #[test]
    fn weeks_are_isolated() {
        let mut agg = Aggregator::default();
        let a = week("2024-03-05");
        let b = week("2024-03-12");

        agg.apply(0, [(a, 1.0), (b, 10.0)]);
        agg.apply(1, [(a, 2.0)]);

        assert_eq!(agg.state().total(&a), Some(3.0));
        assert_eq!(agg.state().total(&b), Some(10.0));
    }

    /// replaying an already applied batch is a no-op
    #[test]
    fn replayed_batch_does_not_double_count() {
        let mut agg = Aggregator::default();
        let wk = week("2024-03-05");

        agg.apply(0, [(wk, 4.0)]);
        let replay = agg.apply(0, [(wk, 4.0)]);

        assert!(replay.is_empty());
        assert_eq!(agg.state().total(&wk), Some(4.0));
        assert_eq!(agg.state().last_applied(), Some(0));
    }

    /// emissions come out ordered by week regardless of arrival order
    #[test]
    fn emissions_are_ordered_by_week() {
        let mut agg = Aggregator::default();
        let early = week("2024-03-05");
        let late = week("2024-03-12");

        let emitted = agg.apply(0, [(late, 1.0), (early, 2.0), (late, 3.0)]);
        assert_eq!(emitted, vec![(early, 2.0), (late, 4.0)]);
    }

    /// a batch with no surviving events still advances the dedup cursor
    #[test]
    fn empty_contribution_advances_cursor() {
        let mut agg = Aggregator::default();
        let emitted = agg.apply(3, []);
        assert!(emitted.is_empty());
        assert!(agg.state().is_empty());
        assert_eq!(agg.state().last_applied(), Some(3));
    }
}
