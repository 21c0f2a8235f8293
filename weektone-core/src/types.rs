//! Core data shapes moving through the job.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A single GDELT event record as delivered by a source.
/// Only the fields the pipeline consumes are carried.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// CAMEO country code of the event's first actor, may be empty
    pub actor_country_code: String,
    /// Instant the record was added to the GDELT feed
    pub date_added: DateTime<Utc>,
    /// Average tone of all documents mentioning the event
    pub avg_tone: f64,
}

impl Event {
    /// Create a new event record
    pub fn new(
        actor_country_code: impl Into<String>,
        date_added: DateTime<Utc>,
        avg_tone: f64,
    ) -> Self {
        Self {
            actor_country_code: actor_country_code.into(),
            date_added,
            avg_tone,
        }
    }
}

/// The Monday identifying the calendar week an event belongs to.
///
/// The wrapped date is always a Monday. Normalization happens in UTC, so the
/// key of a given instant is the same on every machine regardless of its
/// local time zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// Normalize an instant to the Monday of its containing week.
    pub fn of(instant: &DateTime<Utc>) -> Self {
        Self(instant.date_naive().week(Weekday::Mon).first_day())
    }

    /// The Monday this key wraps
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A time-bounded group of events processed as one unit.
///
/// Batches carry a strictly increasing sequence number assigned by the
/// batcher. The number doubles as the replay-deduplication token: applying
/// the same batch twice must not double-count.
#[derive(Debug, Clone, PartialEq)]
pub struct MicroBatch {
    /// Position of this batch in the arrival order
    pub seq: u64,
    /// The events collected during the batch interval, arrival order
    pub events: Vec<Event>,
}
