//! The per-stage callbacks of the pipeline, kept as named free functions so
//! each can be tested in isolation.

use crate::types::{Event, WeekKey};

/// Filter predicate: keep an event iff its actor country code equals the
/// configured country. Exact match, case sensitive.
pub fn matches(event: &Event, country: &str) -> bool {
    event.actor_country_code == country
}

/// Key derivation: the Monday of the week containing `date_added`, in UTC.
pub fn key_of(event: &Event) -> WeekKey {
    WeekKey::of(&event.date_added)
}

/// In-batch reduction: sum the tone values of one week's contributions.
/// Addition is commutative, so the order of events within a batch does not
/// matter.
pub fn fold(tones: impl IntoIterator<Item = f64>) -> f64 {
    tones.into_iter().sum()
}

/// Merge a batch's sum into the prior running total.
pub fn combine(prior: f64, batch_sum: f64) -> f64 {
    prior + batch_sum
}
