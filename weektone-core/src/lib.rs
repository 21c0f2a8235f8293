//! Weektone is a micro-batched streaming job which folds GDELT event tones
//! into durable weekly running totals for a single country.
pub mod aggregate;
pub mod batch;
pub mod job;
pub mod ops;
pub mod sinks;
pub mod snapshot;
pub mod sources;
pub mod types;
