//! Sinks receive the updated weekly totals emitted at each batch boundary.

use crate::types::WeekKey;

mod stdout;
mod vec_sink;

pub use stdout::StdOutSink;
pub use vec_sink::VecSink;

/// The update emitted for every week a batch touched.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekTotal {
    /// The week the update belongs to
    pub week: WeekKey,
    /// The week's new running tone total
    pub total: f64,
}

/// A sink consumes weekly total updates
pub trait Sink: 'static {
    /// Consume one update
    fn sink(&mut self, update: WeekTotal);
}
