use super::{Sink, WeekTotal};

/// Prints every update as one report line:
/// `Country(USA), Week(2024-03-04), AvgTone(4.0)`
pub struct StdOutSink {
    country: String,
}

impl StdOutSink {
    /// Create a sink reporting totals for the given country
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
        }
    }

    fn format_line(&self, update: &WeekTotal) -> String {
        // {:?} so whole totals still render as floats, e.g. 4.0 not 4
        format!(
            "Country({}), Week({}), AvgTone({:?})",
            self.country, update.week, update.total
        )
    }
}

impl Sink for StdOutSink {
    fn sink(&mut self, update: WeekTotal) {
        println!("{}", self.format_line(&update));
    }
}
