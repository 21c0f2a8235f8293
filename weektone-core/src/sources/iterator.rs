use std::iter::Peekable;

use crate::types::Event;

use super::{EventSource, SourceError};

/// A source which yields events from an iterator.
///
/// Mainly useful for feeding known events into a job in tests and examples.
pub struct IteratorSource {
    events: Peekable<Box<dyn Iterator<Item = Event> + Send>>,
}

impl IteratorSource {
    /// Create a new source from an iterable collection of events
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Event>,
        I::IntoIter: Send + 'static,
    {
        let boxed: Box<dyn Iterator<Item = Event> + Send> = Box::new(events.into_iter());
        Self {
            events: boxed.peekable(),
        }
    }
}

impl EventSource for IteratorSource {
    fn poll(&mut self) -> Result<Option<Event>, SourceError> {
        Ok(self.events.next())
    }

    fn is_finished(&mut self) -> bool {
        self.events.peek().is_none()
    }
}
