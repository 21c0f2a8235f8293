//! Sources deliver the raw event feed to the job.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Event;

mod gdelt_file;
mod iterator;

pub use gdelt_file::GdeltFileSource;
pub use iterator::IteratorSource;

/// A source produces events one poll at a time.
///
/// Sources run on their own thread, so implementations must be [Send]. A
/// source is not restartable mid-stream; picking up after a crash is the
/// surrounding runtime's concern.
pub trait EventSource: Send + 'static {
    /// Poll for the next event. `Ok(None)` means no event is available right
    /// now, which is not the same as the feed being finished.
    fn poll(&mut self) -> Result<Option<Event>, SourceError>;

    /// True once the feed is exhausted and no further events will ever come
    fn is_finished(&mut self) -> bool {
        false
    }
}

/// Failure producing events. Propagated out of the job for the surrounding
/// runtime to retry with backoff.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The feed could not be reached, at startup or mid-stream
    #[error("event feed at {} unavailable", .path.display())]
    Unavailable {
        /// Location of the unreachable feed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}
