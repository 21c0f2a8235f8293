use std::sync::{Arc, Mutex};

use super::{Sink, WeekTotal};

/// A helper which writes updates into a shared vector and takes them out
/// again. Mainly useful to extract a job's output in unit tests. Uses an
/// `Arc<Mutex<Vec<T>>>` internally, so it can be freely cloned.
#[derive(Debug, Clone)]
pub struct VecSink<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for VecSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::unwrap_used)]
impl<T> VecSink<T> {
    /// Create a new sink collecting all updates into a `Vec`
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Put a value into this sink
    pub fn give(&self, value: T) {
        self.inner.lock().unwrap().push(value)
    }

    /// Take all collected values out of this sink
    pub fn take_vec(&self) -> Vec<T> {
        self.inner.lock().unwrap().drain(..).collect()
    }
}

impl<T> IntoIterator for VecSink<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.take_vec().into_iter()
    }
}

impl Sink for VecSink<WeekTotal> {
    fn sink(&mut self, update: WeekTotal) {
        self.give(update);
    }
}
