use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::types::Event;

use super::{EventSource, SourceError};

// Column positions in a GDELT 2.0 events export
const ACTOR1_COUNTRY_CODE: usize = 7;
const AVG_TONE: usize = 34;
const DATE_ADDED: usize = 59;
const COLUMNS: usize = 61;

// DATEADDED is yyyyMMddHHmmss in UTC
const DATE_ADDED_FORMAT: &str = "%Y%m%d%H%M%S";

/// Reads a GDELT 2.0 events export, tab separated with one event per line.
///
/// The file is opened lazily on the first poll; an unreachable feed surfaces
/// as [SourceError::Unavailable]. Rows which do not parse are dropped and
/// counted, and the count is logged once the feed is exhausted.
pub struct GdeltFileSource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    finished: bool,
    malformed: u64,
}

impl GdeltFileSource {
    /// Create a source reading the export at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: None,
            finished: false,
            malformed: 0,
        }
    }

    /// Number of malformed rows dropped so far
    pub fn malformed_count(&self) -> u64 {
        self.malformed
    }

    fn unavailable(&self, source: std::io::Error) -> SourceError {
        SourceError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl EventSource for GdeltFileSource {
    fn poll(&mut self) -> Result<Option<Event>, SourceError> {
        if self.finished {
            return Ok(None);
        }
        if self.lines.is_none() {
            let file = File::open(&self.path).map_err(|e| self.unavailable(e))?;
            info!(path = %self.path.display(), "opened event feed");
            self.lines = Some(BufReader::new(file).lines());
        }
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        loop {
            match lines.next() {
                Some(Ok(line)) => match parse_line(&line) {
                    Some(event) => return Ok(Some(event)),
                    None => {
                        self.malformed += 1;
                        debug!("dropping malformed event record");
                    }
                },
                Some(Err(e)) => {
                    let err = SourceError::Unavailable {
                        path: self.path.clone(),
                        source: e,
                    };
                    return Err(err);
                }
                None => {
                    self.finished = true;
                    info!(dropped = self.malformed, "event feed exhausted");
                    return Ok(None);
                }
            }
        }
    }

    fn is_finished(&mut self) -> bool {
        self.finished
    }
}

fn parse_line(line: &str) -> Option<Event> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < COLUMNS {
        return None;
    }
    let avg_tone: f64 = cols[AVG_TONE].parse().ok()?;
    let date_added = NaiveDateTime::parse_from_str(cols[DATE_ADDED], DATE_ADDED_FORMAT)
        .ok()?
        .and_utc();
    Some(Event::new(cols[ACTOR1_COUNTRY_CODE], date_added, avg_tone))
}
