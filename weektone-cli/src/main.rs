//! Command line runner for the weektone streaming job.

use std::time::Duration;

use clap::Parser;
use tracing::debug;
use weektone::job::{JobError, ToneJob};
use weektone::sinks::StdOutSink;
use weektone::snapshot::FileBackend;
use weektone::sources::GdeltFileSource;

mod cli;

fn main() {
    tracing_subscriber::fmt::init();
    match main_inner() {
        Ok(_) => (),
        Err(e) => {
            panic!("{:?}", eyre::Report::new(e))
        }
    }
}

fn main_inner() -> Result<(), JobError> {
    let args = cli::WeektoneArgs::parse();
    debug!("Got the following args: {args:?}");

    let job = ToneJob::builder()
        .source(GdeltFileSource::new(&args.path))
        .persistence(FileBackend::new(&args.checkpoint))
        .sink(StdOutSink::new(&args.country))
        .country(args.country)
        .batch_interval(Duration::from_millis(args.micro_batch_duration))
        .build();
    job.execute()
}
