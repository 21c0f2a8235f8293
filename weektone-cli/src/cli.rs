use std::path::PathBuf;

/// Streaming GDELT analyzer: durable weekly running totals of event tone
/// for one country.
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct WeektoneArgs {
    /// Path to the GDELT 2.0 events export to stream from
    #[arg(short, long)]
    pub path: PathBuf,

    /// Micro-batch duration in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub micro_batch_duration: u64,

    /// Actor country code to keep, exact match
    #[arg(short, long, default_value = "USA")]
    pub country: String,

    /// File the aggregate state is checkpointed to
    #[arg(long, default_value = "checkpoint/weektone.state")]
    pub checkpoint: PathBuf,
}
