//! Walks a data directory and feeds every file to a processor.

mod batch;
mod processor;
mod progress;
mod walker;

pub use batch::{process_data, BatchSummary};
pub use processor::{FileProcessor, LogFileProcessor, SongFileProcessor};
pub use progress::{BarProgress, LogProgress, ProgressSink};
pub use walker::find_files;
