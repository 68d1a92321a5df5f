//! Progress reporting for the batch driver.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

pub trait ProgressSink {
    fn files_found(&mut self, count: usize, root: &Path);
    fn file_processed(&mut self, index: usize, total: usize, path: &Path);
    fn finished(&mut self) {}
}

/// Reports through `tracing`, one line per file.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn files_found(&mut self, count: usize, root: &Path) {
        info!("{} files found in {}", count, root.display());
    }

    fn file_processed(&mut self, index: usize, total: usize, _path: &Path) {
        info!("{}/{} files processed.", index, total);
    }
}

/// Terminal progress bar, one bar per directory root.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl ProgressSink for BarProgress {
    fn files_found(&mut self, count: usize, root: &Path) {
        info!("{} files found in {}", count, root.display());
        let bar = ProgressBar::new(count as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} files processed {msg}")
        {
            bar.set_style(style);
        }
        self.bar = Some(bar);
    }

    fn file_processed(&mut self, _index: usize, _total: usize, path: &Path) {
        if let Some(bar) = &self.bar {
            if let Some(name) = path.file_name() {
                bar.set_message(name.to_string_lossy().to_string());
            }
            bar.inc(1);
        }
    }

    fn finished(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message("done");
        }
    }
}
