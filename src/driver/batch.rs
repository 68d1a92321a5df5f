use super::processor::FileProcessor;
use super::progress::ProgressSink;
use super::walker::find_files;
use crate::error::EtlResult;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, error};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_found: usize,
    pub files_processed: usize,
    pub rows_written: usize,
}

/// Run `processor` over every `extension` file under `root`, one transaction
/// per file.
///
/// The first failing file is rolled back and its error returned. Files
/// processed before it stay committed.
pub fn process_data(
    conn: &mut Connection,
    root: &Path,
    extension: &str,
    processor: &dyn FileProcessor,
    progress: &mut dyn ProgressSink,
) -> EtlResult<BatchSummary> {
    let files = find_files(root, extension)?;
    let total = files.len();
    progress.files_found(total, root);

    let mut summary = BatchSummary {
        files_found: total,
        ..Default::default()
    };

    for (i, path) in files.iter().enumerate() {
        let tx = conn.transaction()?;
        let rows = match processor.process(&tx, path) {
            Ok(rows) => rows,
            Err(err) => {
                error!(
                    "Failed to process {} file {}: {}",
                    processor.name(),
                    path.display(),
                    err
                );
                // Dropping the transaction rolls it back.
                drop(tx);
                progress.finished();
                return Err(err);
            }
        };
        tx.commit()?;

        summary.files_processed += 1;
        summary.rows_written += rows;
        debug!("{}: {} rows", path.display(), rows);
        progress.file_processed(i + 1, total, path);
    }

    progress.finished();
    Ok(summary)
}
