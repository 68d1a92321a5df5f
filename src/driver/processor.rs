use crate::error::EtlResult;
use crate::query_catalog::QueryCatalog;
use crate::transform::{process_log_file, process_song_file, StagingArea};
use rusqlite::Connection;
use std::path::Path;

/// Loads one source file into the warehouse through `conn`.
///
/// Implementations must not commit; the driver owns the transaction.
pub trait FileProcessor {
    fn name(&self) -> &'static str;

    /// Returns the number of warehouse rows written or merged.
    fn process(&self, conn: &Connection, path: &Path) -> EtlResult<usize>;
}

pub struct SongFileProcessor<'a> {
    catalog: &'a QueryCatalog,
}

impl<'a> SongFileProcessor<'a> {
    pub fn new(catalog: &'a QueryCatalog) -> Self {
        Self { catalog }
    }
}

impl FileProcessor for SongFileProcessor<'_> {
    fn name(&self) -> &'static str {
        "song"
    }

    fn process(&self, conn: &Connection, path: &Path) -> EtlResult<usize> {
        process_song_file(conn, self.catalog, path)?;
        Ok(2)
    }
}

pub struct LogFileProcessor<'a> {
    catalog: &'a QueryCatalog,
    staging: &'a StagingArea,
}

impl<'a> LogFileProcessor<'a> {
    pub fn new(catalog: &'a QueryCatalog, staging: &'a StagingArea) -> Self {
        Self { catalog, staging }
    }
}

impl FileProcessor for LogFileProcessor<'_> {
    fn name(&self) -> &'static str {
        "log"
    }

    fn process(&self, conn: &Connection, path: &Path) -> EtlResult<usize> {
        let summary = process_log_file(conn, self.catalog, self.staging, path)?;
        Ok(summary.time_rows_added + summary.users_merged + summary.songplays_added)
    }
}
