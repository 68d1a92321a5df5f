//! Local staging files consumed by the bulk-load statements.
//!
//! File names are fixed and every write truncates, so at most one log file may
//! be in flight per staging directory.

use crate::error::EtlResult;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StagingFile {
    Time,
    Users,
    Songplays,
}

impl StagingFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            StagingFile::Time => "time_tmp.csv",
            StagingFile::Users => "users_tmp.csv",
            StagingFile::Songplays => "songplay_tmp.csv",
        }
    }
}

#[derive(Clone, Debug)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Use `dir` for staging files, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> EtlResult<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(StagingArea {
            dir: fs::canonicalize(dir.as_ref())?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path of a staging file.
    pub fn path(&self, file: StagingFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    /// Overwrite `file` with `rows` as header-less CSV and return its path.
    pub fn write<T: Serialize>(&self, file: StagingFile, rows: &[T]) -> EtlResult<PathBuf> {
        let path = self.path(file);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}
