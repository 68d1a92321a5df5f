//! Isolated warehouse plus data tree for one test.

use anyhow::Result;
use rusqlite::params;
use sparkify_etl::config::{AppConfig, CliConfig};
use sparkify_etl::driver::LogProgress;
use sparkify_etl::pipeline::{self, PipelineSummary};
use sparkify_etl::{QueryCatalog, Warehouse};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Dropping it removes the database, staging files and data tree.
pub struct TestWarehouse {
    pub config: AppConfig,
    pub catalog: QueryCatalog,
    pub warehouse: Warehouse,
    _dir: TempDir,
}

impl TestWarehouse {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data/song_data")).unwrap();
        fs::create_dir_all(dir.path().join("data/log_data")).unwrap();

        let cli = CliConfig {
            db_path: dir.path().join("sparkify.db"),
            song_data_dir: dir.path().join("data/song_data"),
            log_data_dir: dir.path().join("data/log_data"),
            staging_dir: dir.path().join("staging"),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        let warehouse = Warehouse::open(&config.db_path).unwrap();

        Self {
            config,
            catalog: QueryCatalog::new().unwrap(),
            warehouse,
            _dir: dir,
        }
    }

    pub fn song_dir(&self) -> &Path {
        &self.config.song_data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.config.log_data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.db_path.clone()
    }

    pub fn run(&mut self) -> Result<PipelineSummary> {
        pipeline::run(
            &self.config,
            &self.catalog,
            &mut self.warehouse,
            &mut LogProgress,
        )
    }

    pub fn count(&self, table: &str) -> usize {
        self.warehouse.count(table).unwrap()
    }

    pub fn count_distinct(&self, table: &str, column: &str) -> usize {
        let sql = format!("SELECT COUNT(DISTINCT {column}) FROM {table}");
        let count: i64 = self
            .warehouse
            .connection()
            .query_row(&sql, params![], |row| row.get(0))
            .unwrap();
        count as usize
    }

    pub fn song_title(&self, song_id: &str) -> Option<String> {
        self.warehouse
            .connection()
            .query_row(
                "SELECT title FROM songs WHERE song_id = ?1",
                params![song_id],
                |row| row.get(0),
            )
            .ok()
    }

    /// `(song_id, artist_id)` of every songplay, ordered by start time.
    pub fn songplay_ids(&self) -> Vec<(Option<String>, Option<String>)> {
        let conn = self.warehouse.connection();
        let mut stmt = conn
            .prepare("SELECT song_id, artist_id FROM songplays ORDER BY start_time, songplay_id")
            .unwrap();
        stmt.query_map(params![], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }
}
