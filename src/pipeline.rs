use crate::config::AppConfig;
use crate::driver::{
    process_data, BatchSummary, LogFileProcessor, ProgressSink, SongFileProcessor,
};
use crate::query_catalog::QueryCatalog;
use crate::transform::StagingArea;
use crate::warehouse::{TableCounts, Warehouse};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub songs: BatchSummary,
    pub logs: BatchSummary,
    pub counts: TableCounts,
}

/// Song files first, so log events can resolve song and artist ids against
/// them, then log files.
pub fn run(
    config: &AppConfig,
    catalog: &QueryCatalog,
    warehouse: &mut Warehouse,
    progress: &mut dyn ProgressSink,
) -> Result<PipelineSummary> {
    if config.reset_tables {
        warehouse.reset()?;
    }

    let staging = StagingArea::new(&config.staging_dir)
        .with_context(|| format!("Failed to prepare staging dir {:?}", config.staging_dir))?;

    info!("Loading song data from {:?}", config.song_data_dir);
    let songs = process_data(
        warehouse.connection_mut(),
        &config.song_data_dir,
        &config.file_extension,
        &SongFileProcessor::new(catalog),
        progress,
    )
    .context("Song data ingestion failed")?;

    info!("Loading log data from {:?}", config.log_data_dir);
    let logs = process_data(
        warehouse.connection_mut(),
        &config.log_data_dir,
        &config.file_extension,
        &LogFileProcessor::new(catalog, &staging),
        progress,
    )
    .context("Log data ingestion failed")?;

    let counts = warehouse.counts()?;
    Ok(PipelineSummary {
        songs,
        logs,
        counts,
    })
}
