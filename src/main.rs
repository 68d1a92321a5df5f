use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_DB_PATH, DEFAULT_FILE_EXTENSION,
    DEFAULT_LOG_DATA_DIR, DEFAULT_SONG_DATA_DIR, DEFAULT_STAGING_DIR,
};
use sparkify_etl::driver::{BarProgress, LogProgress, ProgressSink};
use sparkify_etl::{pipeline, QueryCatalog, Warehouse};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Optional TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database file.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Root directory of the song metadata files.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_SONG_DATA_DIR)]
    pub song_data: PathBuf,

    /// Root directory of the user activity log files.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_LOG_DATA_DIR)]
    pub log_data: PathBuf,

    /// Directory for the intermediate CSV files, created if missing.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_STAGING_DIR)]
    pub staging_dir: PathBuf,

    /// Extension of the data files to load.
    #[clap(long, default_value = DEFAULT_FILE_EXTENSION)]
    pub extension: String,

    /// Drop and recreate all warehouse tables before loading.
    #[clap(long)]
    pub reset_tables: bool,

    /// Draw a progress bar instead of logging every processed file.
    #[clap(long)]
    pub progress_bar: bool,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_path: args.db_path.clone(),
            song_data_dir: args.song_data.clone(),
            log_data_dir: args.log_data.clone(),
            staging_dir: args.staging_dir.clone(),
            file_extension: args.extension.clone(),
            reset_tables: args.reset_tables,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    let catalog = QueryCatalog::new()?;

    info!("Opening SQLite warehouse database at {:?}...", config.db_path);
    let mut warehouse = Warehouse::open(&config.db_path)?;

    let mut progress: Box<dyn ProgressSink> =
        if cli_args.progress_bar && std::io::stderr().is_terminal() {
            Box::new(BarProgress::default())
        } else {
            Box::new(LogProgress)
        };

    let summary = pipeline::run(&config, &catalog, &mut warehouse, progress.as_mut())?;

    info!("Done.");
    info!(
        "  Song files: {}/{} processed",
        summary.songs.files_processed, summary.songs.files_found
    );
    info!(
        "  Log files:  {}/{} processed",
        summary.logs.files_processed, summary.logs.files_found
    );
    info!("  Rows:       {}", summary.counts);

    Ok(())
}
