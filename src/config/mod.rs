mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "sparkify.db";
pub const DEFAULT_SONG_DATA_DIR: &str = "data/song_data";
pub const DEFAULT_LOG_DATA_DIR: &str = "data/log_data";
pub const DEFAULT_STAGING_DIR: &str = "staging";
pub const DEFAULT_FILE_EXTENSION: &str = "json";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub file_extension: String,
    pub reset_tables: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            song_data_dir: PathBuf::from(DEFAULT_SONG_DATA_DIR),
            log_data_dir: PathBuf::from(DEFAULT_LOG_DATA_DIR),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            reset_tables: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub file_extension: String,
    pub reset_tables: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let song_data_dir = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data_dir.clone());
        validate_data_dir("song_data", &song_data_dir)?;

        let log_data_dir = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data_dir.clone());
        validate_data_dir("log_data", &log_data_dir)?;

        let staging_dir = file
            .staging_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.staging_dir.clone());
        if staging_dir.exists() && !staging_dir.is_dir() {
            bail!("staging_dir is not a directory: {:?}", staging_dir);
        }

        let file_extension = normalize_extension(
            file.file_extension
                .as_deref()
                .unwrap_or(&cli.file_extension),
        )?;

        let reset_tables = file.reset_tables.unwrap_or(cli.reset_tables);

        Ok(Self {
            db_path,
            song_data_dir,
            log_data_dir,
            staging_dir,
            file_extension,
            reset_tables,
        })
    }
}

fn validate_data_dir(name: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("{} directory does not exist: {:?}", name, dir);
    }
    if !dir.is_dir() {
        bail!("{} is not a directory: {:?}", name, dir);
    }
    Ok(())
}

/// Accepts `json` or `.json`.
fn normalize_extension(ext: &str) -> Result<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        bail!("file_extension must not be empty");
    }
    Ok(ext.to_string())
}
