use crate::query_catalog::{
    ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, TIME_TABLE, USERS_TABLE,
    WAREHOUSE_VERSIONED_SCHEMAS,
};
use crate::sqlite_persistence::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub songplays: usize,
    pub users: usize,
    pub songs: usize,
    pub artists: usize,
    pub time: usize,
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "songplays={} users={} songs={} artists={} time={}",
            self.songplays, self.users, self.songs, self.artists, self.time
        )
    }
}

/// The star-schema SQLite database.
pub struct Warehouse {
    conn: Connection,
    path: PathBuf,
}

fn latest_schema() -> Result<&'static VersionedSchema> {
    WAREHOUSE_VERSIONED_SCHEMAS
        .last()
        .context("No warehouse schema declared")
}

fn user_table_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

impl Warehouse {
    /// Open the database at `path`, creating the schema if it holds no
    /// tables yet and validating it otherwise.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open warehouse database {:?}", path))?;
        Self::init(conn, path.to_path_buf())
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, path: PathBuf) -> Result<Self> {
        let schema = latest_schema()?;

        if user_table_count(&conn)? == 0 {
            info!("Creating new warehouse database at {:?}", path);
            schema.create(&conn)?;
        } else {
            let raw_version: i64 =
                conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;
            if db_version < 0 {
                bail!(
                    "Warehouse database {:?} has invalid version {} (expected >= 0)",
                    path,
                    db_version
                );
            }
            let versioned = WAREHOUSE_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version == db_version as usize)
                .with_context(|| format!("Unknown warehouse database version {}", db_version))?;
            versioned.validate(&conn).with_context(|| {
                format!(
                    "Warehouse schema validation failed for version {}",
                    db_version
                )
            })?;
        }

        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Drop and recreate all five tables.
    pub fn reset(&mut self) -> Result<()> {
        let schema = latest_schema()?;
        let tx = self.conn.transaction()?;
        schema.drop(&tx).context("Failed to drop warehouse tables")?;
        schema.create(&tx).context("Failed to create warehouse tables")?;
        tx.commit()?;
        info!("Warehouse tables reset");
        Ok(())
    }

    pub fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("Failed to count rows of {}", table))?;
        Ok(count as usize)
    }

    pub fn counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            songplays: self.count(SONGPLAYS_TABLE.name)?,
            users: self.count(USERS_TABLE.name)?,
            songs: self.count(SONGS_TABLE.name)?,
            artists: self.count(ARTISTS_TABLE.name)?,
            time: self.count(TIME_TABLE.name)?,
        })
    }
}
