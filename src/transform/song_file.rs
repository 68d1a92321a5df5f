//! Song metadata files: one song and its artist per file.

use super::models::{ArtistRecord, SongRecord};
use crate::error::EtlResult;
use crate::extract::{RecordRow, RecordTable};
use crate::query_catalog::{Operation, QueryCatalog};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

pub fn song_from_row(row: &RecordRow) -> EtlResult<SongRecord> {
    Ok(SongRecord {
        song_id: row.get_str("song_id")?.to_string(),
        title: row.get_str("title")?.to_string(),
        artist_id: row.get_str("artist_id")?.to_string(),
        year: row.opt_i64("year")?,
        duration: row.get_f64("duration")?,
    })
}

pub fn artist_from_row(row: &RecordRow) -> EtlResult<ArtistRecord> {
    Ok(ArtistRecord {
        artist_id: row.get_str("artist_id")?.to_string(),
        name: row.get_str("artist_name")?.to_string(),
        location: row.opt_str("artist_location")?.map(str::to_string),
        latitude: row.opt_f64("artist_latitude")?,
        longitude: row.opt_f64("artist_longitude")?,
    })
}

pub fn upsert_song(conn: &Connection, catalog: &QueryCatalog, song: &SongRecord) -> EtlResult<()> {
    let mut stmt = conn.prepare_cached(catalog.get(Operation::InsertSong).sql())?;
    stmt.execute(params![
        song.song_id,
        song.title,
        song.artist_id,
        song.year,
        song.duration
    ])?;
    Ok(())
}

pub fn upsert_artist(
    conn: &Connection,
    catalog: &QueryCatalog,
    artist: &ArtistRecord,
) -> EtlResult<()> {
    let mut stmt = conn.prepare_cached(catalog.get(Operation::InsertArtist).sql())?;
    stmt.execute(params![
        artist.artist_id,
        artist.name,
        artist.location,
        artist.latitude,
        artist.longitude
    ])?;
    Ok(())
}

/// Upsert the song and artist described by the first row of `path`. Any
/// further rows are ignored; an empty file is a field error.
pub fn process_song_file(
    conn: &Connection,
    catalog: &QueryCatalog,
    path: &Path,
) -> EtlResult<(SongRecord, ArtistRecord)> {
    let table = RecordTable::read_json_lines(path)?;
    let row = table.first()?;
    if table.len() > 1 {
        debug!(
            "{} has {} rows, only the first one is used",
            path.display(),
            table.len()
        );
    }

    let song = song_from_row(&row)?;
    let artist = artist_from_row(&row)?;

    upsert_song(conn, catalog, &song)?;
    upsert_artist(conn, catalog, &artist)?;

    Ok((song, artist))
}
