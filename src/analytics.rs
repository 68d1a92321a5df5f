//! Dashboard queries over the loaded warehouse.

use crate::error::EtlResult;
use crate::query_catalog::{Operation, QueryCatalog};
use rusqlite::{params, Connection};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocationPlays {
    pub plays: i64,
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelPlays {
    pub plays: i64,
    pub level: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayPlays {
    pub plays: i64,
    pub day: u32,
}

/// Song plays per user location, busiest first.
pub fn plays_by_location(conn: &Connection, catalog: &QueryCatalog) -> EtlResult<Vec<LocationPlays>> {
    let mut stmt = conn.prepare_cached(catalog.get(Operation::PlaysByLocation).sql())?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LocationPlays {
                plays: row.get("plays")?,
                location: row.get("location")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Song plays split by subscription level.
pub fn plays_by_level(conn: &Connection, catalog: &QueryCatalog) -> EtlResult<Vec<LevelPlays>> {
    let mut stmt = conn.prepare_cached(catalog.get(Operation::PlaysByLevel).sql())?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LevelPlays {
                plays: row.get("plays")?,
                level: row.get("level")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Song plays per day of the given month.
pub fn plays_by_day(
    conn: &Connection,
    catalog: &QueryCatalog,
    month: u32,
    year: i32,
) -> EtlResult<Vec<DayPlays>> {
    let mut stmt = conn.prepare_cached(catalog.get(Operation::PlaysByDay).sql())?;
    let rows = stmt
        .query_map(params![month, year], |row| {
            Ok(DayPlays {
                plays: row.get("plays")?,
                day: row.get("day")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
