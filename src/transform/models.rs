//! Rows produced by the transformers, one struct per target table.
//!
//! Field order matches the catalog's parameter order, which is also the column
//! order of the staging files.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i64>,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeRecord {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SongplayRecord {
    pub start_time: String,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
