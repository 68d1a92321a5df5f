//! JSON source files for the pipeline, written into a temp data tree.

use super::constants::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub struct SongFixture {
    pub song_id: &'static str,
    pub title: &'static str,
    pub artist_id: &'static str,
    pub artist_name: &'static str,
    pub duration: f64,
    pub year: i64,
}

pub const SONG_1: SongFixture = SongFixture {
    song_id: SONG_1_ID,
    title: SONG_1_TITLE,
    artist_id: ARTIST_1_ID,
    artist_name: ARTIST_1_NAME,
    duration: SONG_1_DURATION,
    year: 0,
};

pub const SONG_2: SongFixture = SongFixture {
    song_id: SONG_2_ID,
    title: SONG_2_TITLE,
    artist_id: ARTIST_2_ID,
    artist_name: ARTIST_2_NAME,
    duration: SONG_2_DURATION,
    year: 1969,
};

impl SongFixture {
    pub fn to_json(&self) -> Value {
        json!({
            "num_songs": 1,
            "artist_id": self.artist_id,
            "artist_latitude": null,
            "artist_longitude": null,
            "artist_location": "",
            "artist_name": self.artist_name,
            "song_id": self.song_id,
            "title": self.title,
            "duration": self.duration,
            "year": self.year,
        })
    }
}

/// One line of an activity log.
pub fn event(page: &str, ts: i64, user: (i64, &str, &str), level: &str, song: Option<(&str, &str, f64)>) -> Value {
    let (user_id, first_name, last_name) = user;
    let (title, artist, length) = match song {
        Some((title, artist, length)) => (json!(title), json!(artist), json!(length)),
        None => (Value::Null, Value::Null, Value::Null),
    };
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": first_name,
        "gender": "F",
        "itemInSession": 0,
        "lastName": last_name,
        "length": length,
        "level": level,
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": page,
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": title,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)",
        "userId": user_id.to_string(),
    })
}

pub fn user_1() -> (i64, &'static str, &'static str) {
    (USER_1_ID, USER_1_FIRST_NAME, USER_1_LAST_NAME)
}

pub fn user_2() -> (i64, &'static str, &'static str) {
    (USER_2_ID, USER_2_FIRST_NAME, USER_2_LAST_NAME)
}

/// Write `lines` as newline-delimited JSON at `root/relative`, creating
/// parent directories.
pub fn write_json_lines(root: &Path, relative: &str, lines: &[Value]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let content = lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&path, content).unwrap();
    path
}

pub fn write_song_file(root: &Path, relative: &str, song: &SongFixture) -> PathBuf {
    write_json_lines(root, relative, &[song.to_json()])
}
