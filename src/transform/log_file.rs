//! Activity log files: time, user and songplay rows for every song play event.

use super::models::{SongplayRecord, TimeRecord, UserRecord};
use super::staging::{StagingArea, StagingFile};
use super::time_dimension::{format_timestamp, timestamp_from_millis};
use crate::error::{EtlError, EtlResult, FieldProblem};
use crate::extract::{RecordRow, RecordTable};
use crate::query_catalog::{copy_from_staging_file, Operation, QueryCatalog};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

/// `page` value of the events that represent a song being played.
pub const SONG_PLAY_PAGE: &str = "NextSong";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFileSummary {
    pub events: usize,
    pub song_plays: usize,
    pub time_rows_added: usize,
    pub users_merged: usize,
    pub songplays_added: usize,
    pub songplays_matched: usize,
}

/// Keep only song play events, in file order. Events with no `page` are not
/// song plays.
pub fn song_plays<'a>(table: &'a RecordTable) -> EtlResult<Vec<RecordRow<'a>>> {
    let mut plays = Vec::new();
    for row in table.rows() {
        if row.opt_str("page")? == Some(SONG_PLAY_PAGE) {
            plays.push(row);
        }
    }
    Ok(plays)
}

fn event_timestamp(row: &RecordRow) -> EtlResult<NaiveDateTime> {
    let millis = row.get_i64("ts")?;
    timestamp_from_millis(millis)
        .ok_or_else(|| EtlError::field(row.index(), "ts", FieldProblem::OutOfRange))
}

pub fn time_from_row(row: &RecordRow) -> EtlResult<TimeRecord> {
    Ok(TimeRecord::from_timestamp(&event_timestamp(row)?))
}

pub fn user_from_row(row: &RecordRow) -> EtlResult<UserRecord> {
    Ok(UserRecord {
        user_id: row.get_i64("userId")?,
        first_name: row.get_str("firstName")?.to_string(),
        last_name: row.get_str("lastName")?.to_string(),
        gender: row.opt_str("gender")?.map(str::to_string),
        level: row.get_str("level")?.to_string(),
    })
}

/// Build the fact row for one event, resolving song and artist ids through
/// the catalog lookup. Both ids are `None` on a miss, and an event without
/// song, artist or length is always a miss.
pub fn songplay_from_row(
    conn: &Connection,
    catalog: &QueryCatalog,
    row: &RecordRow,
) -> EtlResult<SongplayRecord> {
    let start_time = format_timestamp(&event_timestamp(row)?);
    let song = row.opt_str("song")?;
    let artist = row.opt_str("artist")?;
    let length = row.opt_f64("length")?;
    let ids = match (song, artist, length) {
        (Some(song), Some(artist), Some(length)) => {
            catalog.find_song(conn, song, artist, length)?
        }
        _ => None,
    };
    let (song_id, artist_id) = match ids {
        Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
        None => (None, None),
    };

    Ok(SongplayRecord {
        start_time,
        user_id: row.get_i64("userId")?,
        level: row.get_str("level")?.to_string(),
        song_id,
        artist_id,
        session_id: row.get_i64("sessionId")?,
        location: row.opt_str("location")?.map(str::to_string),
        user_agent: row.opt_str("userAgent")?.map(str::to_string),
    })
}

/// Load one activity log file into `time`, `users` and `songplays`.
///
/// Every row is built before its table is staged, so a bad event fails the
/// file before that table is touched. Earlier tables of the same file are
/// left to the caller's transaction rollback.
pub fn process_log_file(
    conn: &Connection,
    catalog: &QueryCatalog,
    staging: &StagingArea,
    path: &Path,
) -> EtlResult<LogFileSummary> {
    let table = RecordTable::read_json_lines(path)?;
    let plays = song_plays(&table)?;
    let mut summary = LogFileSummary {
        events: table.len(),
        song_plays: plays.len(),
        ..Default::default()
    };

    let time_rows = plays
        .iter()
        .map(time_from_row)
        .collect::<EtlResult<Vec<_>>>()?;
    let time_path = staging.write(StagingFile::Time, &time_rows)?;
    summary.time_rows_added =
        copy_from_staging_file(conn, catalog.get(Operation::CopyTime), &time_path)?;

    let user_rows = plays
        .iter()
        .map(user_from_row)
        .collect::<EtlResult<Vec<_>>>()?;
    let users_path = staging.write(StagingFile::Users, &user_rows)?;
    summary.users_merged =
        copy_from_staging_file(conn, catalog.get(Operation::CopyUsers), &users_path)?;

    let songplay_rows = plays
        .iter()
        .map(|row| songplay_from_row(conn, catalog, row))
        .collect::<EtlResult<Vec<_>>>()?;
    summary.songplays_matched = songplay_rows
        .iter()
        .filter(|play| play.song_id.is_some())
        .count();
    let songplays_path = staging.write(StagingFile::Songplays, &songplay_rows)?;
    summary.songplays_added =
        copy_from_staging_file(conn, catalog.get(Operation::CopySongplays), &songplays_path)?;

    debug!("{}: {:?}", path.display(), summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn event(page: &str, ts: i64, user_id: &str, song: &str) -> Value {
        json!({
            "artist": "Des'ree",
            "auth": "Logged In",
            "firstName": "Kaylee",
            "gender": "F",
            "itemInSession": 1,
            "lastName": "Summers",
            "length": 246.30812,
            "level": "free",
            "location": "Phoenix-Mesa-Scottsdale, AZ",
            "method": "PUT",
            "page": page,
            "registration": 1540344794796.0,
            "sessionId": 139,
            "song": song,
            "status": 200,
            "ts": ts,
            "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)",
            "userId": user_id,
        })
    }

    struct Fixture {
        catalog: QueryCatalog,
        conn: Connection,
        staging: StagingArea,
        dir: TempDir,
    }

    fn setup() -> Fixture {
        let catalog = QueryCatalog::new().unwrap();
        let conn = Connection::open_in_memory().unwrap();
        catalog.schema().create(&conn).unwrap();
        let dir = TempDir::new().unwrap();
        let staging = StagingArea::new(dir.path().join("staging")).unwrap();
        Fixture {
            catalog,
            conn,
            staging,
            dir,
        }
    }

    impl Fixture {
        fn write_log(&self, name: &str, events: &[Value]) -> std::path::PathBuf {
            let path = self.dir.path().join(name);
            let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
            fs::write(&path, lines.join("\n")).unwrap();
            path
        }

        fn count(&self, table: &str) -> i64 {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
                .unwrap()
        }

        fn process(&self, path: &Path) -> EtlResult<LogFileSummary> {
            process_log_file(&self.conn, &self.catalog, &self.staging, path)
        }
    }

    #[test]
    fn test_non_song_play_events_are_discarded() {
        let fx = setup();
        let path = fx.write_log(
            "log.json",
            &[
                event("NextSong", 1541106106796, "8", "You Gotta Be"),
                event("Home", 1541106352796, "8", "You Gotta Be"),
                event("NextSong", 1541106496796, "8", "Flawless"),
            ],
        );

        let summary = fx.process(&path).unwrap();
        assert_eq!(summary.events, 3);
        assert_eq!(summary.song_plays, 2);
        assert_eq!(summary.songplays_added, 2);
        assert_eq!(fx.count("songplays"), 2);
        assert_eq!(fx.count("time"), 2);
        assert_eq!(fx.count("users"), 1);
    }

    #[test]
    fn test_duplicate_timestamps_collapse_in_time_table() {
        let fx = setup();
        let path = fx.write_log(
            "log.json",
            &[
                event("NextSong", 1541106106796, "8", "A"),
                event("NextSong", 1541106106796, "10", "B"),
                event("NextSong", 1541106496796, "8", "C"),
            ],
        );

        let summary = fx.process(&path).unwrap();
        assert_eq!(summary.time_rows_added, 2);
        assert_eq!(fx.count("time"), 2);
        assert_eq!(fx.count("songplays"), 3);
    }

    #[test]
    fn test_songplay_ids_resolved_on_exact_match_only() {
        let fx = setup();
        fx.conn
            .execute(
                fx.catalog.get(Operation::InsertSong).sql(),
                rusqlite::params!["SOUPIRU12A6D4FA1E1", "You Gotta Be", "ARKRRTF1187B9984DA", 1994, 246.30812],
            )
            .unwrap();
        fx.conn
            .execute(
                fx.catalog.get(Operation::InsertArtist).sql(),
                rusqlite::params!["ARKRRTF1187B9984DA", "Des'ree", None::<String>, None::<f64>, None::<f64>],
            )
            .unwrap();

        let path = fx.write_log(
            "log.json",
            &[
                event("NextSong", 1541106106796, "8", "You Gotta Be"),
                event("NextSong", 1541106496796, "8", "Flawless"),
            ],
        );
        let summary = fx.process(&path).unwrap();
        assert_eq!(summary.songplays_matched, 1);

        let rows: Vec<(String, Option<String>, Option<String>)> = fx
            .conn
            .prepare("SELECT start_time, song_id, artist_id FROM songplays ORDER BY start_time")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (
                    "2018-11-01 21:01:46.796".to_string(),
                    Some("SOUPIRU12A6D4FA1E1".to_string()),
                    Some("ARKRRTF1187B9984DA".to_string())
                ),
                ("2018-11-01 21:08:16.796".to_string(), None, None),
            ]
        );
    }

    #[test]
    fn test_user_fields_take_last_event_values() {
        let fx = setup();
        let mut upgraded = event("NextSong", 1541106496796, "8", "B");
        upgraded["level"] = json!("paid");
        let path = fx.write_log(
            "log.json",
            &[event("NextSong", 1541106106796, "8", "A"), upgraded],
        );

        fx.process(&path).unwrap();
        let level: String = fx
            .conn
            .query_row("SELECT level FROM users WHERE user_id = 8", [], |r| r.get(0))
            .unwrap();
        assert_eq!(level, "paid");
    }

    #[test]
    fn test_missing_session_id_fails_whole_file() {
        let fx = setup();
        let mut broken = event("NextSong", 1541106496796, "8", "B");
        broken.as_object_mut().unwrap().remove("sessionId");
        let path = fx.write_log(
            "log.json",
            &[event("NextSong", 1541106106796, "8", "A"), broken],
        );

        let err = fx.process(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Field);
        assert!(err.to_string().contains("sessionId"));
        assert_eq!(fx.count("songplays"), 0);
    }

    #[test]
    fn test_logged_out_events_do_not_need_user_fields() {
        let fx = setup();
        let path = fx.write_log(
            "log.json",
            &[
                json!({"page": "Home", "ts": 1541106106796i64, "userId": "", "auth": "Logged Out"}),
                event("NextSong", 1541106496796, "8", "B"),
            ],
        );

        let summary = fx.process(&path).unwrap();
        assert_eq!(summary.song_plays, 1);
        assert_eq!(fx.count("users"), 1);
    }

    #[test]
    fn test_empty_log_file_loads_nothing() {
        let fx = setup();
        let path = fx.write_log("empty.json", &[]);

        let summary = fx.process(&path).unwrap();
        assert_eq!(summary, LogFileSummary::default());
        assert_eq!(fx.count("time"), 0);
    }

    #[test]
    fn test_staging_files_are_overwritten_per_file() {
        let fx = setup();
        let first = fx.write_log(
            "a.json",
            &[
                event("NextSong", 1541106106796, "8", "A"),
                event("NextSong", 1541106496796, "8", "B"),
            ],
        );
        let second = fx.write_log("b.json", &[event("NextSong", 1541107000000, "8", "C")]);

        fx.process(&first).unwrap();
        fx.process(&second).unwrap();

        let staged = fs::read_to_string(fx.staging.path(StagingFile::Songplays)).unwrap();
        assert_eq!(staged.lines().count(), 1);
        assert_eq!(fx.count("songplays"), 3);
    }

    #[test]
    fn test_events_without_page_are_discarded() {
        let fx = setup();
        let path = fx.write_log(
            "log.json",
            &[
                event("NextSong", 1541106106796, "8", "A"),
                json!({"ts": 1541106352796i64, "userId": "", "auth": "Logged Out", "page": null}),
                json!({"ts": 1541106496796i64, "userId": "", "auth": "Logged Out"}),
            ],
        );

        let summary = fx.process(&path).unwrap();
        assert_eq!(summary.events, 3);
        assert_eq!(summary.song_plays, 1);
        assert_eq!(fx.count("songplays"), 1);
    }

    #[test]
    fn test_song_play_without_song_details_is_stored_unmatched() {
        let fx = setup();
        let mut play = event("NextSong", 1541106106796, "8", "A");
        play["song"] = Value::Null;
        play["artist"] = Value::Null;
        play["length"] = Value::Null;
        let path = fx.write_log("log.json", &[play]);

        let summary = fx.process(&path).unwrap();
        assert_eq!(summary.songplays_added, 1);
        assert_eq!(summary.songplays_matched, 0);
        let (song_id, artist_id): (Option<String>, Option<String>) = fx
            .conn
            .query_row("SELECT song_id, artist_id FROM songplays", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!((song_id, artist_id), (None, None));
    }
}
