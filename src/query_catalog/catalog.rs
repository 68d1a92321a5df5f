use super::schema::{
    ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, TIME_TABLE, USERS_TABLE,
    WAREHOUSE_VERSIONED_SCHEMAS,
};
use super::statements::{ConflictPolicy, Operation, StatementDescriptor};
use crate::error::EtlResult;
use crate::sqlite_persistence::{Table, VersionedSchema};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

const SONG_COLUMNS: &[&str] = &["song_id", "title", "artist_id", "year", "duration"];
const ARTIST_COLUMNS: &[&str] = &["artist_id", "name", "location", "latitude", "longitude"];
const USER_COLUMNS: &[&str] = &["user_id", "first_name", "last_name", "gender", "level"];
const TIME_COLUMNS: &[&str] = &[
    "start_time",
    "hour",
    "day",
    "week",
    "month",
    "year",
    "weekday",
];
const SONGPLAY_COLUMNS: &[&str] = &[
    "start_time",
    "user_id",
    "level",
    "song_id",
    "artist_id",
    "session_id",
    "location",
    "user_agent",
];

const SONG_UPSERT: ConflictPolicy = ConflictPolicy::Update {
    key: &["song_id"],
    columns: &["title", "artist_id", "year", "duration"],
};
const ARTIST_UPSERT: ConflictPolicy = ConflictPolicy::Update {
    key: &["artist_id"],
    columns: &["name", "location", "latitude", "longitude"],
};
const USER_UPSERT: ConflictPolicy = ConflictPolicy::Update {
    key: &["user_id"],
    columns: &["first_name", "last_name", "gender", "level"],
};
const TIME_IGNORE: ConflictPolicy = ConflictPolicy::Ignore {
    key: &["start_time"],
};

const SONG_SELECT_SQL: &str = "
    SELECT s.song_id, a.artist_id
    FROM songs s JOIN artists a ON s.artist_id = a.artist_id
    WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
";

const PLAYS_BY_LOCATION_SQL: &str = "
    SELECT COUNT(songplay_id) AS plays, location
    FROM songplays
    GROUP BY location
    ORDER BY plays DESC, location
";

const PLAYS_BY_LEVEL_SQL: &str = "
    SELECT COUNT(*) AS plays, level
    FROM songplays
    GROUP BY level
    ORDER BY level
";

const PLAYS_BY_DAY_SQL: &str = "
    SELECT COUNT(songplay_id) AS plays, t.day
    FROM songplays sp INNER JOIN time t ON sp.start_time = t.start_time
    WHERE t.month = ?1 AND t.year = ?2
    GROUP BY t.day, t.month, t.year
    ORDER BY t.day
";

/// Read-only mapping from [`Operation`] to its statement descriptor.
///
/// Built once at startup and shared by reference with every stage.
pub struct QueryCatalog {
    statements: Vec<StatementDescriptor>,
    schema: &'static VersionedSchema,
}

impl QueryCatalog {
    pub fn new() -> Result<Self> {
        let statements = Operation::ALL
            .iter()
            .map(|op| Self::describe(*op))
            .collect::<Result<Vec<_>>>()?;
        let schema = &WAREHOUSE_VERSIONED_SCHEMAS[WAREHOUSE_VERSIONED_SCHEMAS.len() - 1];
        Ok(QueryCatalog { statements, schema })
    }

    fn describe(op: Operation) -> Result<StatementDescriptor> {
        let descriptor = match op {
            Operation::InsertSong => {
                StatementDescriptor::insert(op, &SONGS_TABLE, SONG_COLUMNS, SONG_UPSERT)
            }
            Operation::InsertArtist => {
                StatementDescriptor::insert(op, &ARTISTS_TABLE, ARTIST_COLUMNS, ARTIST_UPSERT)
            }
            Operation::InsertUser => {
                StatementDescriptor::insert(op, &USERS_TABLE, USER_COLUMNS, USER_UPSERT)
            }
            Operation::InsertTime => {
                StatementDescriptor::insert(op, &TIME_TABLE, TIME_COLUMNS, TIME_IGNORE)
            }
            Operation::InsertSongplay => StatementDescriptor::insert(
                op,
                &SONGPLAYS_TABLE,
                SONGPLAY_COLUMNS,
                ConflictPolicy::Append,
            ),
            Operation::CopyTime => StatementDescriptor::bulk_load(
                op,
                &TIME_TABLE,
                "time_staging",
                TIME_COLUMNS,
                TIME_IGNORE,
            )?,
            Operation::CopyUsers => StatementDescriptor::bulk_load(
                op,
                &USERS_TABLE,
                "users_staging",
                USER_COLUMNS,
                USER_UPSERT,
            )?,
            Operation::CopySongplays => StatementDescriptor::bulk_load(
                op,
                &SONGPLAYS_TABLE,
                "songplays_staging",
                SONGPLAY_COLUMNS,
                ConflictPolicy::Append,
            )?,
            Operation::SelectSong => StatementDescriptor::query(
                op,
                &SONGS_TABLE,
                &["title", "name", "duration"],
                SONG_SELECT_SQL,
            ),
            Operation::PlaysByLocation => {
                StatementDescriptor::query(op, &SONGPLAYS_TABLE, &[], PLAYS_BY_LOCATION_SQL)
            }
            Operation::PlaysByLevel => {
                StatementDescriptor::query(op, &SONGPLAYS_TABLE, &[], PLAYS_BY_LEVEL_SQL)
            }
            Operation::PlaysByDay => StatementDescriptor::query(
                op,
                &SONGPLAYS_TABLE,
                &["month", "year"],
                PLAYS_BY_DAY_SQL,
            ),
        };
        Ok(descriptor)
    }

    pub fn get(&self, op: Operation) -> &StatementDescriptor {
        // `statements` is built from Operation::ALL, so the position always exists
        &self.statements[op as usize]
    }

    pub fn by_name(&self, name: &str) -> Option<&StatementDescriptor> {
        Operation::from_name(name).map(|op| self.get(op))
    }

    pub fn schema(&self) -> &'static VersionedSchema {
        self.schema
    }

    pub fn tables(&self) -> &'static [Table] {
        self.schema.tables
    }

    pub fn create_table_statements(&self) -> Vec<String> {
        self.tables().iter().map(Table::create_sql).collect()
    }

    pub fn drop_table_statements(&self) -> Vec<String> {
        self.tables().iter().map(Table::drop_sql).collect()
    }

    /// Resolve `(song_id, artist_id)` by exact match on title, artist name
    /// and duration.
    pub fn find_song(
        &self,
        conn: &Connection,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> EtlResult<Option<(String, String)>> {
        let mut stmt = conn.prepare_cached(self.get(Operation::SelectSong).sql())?;
        let ids = stmt
            .query_row(params![title, artist_name, duration], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .optional()?;
        Ok(ids)
    }
}
