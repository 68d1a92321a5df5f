//! Structured statement descriptors.
//!
//! Every statement the pipeline issues is described by its target table, the
//! ordered list of bound columns and the conflict policy. SQL text is rendered
//! once from the descriptor when the catalog is built.

use crate::sqlite_persistence::Table;
use anyhow::Result;
use std::fmt;

/// Named operations known to the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    InsertSong,
    InsertArtist,
    InsertUser,
    InsertTime,
    InsertSongplay,
    CopyTime,
    CopyUsers,
    CopySongplays,
    SelectSong,
    PlaysByLocation,
    PlaysByLevel,
    PlaysByDay,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::InsertSong,
        Operation::InsertArtist,
        Operation::InsertUser,
        Operation::InsertTime,
        Operation::InsertSongplay,
        Operation::CopyTime,
        Operation::CopyUsers,
        Operation::CopySongplays,
        Operation::SelectSong,
        Operation::PlaysByLocation,
        Operation::PlaysByLevel,
        Operation::PlaysByDay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertSong => "song_table_insert",
            Operation::InsertArtist => "artist_table_insert",
            Operation::InsertUser => "user_table_insert",
            Operation::InsertTime => "time_table_insert",
            Operation::InsertSongplay => "songplay_table_insert",
            Operation::CopyTime => "time_table_copy_insert",
            Operation::CopyUsers => "users_table_copy_insert",
            Operation::CopySongplays => "songplay_table_copy_insert",
            Operation::SelectSong => "song_select",
            Operation::PlaysByLocation => "songplays_by_location_select",
            Operation::PlaysByLevel => "songplays_by_level_select",
            Operation::PlaysByDay => "songplays_by_day_select",
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.iter().copied().find(|op| op.name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens when an inserted row collides with an existing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite `columns` with the incoming values.
    Update {
        key: &'static [&'static str],
        columns: &'static [&'static str],
    },
    /// Keep the existing row.
    Ignore { key: &'static [&'static str] },
    /// No conflict clause at all.
    Append,
}

impl ConflictPolicy {
    fn clause(&self) -> String {
        match self {
            ConflictPolicy::Update { key, columns } => format!(
                " ON CONFLICT ({}) DO UPDATE SET {}",
                key.join(", "),
                columns
                    .iter()
                    .map(|c| format!("{c} = excluded.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ConflictPolicy::Ignore { key } => {
                format!(" ON CONFLICT ({}) DO NOTHING", key.join(", "))
            }
            ConflictPolicy::Append => String::new(),
        }
    }
}

/// The four statements of a staged bulk load, executed in order inside the
/// loading transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkLoadSql {
    pub staging_table: &'static str,
    pub create_staging: String,
    pub fill_staging: String,
    pub merge: String,
    pub drop_staging: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatementKind {
    Insert { sql: String },
    BulkLoad(BulkLoadSql),
    Query { sql: String },
}

pub struct StatementDescriptor {
    pub operation: Operation,
    pub target: &'static Table,
    /// Bound parameters, in placeholder order.
    pub params: &'static [&'static str],
    pub conflict: ConflictPolicy,
    pub kind: StatementKind,
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl StatementDescriptor {
    pub fn insert(
        operation: Operation,
        target: &'static Table,
        params: &'static [&'static str],
        conflict: ConflictPolicy,
    ) -> Self {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}){}",
            target.name,
            params.join(", "),
            placeholders(params.len()),
            conflict.clause()
        );
        StatementDescriptor {
            operation,
            target,
            params,
            conflict,
            kind: StatementKind::Insert { sql },
        }
    }

    pub fn bulk_load(
        operation: Operation,
        target: &'static Table,
        staging_table: &'static str,
        params: &'static [&'static str],
        conflict: ConflictPolicy,
    ) -> Result<Self> {
        let columns = params.join(", ");
        // `WHERE true` keeps SQLite from parsing ON CONFLICT as a join constraint
        let merge = format!(
            "INSERT INTO {} ({columns}) SELECT {columns} FROM {} WHERE true{}",
            target.name,
            staging_table,
            conflict.clause()
        );
        let sql = BulkLoadSql {
            staging_table,
            create_staging: target.staging_sql(staging_table, params)?,
            fill_staging: format!(
                "INSERT INTO {} ({columns}) VALUES ({})",
                staging_table,
                placeholders(params.len())
            ),
            merge,
            drop_staging: format!("DROP TABLE temp.{};", staging_table),
        };
        Ok(StatementDescriptor {
            operation,
            target,
            params,
            conflict,
            kind: StatementKind::BulkLoad(sql),
        })
    }

    pub fn query(
        operation: Operation,
        target: &'static Table,
        params: &'static [&'static str],
        sql: &str,
    ) -> Self {
        StatementDescriptor {
            operation,
            target,
            params,
            conflict: ConflictPolicy::Append,
            kind: StatementKind::Query {
                sql: sql.trim().to_string(),
            },
        }
    }

    /// SQL for single-statement kinds. Bulk loads return their merge step.
    pub fn sql(&self) -> &str {
        match &self.kind {
            StatementKind::Insert { sql } | StatementKind::Query { sql } => sql,
            StatementKind::BulkLoad(bulk) => &bulk.merge,
        }
    }

    pub fn bulk_load_sql(&self) -> Option<&BulkLoadSql> {
        match &self.kind {
            StatementKind::BulkLoad(bulk) => Some(bulk),
            _ => None,
        }
    }
}
