mod bulk_load;
mod catalog;
mod schema;
mod statements;

pub use bulk_load::copy_from_staging_file;
pub use catalog::QueryCatalog;
pub use schema::{
    ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, TIME_TABLE, USERS_TABLE,
    WAREHOUSE_VERSIONED_SCHEMAS,
};
pub use statements::{BulkLoadSql, ConflictPolicy, Operation, StatementDescriptor, StatementKind};
