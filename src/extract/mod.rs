mod record_table;

pub use record_table::{ColumnInfo, ColumnType, RecordRow, RecordTable};
