//! Staged bulk loading.
//!
//! A staging file is copied into a temporary table created inside the caller's
//! transaction, merged into the target with the descriptor's conflict policy,
//! and the temporary table is dropped again before returning. A failure leaves
//! the temporary table to the transaction rollback.

use super::statements::StatementDescriptor;
use crate::error::{EtlError, EtlResult};
use rusqlite::{params_from_iter, types::Value, Connection};
use std::path::Path;
use tracing::debug;

/// Empty fields are NULL; everything else is bound as text and converted by
/// the staging column's type affinity.
fn field_value(field: &str) -> Value {
    if field.is_empty() {
        Value::Null
    } else {
        Value::Text(field.to_string())
    }
}

/// Copy a header-less CSV file through the descriptor's staging table into its
/// target. Returns the number of rows the merge wrote.
pub fn copy_from_staging_file(
    conn: &Connection,
    descriptor: &StatementDescriptor,
    staging_path: &Path,
) -> EtlResult<usize> {
    let target = descriptor.target.name;
    let Some(bulk) = descriptor.bulk_load_sql() else {
        return Err(EtlError::BulkLoad {
            table: target,
            path: staging_path.to_path_buf(),
            record: 0,
            reason: format!("{} is not a bulk-load statement", descriptor.operation),
        });
    };

    conn.execute_batch(&bulk.create_staging)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(staging_path)?;

    let mut staged = 0;
    {
        let mut fill = conn.prepare(&bulk.fill_staging)?;
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != descriptor.params.len() {
                return Err(EtlError::BulkLoad {
                    table: target,
                    path: staging_path.to_path_buf(),
                    record: index + 1,
                    reason: format!(
                        "expected {} fields, found {}",
                        descriptor.params.len(),
                        record.len()
                    ),
                });
            }
            fill.execute(params_from_iter(record.iter().map(field_value)))
                .map_err(|e| EtlError::BulkLoad {
                    table: target,
                    path: staging_path.to_path_buf(),
                    record: index + 1,
                    reason: e.to_string(),
                })?;
            staged += 1;
        }
    }

    let merged = conn.execute(&bulk.merge, [])?;
    conn.execute_batch(&bulk.drop_staging)?;

    debug!(
        "Bulk loaded {}: {} staged, {} merged from {}",
        target,
        staged,
        merged,
        staging_path.display()
    );
    Ok(merged)
}
