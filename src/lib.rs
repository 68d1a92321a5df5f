//! Sparkify ETL Library
//!
//! Loads song metadata and user activity logs into a star-schema SQLite
//! warehouse. The binaries are thin wrappers around these modules.

pub mod analytics;
pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod query_catalog;
pub mod sqlite_persistence;
pub mod transform;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, EtlError, EtlResult};
pub use query_catalog::{Operation, QueryCatalog};
pub use warehouse::{TableCounts, Warehouse};
