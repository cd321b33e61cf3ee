pub mod config;
pub mod database;
pub mod error;
pub mod ingest;
pub mod markdown;
pub mod output;
pub mod repository;
pub mod schema;
pub mod validation;

pub use config::Config;
pub use database::{BuildReport, Database, Table};
pub use error::{ErrorList, GranaryError, Result};
pub use ingest::IngestionReport;
pub use repository::Repository;
pub use schema::SchemaDefinition;
