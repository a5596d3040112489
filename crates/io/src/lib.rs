// Source extraction and warehouse persistence

pub mod export;
pub mod file_source;
pub mod server_source;
pub mod source;
pub mod warehouse;

pub use file_source::FileSource;
pub use server_source::ServerSource;
pub use source::{extract, Extraction, OrderSource, SourceError};
pub use warehouse::{LoadReport, LoadStage, SqliteWarehouse, Warehouse};
