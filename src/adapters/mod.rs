//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod csv_price_adapter;
pub mod file_config_adapter;
pub mod filing_dir_adapter;
pub mod corpus_dir_adapter;
pub mod corpus_csv_adapter;
