//! Data ingestion for the length-of-stay pipeline.
//!
//! - **Discovery**: locate the five source tables in a data directory
//! - **Reading**: load each table as text with normalized headers and
//!   integer identifiers
//! - **Writing**: persist the final feature table as CSV
//!
//! # Example
//!
//! ```ignore
//! use std::collections::BTreeMap;
//! use los_ingest::{discover_sources, load_sources};
//!
//! let paths = discover_sources(data_dir, &BTreeMap::new())?;
//! let frames = load_sources(&paths, &[])?;
//! ```

pub mod discovery;
pub mod error;
pub mod reader;
pub mod writer;

pub use discovery::{SourcePaths, discover_sources, list_csv_files};
pub use error::{IngestError, Result};
pub use reader::{
    SourceFrames, load_sources, normalize_header, read_feature_table, read_source_table,
};
pub use writer::write_csv;
