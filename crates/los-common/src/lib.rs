//! Shared utilities for the length-of-stay crates.
//!
//! Currently this is a small set of helpers for pulling plain Rust values
//! out of polars cells, used when building row-level error reports, plus
//! number formatting for the CLI tables.

pub mod polars;

pub use polars::{cell_f64, cell_i64, format_metric, parse_identifier, parse_number};
