//! Library components of the `los` command-line tool.

pub mod config;
pub mod export;
pub mod logging;
pub mod progress;
