//! Table transformations that turn merged admission records into a
//! model-ready feature matrix.
//!
//! - **merge**: outer-join the five source tables and project the fixed columns
//! - **filter**: mortality exclusion, first-visit isolation, null-row removal
//! - **derived**: length of stay and age, age-range filtering, age bands
//! - **consolidate**: per-column rule tables mapping raw categories to canonical labels
//! - **diagnosis**: ICD-9 code to diagnosis group classification
//! - **encode**: one-hot encoding and per-admission aggregation
//! - **pipeline**: runs the stages in order and reports on each
//!
//! Every stage takes ownership of its input table and returns a new one.

pub mod consolidate;
pub mod datetime;
pub mod derived;
pub mod diagnosis;
pub mod encode;
pub mod error;
pub mod filter;
pub mod frame;
pub mod merge;
pub mod pipeline;
pub mod reporter;
pub mod rules;

pub use consolidate::{Consolidated, Consolidator, Matcher, Resolution, Rule, RuleTable};
pub use diagnosis::{CodeError, DIAGNOSIS_RANGES, classify_code, classify_diagnoses};
pub use encode::{EncodeOptions, encode_admissions};
pub use error::{DiagnosisFailure, Result, RowLocator, TransformError};
pub use merge::{SourceFrames, merge_sources};
pub use pipeline::{Prepared, prepare};
pub use reporter::{NoopReporter, StageReporter, TracingReporter};
