//! Category consolidation through per-column rule tables.
//!
//! A [`RuleTable`] maps the raw value domain of one column onto a small set
//! of canonical labels. Rules are evaluated first-match-wins on the trimmed,
//! uppercased raw value; a value that already equals one of the table's
//! labels is left alone, which makes consolidation idempotent. Values no
//! rule matches are handled according to [`UnmappedPolicy`].

use std::collections::{BTreeMap, BTreeSet};

use los_model::{UnmappedPolicy, UnmappedValues};
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::frame::has_column;
use crate::rules::default_rule_tables;

/// Predicate on a normalized (trimmed, uppercased) raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Matches one of the listed values exactly.
    Exact(BTreeSet<String>),
    /// Matches when any needle occurs in the value.
    Contains(Vec<String>),
}

impl Matcher {
    pub fn exact(values: &[&str]) -> Self {
        Matcher::Exact(values.iter().map(|v| v.trim().to_uppercase()).collect())
    }

    pub fn contains(needles: &[&str]) -> Self {
        Matcher::Contains(needles.iter().map(|n| n.to_uppercase()).collect())
    }

    fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::Exact(values) => values.contains(normalized),
            Matcher::Contains(needles) => needles.iter().any(|n| normalized.contains(n.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub label: String,
}

/// How a raw value resolved against a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The value already is a canonical label.
    Canonical(&'a str),
    /// A rule matched.
    Matched(&'a str),
    /// Nothing matched.
    Unmatched,
}

/// Ordered rules for one column plus its catch-all label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    column: String,
    rules: Vec<Rule>,
    fallback: String,
}

impl RuleTable {
    pub fn new(column: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            rules: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// Appends an exact-match rule.
    pub fn exact(mut self, values: &[&str], label: &str) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::exact(values),
            label: label.to_string(),
        });
        self
    }

    /// Appends a substring rule.
    pub fn contains(mut self, needles: &[&str], label: &str) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::contains(needles),
            label: label.to_string(),
        });
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Every label this table can produce, fallback included.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .map(|rule| rule.label.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
            .collect()
    }

    pub fn resolve(&self, raw: &str) -> Resolution<'_> {
        let trimmed = raw.trim();
        if let Some(label) = self.labels().into_iter().find(|label| *label == trimmed) {
            return Resolution::Canonical(label);
        }
        let normalized = trimmed.to_uppercase();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&normalized))
            .map_or(Resolution::Unmatched, |rule| {
                Resolution::Matched(rule.label.as_str())
            })
    }
}

/// Output of [`Consolidator::apply`].
#[derive(Debug, Clone)]
pub struct Consolidated {
    pub frame: DataFrame,
    pub unmapped: UnmappedValues,
}

/// Applies a set of rule tables to a frame.
#[derive(Debug, Clone)]
pub struct Consolidator {
    tables: Vec<RuleTable>,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new(default_rule_tables())
    }
}

impl Consolidator {
    pub fn new(tables: Vec<RuleTable>) -> Self {
        Self { tables }
    }

    /// Rewrites every column that has a rule table and is present in `df`.
    ///
    /// Unmapped values are collected per column with their counts. Under
    /// [`UnmappedPolicy::Reject`] the first column with unmapped values fails
    /// the call.
    pub fn apply(&self, df: DataFrame, policy: UnmappedPolicy) -> Result<Consolidated> {
        let mut df = df;
        let mut unmapped = UnmappedValues::new();

        for table in &self.tables {
            if !has_column(&df, &table.column) {
                continue;
            }
            let (series, misses) = consolidate_column(&df, table, policy)?;
            if !misses.is_empty() {
                if policy == UnmappedPolicy::Reject {
                    return Err(TransformError::UnmappedCategory {
                        column: table.column.clone(),
                        values: misses.into_keys().collect(),
                    });
                }
                debug!(column = %table.column, distinct = misses.len(), "unmapped values");
                unmapped.insert(table.column.clone(), misses);
            }
            df.with_column(series)?;
        }

        Ok(Consolidated {
            frame: df,
            unmapped,
        })
    }
}

fn consolidate_column(
    df: &DataFrame,
    table: &RuleTable,
    policy: UnmappedPolicy,
) -> Result<(Series, BTreeMap<String, usize>)> {
    let values = df.column(&table.column)?.str()?;
    let mut misses: BTreeMap<String, usize> = BTreeMap::new();
    // Raw domains are small; resolve each distinct value once.
    let mut resolved: BTreeMap<&str, (String, bool)> = BTreeMap::new();
    let mut mapped: Vec<Option<String>> = Vec::with_capacity(values.len());

    for value in values.into_iter() {
        let Some(raw) = value else {
            mapped.push(None);
            continue;
        };
        let (label, missed) = resolved
            .entry(raw)
            .or_insert_with(|| match table.resolve(raw) {
                Resolution::Canonical(label) | Resolution::Matched(label) => {
                    (label.to_string(), false)
                }
                Resolution::Unmatched => {
                    let label = match policy {
                        UnmappedPolicy::CatchAll => table.fallback.clone(),
                        UnmappedPolicy::PassThrough | UnmappedPolicy::Reject => raw.to_string(),
                    };
                    (label, true)
                }
            });
        if *missed {
            *misses.entry(raw.trim().to_string()).or_default() += 1;
        }
        mapped.push(Some(label.clone()));
    }

    Ok((Series::new(table.column.as_str().into(), mapped), misses))
}
