//! Summary aggregation.
//!
//! # Algorithm Summary
//!
//! 1. Fold intervals into one group per lowercase task key, remembering the
//!    position where each group was first seen
//! 2. Total the received minutes and derive each group's share of the total
//! 3. Attach names, categories and budgets from a [`TaskLookup`]
//!
//! [`Summary::by_category`] folds the per-task entries into per-category
//! entries and returns a new summary. Ranking happens only at presentation
//! time through [`Summary::ranked`].

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::catalog::{Category, TaskLookup};
use crate::interval::TaskInterval;

/// Group key used for entries whose task has no category.
pub const UNCATEGORIZED_KEY: &str = "uncategorized";

/// What the entries of a summary are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Task,
    Category,
}

/// Aggregated time for one task or one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    /// Lowercase task code or category code.
    pub key: String,

    /// Human-readable name, when the lookup knows one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Short label (the uppercase code).
    pub short_name: String,

    /// Category of a task entry, or the category itself for a category entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Sum of the durations folded into this entry.
    pub received_minutes: i64,

    /// Budgeted minutes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_minutes: Option<i64>,

    /// Number of intervals folded into this entry.
    pub count_tasks: usize,

    /// `received_minutes / total_minutes`, or 0 when the total is not positive.
    pub factor_of_total: f64,

    /// `received_minutes / expected_minutes` for a task, the sum of the
    /// member factors for a category. Absent when there is no positive
    /// budget; absence is not the same as zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_of_expected: Option<f64>,

    #[serde(skip)]
    first_seen: usize,
}

impl SummaryEntry {
    #[allow(clippy::cast_precision_loss)]
    pub fn received_hours(&self) -> f64 {
        self.received_minutes as f64 / 60.0
    }

    /// Display name if known, otherwise the short name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.short_name)
    }
}

/// Aggregate of one parse run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    kind: GroupKind,
    total_minutes: i64,
    total_hours: f64,
    entries: BTreeMap<String, SummaryEntry>,
}

/// `part / whole`, or 0 when `whole` is not positive.
#[allow(clippy::cast_precision_loss)]
fn ratio(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64
    } else {
        0.0
    }
}

/// `received / expected`, absent unless `expected` is positive.
#[allow(clippy::cast_precision_loss)]
fn expected_ratio(received: i64, expected: Option<i64>) -> Option<f64> {
    expected
        .filter(|&minutes| minutes > 0)
        .map(|minutes| received as f64 / minutes as f64)
}

#[allow(clippy::cast_precision_loss)]
fn hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

/// Running totals for one group while folding.
#[derive(Debug, Clone, Copy)]
struct Tally {
    first_seen: usize,
    received: i64,
    count: usize,
}

/// Builds the per-task summary of `intervals`.
///
/// An empty input yields an empty summary with a zero total.
pub fn summarize<L: TaskLookup + ?Sized>(intervals: &[TaskInterval], lookup: &L) -> Summary {
    let tallies = intervals.iter().enumerate().fold(
        HashMap::<String, Tally>::new(),
        |mut tallies, (idx, interval)| {
            let tally = tallies.entry(interval.key()).or_insert(Tally {
                first_seen: idx,
                received: 0,
                count: 0,
            });
            tally.received += interval.duration_minutes();
            tally.count += 1;
            tallies
        },
    );

    let total_minutes: i64 = tallies.values().map(|t| t.received).sum();

    let entries: BTreeMap<String, SummaryEntry> = tallies
        .into_iter()
        .map(|(key, tally)| {
            let info = lookup.lookup(&key);
            let expected_minutes = info.as_ref().and_then(|i| i.expected_minutes);
            let entry = SummaryEntry {
                short_name: key.to_uppercase(),
                display_name: info.as_ref().map(|i| i.name.clone()),
                category: info.and_then(|i| i.category),
                received_minutes: tally.received,
                expected_minutes,
                count_tasks: tally.count,
                factor_of_total: ratio(tally.received, total_minutes),
                factor_of_expected: expected_ratio(tally.received, expected_minutes),
                first_seen: tally.first_seen,
                key: key.clone(),
            };
            (key, entry)
        })
        .collect();

    tracing::debug!(
        groups = entries.len(),
        total_minutes,
        "summarized task intervals"
    );

    Summary {
        kind: GroupKind::Task,
        total_minutes,
        total_hours: hours(total_minutes),
        entries,
    }
}

/// Running totals for one category while merging.
#[derive(Debug, Clone)]
struct CategoryTally {
    name: Option<String>,
    first_seen: usize,
    received: i64,
    expected: Option<i64>,
    factor_of_expected: Option<f64>,
    count: usize,
}

impl Summary {
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn total_minutes(&self) -> i64 {
        self.total_minutes
    }

    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Looks up an entry by its group key.
    pub fn get(&self, key: &str) -> Option<&SummaryEntry> {
        self.entries.get(key)
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.values()
    }

    /// Entries ordered by received minutes, most first. Ties keep the order in
    /// which groups first appeared in the input.
    pub fn ranked(&self) -> Vec<&SummaryEntry> {
        let mut ranked: Vec<&SummaryEntry> = self.entries.values().collect();
        ranked.sort_by_key(|e| (Reverse(e.received_minutes), e.first_seen));
        ranked
    }

    /// Regroups the entries by category into a new summary.
    ///
    /// Entries without a category share the [`UNCATEGORIZED_KEY`] group. The
    /// total stays the same and `factor_of_total` is recomputed from the summed
    /// minutes. `factor_of_expected` is the sum of the member factors and stays
    /// absent when no member has one. Entries are folded in key order, so the
    /// result does not depend on input order. Merging a category summary again
    /// returns an equal summary.
    #[must_use]
    pub fn by_category(&self) -> Summary {
        let tallies = self.entries.values().fold(
            BTreeMap::<String, CategoryTally>::new(),
            |mut tallies, entry| {
                let (key, name) = match &entry.category {
                    Some(category) => (category.code.clone(), Some(category.name.clone())),
                    None => (UNCATEGORIZED_KEY.to_string(), None),
                };
                let tally = tallies.entry(key).or_insert(CategoryTally {
                    name,
                    first_seen: entry.first_seen,
                    received: 0,
                    expected: None,
                    factor_of_expected: None,
                    count: 0,
                });
                tally.first_seen = tally.first_seen.min(entry.first_seen);
                tally.received += entry.received_minutes;
                tally.count += entry.count_tasks;
                tally.expected = match (tally.expected, entry.expected_minutes) {
                    (Some(a), Some(b)) => Some(a + b),
                    (a, b) => a.or(b),
                };
                tally.factor_of_expected =
                    match (tally.factor_of_expected, entry.factor_of_expected) {
                        (Some(a), Some(b)) => Some(a + b),
                        (a, b) => a.or(b),
                    };
                tallies
            },
        );

        let entries = tallies
            .into_iter()
            .map(|(key, tally)| {
                let category = tally.name.as_ref().map(|name| Category {
                    code: key.clone(),
                    name: name.clone(),
                });
                let display_name = tally
                    .name
                    .or_else(|| (key == UNCATEGORIZED_KEY).then(|| "Uncategorized".to_string()));
                let entry = SummaryEntry {
                    short_name: key.to_uppercase(),
                    display_name,
                    category,
                    received_minutes: tally.received,
                    expected_minutes: tally.expected,
                    count_tasks: tally.count,
                    factor_of_total: ratio(tally.received, self.total_minutes),
                    factor_of_expected: tally.factor_of_expected,
                    first_seen: tally.first_seen,
                    key: key.clone(),
                };
                (key, entry)
            })
            .collect();

        Summary {
            kind: GroupKind::Category,
            total_minutes: self.total_minutes,
            total_hours: self.total_hours,
            entries,
        }
    }
}
