//! Task vocabulary: names, categories and expected budgets per task code.
//!
//! The aggregator only sees the [`TaskLookup`] trait. [`Catalog`] is the
//! in-memory implementation, with a built-in default vocabulary that can be
//! replaced from configuration.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A category that tasks roll up into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub name: String,
}

/// Metadata known about a task code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: String,
    pub category: Option<Category>,
    /// Budgeted minutes for the task, if any.
    pub expected_minutes: Option<i64>,
}

/// Maps a lowercase task key to its metadata.
///
/// Returning `None` means the task has no name, no category and no budget.
pub trait TaskLookup {
    fn lookup(&self, key: &str) -> Option<TaskInfo>;
}

/// A lookup that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl TaskLookup for NoLookup {
    fn lookup(&self, _key: &str) -> Option<TaskInfo> {
        None
    }
}

/// A task definition as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    pub code: String,
    pub name: String,
    /// Code of the category this task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_minutes: Option<i64>,
}

/// A category definition as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub code: String,
    pub name: String,
}

/// In-memory task vocabulary. Codes match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tasks: Vec<TaskDef>,
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
}

impl Default for Catalog {
    fn default() -> Self {
        let task = |code: &str, name: &str, category: &str| TaskDef {
            code: code.to_string(),
            name: name.to_string(),
            category: Some(category.to_string()),
            expected_minutes: None,
        };
        let category = |code: &str, name: &str| CategoryDef {
            code: code.to_string(),
            name: name.to_string(),
        };

        Self {
            tasks: vec![
                task("A", "Planned work", "A"),
                task("O", "Unplanned work", "O"),
                task("D", "Deployments", "W"),
                task("M", "Meetings", "M"),
                task("S", "Support", "W"),
                task("W", "Maintenance", "W"),
                task("V", "Miscellaneous", "V"),
            ],
            categories: vec![
                category("A", "Planned work"),
                category("O", "Unplanned work"),
                category("M", "Meetings"),
                category("W", "Maintenance"),
                category("V", "Miscellaneous"),
            ],
        }
    }
}

impl Catalog {
    /// An empty catalog: every task is unknown.
    pub fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Adds budgets to the matching tasks, keyed by lowercase task code.
    ///
    /// Budgets for codes the catalog does not know add a bare task entry so
    /// the budget is not lost.
    #[must_use]
    pub fn with_budgets(mut self, budgets: &HashMap<String, i64>) -> Self {
        let mut keys: Vec<&String> = budgets.keys().collect();
        keys.sort();

        for key in keys {
            let minutes = budgets[key];
            match self
                .tasks
                .iter_mut()
                .find(|t| t.code.eq_ignore_ascii_case(key))
            {
                Some(task) => task.expected_minutes = Some(minutes),
                None => self.tasks.push(TaskDef {
                    code: key.clone(),
                    name: key.to_uppercase(),
                    category: None,
                    expected_minutes: Some(minutes),
                }),
            }
        }
        self
    }

    fn category(&self, code: &str) -> Option<Category> {
        self.categories
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .map(|c| Category {
                code: c.code.to_lowercase(),
                name: c.name.clone(),
            })
    }
}

impl TaskLookup for Catalog {
    fn lookup(&self, key: &str) -> Option<TaskInfo> {
        let task = self.tasks.iter().find(|t| t.code.eq_ignore_ascii_case(key))?;
        let category = task.category.as_deref().map(|code| {
            self.category(code).unwrap_or_else(|| Category {
                code: code.to_lowercase(),
                name: code.to_string(),
            })
        });

        Some(TaskInfo {
            name: task.name.clone(),
            category,
            expected_minutes: task.expected_minutes,
        })
    }
}

// ========== Budget Lines ==========

/// `> - <label> <X>: <N>h`, where `X` is the character right before the colon.
static BUDGET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^> - .*?(\S):\s*(\d+)\s*h?\s*$").unwrap());

/// Parses a budget line such as `> - Planned work A: 178h`.
///
/// Returns the lowercase task key and the budget in minutes, or `None` if the
/// line is not a budget line.
pub fn parse_budget_line(line: &str) -> Option<(String, i64)> {
    let caps = BUDGET_LINE_RE.captures(line.trim_end())?;
    let hours: i64 = caps[2].parse().ok()?;
    Some((caps[1].to_lowercase(), hours.checked_mul(60)?))
}

/// Collects every budget line, summing repeated declarations per task.
pub fn parse_budgets<I, S>(lines: I) -> HashMap<String, i64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| parse_budget_line(line.as_ref()))
        .fold(HashMap::new(), |mut budgets, (key, minutes)| {
            *budgets.entry(key).or_insert(0) += minutes;
            budgets
        })
}
