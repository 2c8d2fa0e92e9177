//! Classification & view engine.
//!
//! Pure functions over an already-fetched task collection: derive each
//! task's display status, apply the filter configuration, and produce an
//! ordered copy for presentation. No I/O and no clock access — the
//! reference date is an explicit argument, so the whole module is testable
//! without a running server.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tasks::{Priority, Task};

/// Display status. Every task has exactly one, assigned in this precedence:
/// completed beats overdue beats active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Overdue,
    Active,
}

/// A task is overdue iff it has a due date, is not completed, and the due
/// calendar day is strictly before `today`. Completed tasks are never
/// overdue, whatever their date.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    match task.due_date {
        Some(due) => !task.completed && due < today,
        None => false,
    }
}

pub fn classify(task: &Task, today: NaiveDate) -> Status {
    if task.completed {
        Status::Completed
    } else if is_overdue(task, today) {
        Status::Overdue
    } else {
        Status::Active
    }
}

/// Which tasks the view shows. Defaults show everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Selected priorities; empty means no restriction.
    pub priorities: HashSet<Priority>,
    pub show_completed: bool,
    pub show_active: bool,
    pub show_overdue: bool,
    /// Exact-match category restriction; `None` means no restriction.
    pub category: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            priorities: HashSet::new(),
            show_completed: true,
            show_active: true,
            show_overdue: true,
            category: None,
        }
    }
}

impl FilterConfig {
    /// Selecting Active force-enables Overdue. The filter panel links the
    /// two checkboxes; the engine owns that rule so every caller sees the
    /// same result.
    pub fn normalize(mut self) -> Self {
        if self.show_active {
            self.show_overdue = true;
        }
        self
    }

    fn accepts(&self, task: &Task, today: NaiveDate) -> bool {
        let priority_match =
            self.priorities.is_empty() || self.priorities.contains(&task.priority);
        let category_match = self
            .category
            .as_deref()
            .is_none_or(|c| task.category == c);
        let status_match = match classify(task, today) {
            Status::Completed => self.show_completed,
            Status::Overdue => self.show_overdue,
            Status::Active => self.show_active,
        };
        priority_match && status_match && category_match
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// High before medium before low; ties keep their incoming order.
    #[default]
    Priority,
    /// Ascending due date; tasks without one sort after all that have one.
    DueDate,
    DateAsc,
    DateDesc,
}

/// Filter, then sort, returning a fresh ordered copy. The source collection
/// is never mutated.
pub fn build_view(
    tasks: &[Task],
    filter: &FilterConfig,
    sort: SortKey,
    today: NaiveDate,
) -> Vec<Task> {
    let filter = filter.clone().normalize();
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|t| filter.accepts(t, today))
        .cloned()
        .collect();
    sort_tasks(&mut visible, sort);
    visible
}

fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    match key {
        SortKey::Priority => tasks.sort_by_key(|t| t.priority),
        SortKey::DueDate => tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortKey::DateAsc => tasks.sort_by_key(|t| t.created_at),
        SortKey::DateDesc => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Deduplicated non-empty categories of the full collection, in first
/// appearance order. Drives the category-selection controls.
pub fn categories(tasks: &[Task]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for task in tasks {
        let category = task.category.trim();
        if !category.is_empty() && seen.insert(category.to_string()) {
            out.push(category.to_string());
        }
    }
    out
}

/// Explicit application state for a rendered task list: the fetched
/// collection plus the current filter and sort selection.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub tasks: Vec<Task>,
    pub filter: FilterConfig,
    pub sort: SortKey,
}

impl ViewState {
    /// The ordered sequence the presentation layer should show.
    pub fn visible(&self, today: NaiveDate) -> Vec<Task> {
        build_view(&self.tasks, &self.filter, self.sort, today)
    }

    /// Category index over the full (unfiltered) collection.
    pub fn categories(&self) -> Vec<String> {
        categories(&self.tasks)
    }
}
