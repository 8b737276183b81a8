use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{SortKey, StatusFilter, Task, TaskDraft, TaskFilters};

/// Maximum length of a task title.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum length of a task description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Returns the tasks matching every active criterion, preserving input
/// order.
pub fn filter_tasks(tasks: &[Task], filters: &TaskFilters, now: DateTime<Utc>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| matches_filters(t, filters, now))
        .cloned()
        .collect()
}

fn matches_filters(task: &Task, filters: &TaskFilters, now: DateTime<Utc>) -> bool {
    match filters.status {
        StatusFilter::All => {}
        StatusFilter::Pending => {
            if task.completed {
                return false;
            }
        }
        StatusFilter::Completed => {
            if !task.completed {
                return false;
            }
        }
        StatusFilter::Overdue => {
            if !is_overdue(task, now) {
                return false;
            }
        }
    }
    if let Some(priority) = filters.priority {
        if task.priority != priority {
            return false;
        }
    }
    if let Some(category) = filters.category {
        if task.category_id != Some(category) {
            return false;
        }
    }
    if let Some(needle) = filters.search.as_deref() {
        if !needle.is_empty() && !matches_search(task, needle) {
            return false;
        }
    }
    true
}

/// An incomplete task whose due date has passed.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < now)
}

/// Case-insensitive substring match against title or description.
pub fn matches_search(task: &Task, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task.description.to_lowercase().contains(&needle)
}

/// Stable sort on the requested key. Descending flips the comparator, so
/// ties keep their relative input order either way.
pub fn sort_tasks(tasks: &[Task], key: SortKey, ascending: bool) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        let ord = match key {
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Priority => a.priority.cmp(&b.priority),
            SortKey::DueDate => due_or_latest(a).cmp(&due_or_latest(b)),
            SortKey::Created => a.created_at.cmp(&b.created_at),
            SortKey::Order => a.order.cmp(&b.order),
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    sorted
}

// Missing due dates sort as latest possible.
fn due_or_latest(task: &Task) -> DateTime<Utc> {
    task.due_date.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Aggregate counts over a task collection.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Percentage of completed tasks, rounded. 0 for an empty collection.
    pub completion_rate: u32,
}

pub fn task_stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks.iter().filter(|t| is_overdue(t, now)).count();
    let completion_rate = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    TaskStats {
        total,
        completed,
        pending: total - completed,
        overdue,
        completion_rate,
    }
}

/// Field-keyed validation messages. Empty means the draft is acceptable.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: BTreeMap<&'static str, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks a draft before it reaches the store. Problems come back as data
/// so the caller can render per-field messages; nothing here is an error
/// in the `Result` sense.
pub fn validate_task(draft: &TaskDraft, now: DateTime<Utc>) -> ValidationResult {
    let mut errors = BTreeMap::new();

    if draft.title.trim().is_empty() {
        errors.insert("title", "Task title is required".to_string());
    } else if draft.title.chars().count() > MAX_TITLE_LEN {
        errors.insert(
            "title",
            format!("Task title must be less than {} characters", MAX_TITLE_LEN),
        );
    }

    if draft.description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.insert(
            "description",
            format!("Description must be less than {} characters", MAX_DESCRIPTION_LEN),
        );
    }

    if let Some(due) = draft.due_date {
        if due < now {
            errors.insert("dueDate", "Due date cannot be in the past".to_string());
        }
    }

    ValidationResult { errors }
}
