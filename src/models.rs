use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority. Variant order is Low < Medium < High so comparing two
/// priorities matches their numeric ranks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Numeric rank used for display: low = 1, medium = 2, high = 3.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'. Use low, medium or high.", other)),
        }
    }
}

/// Represents a single task in the task manager.
///
/// Plain tasks leave both optional sub-records unset. Recurring templates
/// and their generated instances carry `recurrence`; anything that has ever
/// been timed carries `time_tracking`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned by the store (max existing id + 1).
    pub id: u64,
    /// Short name of the work. Non-empty, at most 200 characters.
    pub title: String,
    /// Free-form details, at most 1000 characters.
    #[serde(default)]
    pub description: String,
    /// Weak reference to the owning category. Lookup only, never cascaded.
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    /// Set when `completed` flips to true, cleared when it flips back.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Timestamp assigned once at creation.
    pub created_at: DateTime<Utc>,
    /// Manual sort position.
    #[serde(default)]
    pub order: i64,
    /// Recurrence sub-record, present on templates and their instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Time-tracking sub-record, present once a timer has been started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_tracking: Option<TimeTracking>,
}

impl Task {
    /// True for tasks that define a recurrence pattern rather than a
    /// single occurrence.
    pub fn is_template(&self) -> bool {
        self.recurrence.as_ref().is_some_and(|r| r.is_template)
    }

    /// True for instances generated from a template.
    pub fn is_recurring_instance(&self) -> bool {
        self.recurrence.as_ref().is_some_and(|r| r.template_id.is_some())
    }

    pub fn is_archived(&self) -> bool {
        self.recurrence.as_ref().is_some_and(|r| r.archived)
    }
}

/// Recurrence sub-record. Templates carry a `config` and no `template_id`;
/// generated instances carry a `template_id` and no config.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(default)]
    pub is_template: bool,
    /// The originating template, set on generated instances.
    #[serde(default)]
    pub template_id: Option<u64>,
    #[serde(default)]
    pub config: Option<RecurringConfig>,
    /// Templates are archived instead of deleted so instances keep a
    /// resolvable reference.
    #[serde(default)]
    pub archived: bool,
}

/// How a template repeats.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecurringConfig {
    pub interval: RecurrenceInterval,
    /// Number of intervals between occurrences. Must be at least 1.
    pub frequency: u32,
    /// `YYYY-MM-DD` date keys excluded from generation.
    #[serde(default)]
    pub exceptions: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    Daily,
    Weekly,
    Monthly,
    /// Catch-all for interval strings the expander does not recognize.
    #[serde(other)]
    Unrecognized,
}

impl RecurrenceInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceInterval::Daily => "daily",
            RecurrenceInterval::Weekly => "weekly",
            RecurrenceInterval::Monthly => "monthly",
            RecurrenceInterval::Unrecognized => "unrecognized",
        }
    }
}

impl FromStr for RecurrenceInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrenceInterval::Daily),
            "weekly" => Ok(RecurrenceInterval::Weekly),
            "monthly" => Ok(RecurrenceInterval::Monthly),
            other => Err(format!(
                "unknown recurrence interval '{}'. Use daily, weekly or monthly.",
                other
            )),
        }
    }
}

/// Time-tracking sub-record for a task.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeTracking {
    /// The running session, if any. At most one per task.
    #[serde(default)]
    pub active_timer: Option<ActiveTimer>,
    /// Seconds accumulated across all closed sessions.
    #[serde(default)]
    pub total_duration: i64,
    /// Closed sessions, oldest first.
    #[serde(default)]
    pub entries: Vec<TimerEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
}

/// One closed start/stop interval tracked against a task.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerEntry {
    pub id: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Whole seconds, floored.
    pub duration: i64,
}

/// Represents a task category.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier for the category.
    pub id: u64,
    pub name: String,
    /// Display color, e.g. `#EF4444`.
    pub color: String,
    pub icon: String,
    /// Derived count of tasks referencing this category. Recomputed from
    /// the task collection, never edited directly.
    #[serde(default)]
    pub task_count: u32,
}

/// Which completion state a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            "overdue" => Ok(StatusFilter::Overdue),
            other => Err(format!(
                "unknown status '{}'. Use all, pending, completed or overdue.",
                other
            )),
        }
    }
}

/// Transient query criteria. A task is retained only if every active
/// criterion matches; unset fields impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<u64>,
    /// Case-insensitive substring matched against title or description.
    pub search: Option<String>,
}

/// Sort key for task listings. `Order` is the manual position and the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    Priority,
    DueDate,
    Created,
    #[default]
    Order,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "priority" => Ok(SortKey::Priority),
            "due" | "duedate" | "due-date" => Ok(SortKey::DueDate),
            "created" => Ok(SortKey::Created),
            "order" => Ok(SortKey::Order),
            other => Err(format!(
                "unknown sort key '{}'. Use title, priority, due, created or order.",
                other
            )),
        }
    }
}

/// Input for creating a task. The store fills in identity and bookkeeping
/// fields on insertion.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category_id: Option<u64>,
    pub due_date: Option<DateTime<Utc>>,
    pub recurrence: Option<Recurrence>,
}

/// Partial update for a task. `None` leaves a field untouched; for nullable
/// fields the inner `Option` distinguishes "set" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category_id: Option<Option<u64>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
    /// Explicitly discard all accumulated time tracking.
    pub reset_time_tracking: bool,
}
