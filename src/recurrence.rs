use chrono::{DateTime, Duration, Months, NaiveTime, Utc};
use thiserror::Error;

use crate::models::{Recurrence, RecurrenceInterval, RecurringConfig, Task};

/// Hard cap on instances produced by one expansion. Bounds the walk even if
/// the window is absurdly wide.
pub const MAX_INSTANCES: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The task carries no template recurrence pattern.
    #[error("task {0} is not a recurring template")]
    NotATemplate(u64),
    /// Interval unrecognized or frequency below 1. Rejected before the walk
    /// starts so a bad config can never loop.
    #[error("invalid recurring config: {0}")]
    InvalidConfig(String),
}

/// True iff the interval is recognized and the frequency is at least 1.
pub fn is_valid_config(config: &RecurringConfig) -> bool {
    config.interval != RecurrenceInterval::Unrecognized && config.frequency >= 1
}

/// The occurrence following `date`: daily advances by `frequency` days,
/// weekly by `frequency` weeks, monthly by `frequency` calendar months with
/// the day-of-month clamped to the target month's length. An unrecognized
/// interval steps a single day rather than corrupting the walk.
pub fn next_occurrence(
    date: DateTime<Utc>,
    interval: RecurrenceInterval,
    frequency: u32,
) -> DateTime<Utc> {
    let next = match interval {
        RecurrenceInterval::Daily => date.checked_add_signed(Duration::days(i64::from(frequency))),
        RecurrenceInterval::Weekly => {
            date.checked_add_signed(Duration::weeks(i64::from(frequency)))
        }
        RecurrenceInterval::Monthly => date.checked_add_months(Months::new(frequency)),
        RecurrenceInterval::Unrecognized => date.checked_add_signed(Duration::days(1)),
    };
    // Saturating past any practical window keeps the walk terminating.
    next.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Expands a template into dated task instances over `[start, end]`
/// inclusive. The first candidate is `start` itself; dates whose
/// `YYYY-MM-DD` key appears in the template's exceptions are skipped.
///
/// Instances copy the template's title, description, priority and category,
/// reference it via `template_id`, and are due on the candidate date at the
/// template's original time-of-day (start-of-day if the template has none).
/// Ids are left unassigned; the store assigns them on insertion.
pub fn generate_instances(
    template: &Task,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, RecurrenceError> {
    let recurrence = template
        .recurrence
        .as_ref()
        .filter(|r| r.is_template)
        .ok_or(RecurrenceError::NotATemplate(template.id))?;
    let config = recurrence
        .config
        .as_ref()
        .ok_or_else(|| RecurrenceError::InvalidConfig("missing recurring config".to_string()))?;
    if !is_valid_config(config) {
        return Err(RecurrenceError::InvalidConfig(format!(
            "interval '{}' with frequency {}",
            config.interval.as_str(),
            config.frequency
        )));
    }

    let time_of_day = template
        .due_date
        .map(|due| due.time())
        .unwrap_or(NaiveTime::MIN);

    let mut instances = Vec::new();
    let mut current = start;
    while current <= end && instances.len() < MAX_INSTANCES {
        let date_key = current.format("%Y-%m-%d").to_string();
        if !config.exceptions.iter().any(|e| e == &date_key) {
            let due = current.date_naive().and_time(time_of_day).and_utc();
            instances.push(instance_of(template, due, now));
        }
        current = next_occurrence(current, config.interval, config.frequency);
    }
    Ok(instances)
}

fn instance_of(template: &Task, due: DateTime<Utc>, now: DateTime<Utc>) -> Task {
    Task {
        id: 0, // assigned by the store on insertion
        title: template.title.clone(),
        description: template.description.clone(),
        category_id: template.category_id,
        priority: template.priority,
        completed: false,
        completed_at: None,
        due_date: Some(due),
        created_at: now,
        order: 0,
        recurrence: Some(Recurrence {
            is_template: false,
            template_id: Some(template.id),
            config: None,
            archived: false,
        }),
        time_tracking: None,
    }
}
