use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{ActiveTimer, Task, TimeTracking, TimerEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    /// A second start must not clobber the running session's start time.
    #[error("task {0} already has an active timer")]
    AlreadyRunning(u64),
}

/// Whether the task currently has a running session.
pub fn is_running(task: &Task) -> bool {
    task.time_tracking
        .as_ref()
        .and_then(|t| t.active_timer.as_ref())
        .is_some_and(|a| a.is_active)
}

/// Idle -> Running. Returns an updated copy; the input task is untouched.
/// Starting while already running is an error.
pub fn start_timer(task: &Task, now: DateTime<Utc>) -> Result<Task, TimerError> {
    if is_running(task) {
        return Err(TimerError::AlreadyRunning(task.id));
    }
    let mut updated = task.clone();
    let tracking = updated.time_tracking.get_or_insert_with(TimeTracking::default);
    tracking.active_timer = Some(ActiveTimer {
        start_time: now,
        is_active: true,
    });
    Ok(updated)
}

/// Running -> Idle: folds the session into `total_duration` and appends a
/// timer entry. Returns the task unchanged while idle.
pub fn stop_timer(task: &Task, now: DateTime<Utc>) -> Task {
    let start = match task.time_tracking.as_ref().and_then(|t| t.active_timer.as_ref()) {
        Some(active) if active.is_active => active.start_time,
        _ => return task.clone(),
    };

    let mut updated = task.clone();
    let tracking = updated.time_tracking.get_or_insert_with(TimeTracking::default);
    let duration = (now - start).num_seconds();
    tracking.entries.push(TimerEntry {
        id: next_entry_id(&tracking.entries, now),
        start_time: start,
        end_time: now,
        duration,
    });
    tracking.total_duration += duration;
    tracking.active_timer = None;
    updated
}

// Epoch-millisecond ids, bumped past the last entry on collision.
fn next_entry_id(entries: &[TimerEntry], now: DateTime<Utc>) -> u64 {
    let candidate = now.timestamp_millis().max(0) as u64;
    match entries.iter().map(|e| e.id).max() {
        Some(last) if candidate <= last => last + 1,
        _ => candidate,
    }
}

/// Seconds elapsed in the current session, floored; 0 while idle. Not
/// clamped: a clock that moved backwards yields a negative reading.
pub fn current_session_duration(task: &Task, now: DateTime<Utc>) -> i64 {
    match task.time_tracking.as_ref().and_then(|t| t.active_timer.as_ref()) {
        Some(active) if active.is_active => (now - active.start_time).num_seconds(),
        _ => 0,
    }
}

/// Accumulated closed-session seconds, plus the running session if any.
pub fn total_task_duration(task: &Task, now: DateTime<Utc>) -> i64 {
    let accumulated = task
        .time_tracking
        .as_ref()
        .map(|t| t.total_duration)
        .unwrap_or(0);
    accumulated + current_session_duration(task, now)
}

/// Renders seconds as "1h 5m" at an hour or more, "12m" at a minute or
/// more, "42s" below that. Zero or negative input renders as "0m".
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0m".to_string();
    }
    if seconds >= 3600 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else if seconds >= 60 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}
