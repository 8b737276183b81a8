use chrono::{DateTime, Duration, Utc};
use taskdeck::models::{Priority, Task};
use taskdeck::timer::{
    current_session_duration, format_duration, is_running, start_timer, stop_timer,
    total_task_duration, TimerError,
};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn task(id: u64) -> Task {
    Task {
        id,
        title: "Untimed work".into(),
        description: String::new(),
        category_id: None,
        priority: Priority::Medium,
        completed: false,
        completed_at: None,
        due_date: None,
        created_at: at("2026-01-01T00:00:00Z"),
        order: 1,
        recurrence: None,
        time_tracking: None,
    }
}

#[test]
fn test_start_then_stop_records_one_entry() {
    let t0 = at("2026-05-01T10:00:00Z");
    let t1 = t0 + Duration::seconds(300);

    let running = start_timer(&task(1), t0).unwrap();
    assert!(is_running(&running));

    let stopped = stop_timer(&running, t1);
    assert!(!is_running(&stopped));

    let tracking = stopped.time_tracking.as_ref().unwrap();
    assert!(tracking.active_timer.is_none());
    assert_eq!(tracking.entries.len(), 1);
    assert_eq!(tracking.entries[0].duration, 300);
    assert_eq!(tracking.entries[0].start_time, t0);
    assert_eq!(tracking.entries[0].end_time, t1);
    // First session: the sole entry equals the accumulated total.
    assert_eq!(tracking.total_duration, tracking.entries[0].duration);
    assert!(tracking.total_duration >= 0);
}

#[test]
fn test_start_while_running_is_an_error() {
    let t0 = at("2026-05-01T10:00:00Z");
    let running = start_timer(&task(7), t0).unwrap();

    let err = start_timer(&running, t0 + Duration::seconds(60)).unwrap_err();
    assert_eq!(err, TimerError::AlreadyRunning(7));

    // The original session start is untouched.
    let active = running.time_tracking.as_ref().unwrap().active_timer.unwrap();
    assert_eq!(active.start_time, t0);
}

#[test]
fn test_stop_while_idle_is_a_noop() {
    let idle = task(1);
    let stopped = stop_timer(&idle, at("2026-05-01T10:00:00Z"));
    assert!(stopped.time_tracking.is_none());

    // Also a no-op after a session has already been closed.
    let t0 = at("2026-05-01T10:00:00Z");
    let closed = stop_timer(&start_timer(&idle, t0).unwrap(), t0 + Duration::seconds(10));
    let again = stop_timer(&closed, t0 + Duration::seconds(500));
    assert_eq!(again.time_tracking.as_ref().unwrap().entries.len(), 1);
    assert_eq!(again.time_tracking.as_ref().unwrap().total_duration, 10);
}

#[test]
fn test_sessions_accumulate() {
    let t0 = at("2026-05-01T10:00:00Z");
    let mut current = task(1);
    for (start, len) in [(0i64, 120i64), (600, 60), (1200, 30)] {
        let started = start_timer(&current, t0 + Duration::seconds(start)).unwrap();
        current = stop_timer(&started, t0 + Duration::seconds(start + len));
    }

    let tracking = current.time_tracking.as_ref().unwrap();
    assert_eq!(tracking.entries.len(), 3);
    assert_eq!(tracking.total_duration, 210);
}

#[test]
fn test_current_session_duration() {
    let t0 = at("2026-05-01T10:00:00Z");
    let idle = task(1);
    assert_eq!(current_session_duration(&idle, t0), 0);

    let running = start_timer(&idle, t0).unwrap();
    assert_eq!(
        current_session_duration(&running, t0 + Duration::seconds(90)),
        90
    );
}

#[test]
fn test_total_includes_running_session() {
    let t0 = at("2026-05-01T10:00:00Z");
    let closed = stop_timer(
        &start_timer(&task(1), t0).unwrap(),
        t0 + Duration::seconds(100),
    );
    let running = start_timer(&closed, t0 + Duration::seconds(200)).unwrap();

    assert_eq!(
        total_task_duration(&running, t0 + Duration::seconds(250)),
        150
    );
    // Idle total is the accumulated figure alone.
    assert_eq!(total_task_duration(&closed, t0 + Duration::seconds(9999)), 100);
}

#[test]
fn test_entry_ids_are_unique() {
    let t0 = at("2026-05-01T10:00:00Z");
    let t1 = t0 + Duration::seconds(5);

    // Two sessions closed at the same instant still get distinct ids.
    let first = stop_timer(&start_timer(&task(1), t0).unwrap(), t1);
    let second = stop_timer(&start_timer(&first, t1).unwrap(), t1);

    let entries = &second.time_tracking.as_ref().unwrap().entries;
    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].id, entries[1].id);
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0m");
    assert_eq!(format_duration(-5), "0m");
    assert_eq!(format_duration(42), "42s");
    assert_eq!(format_duration(90), "1m");
    assert_eq!(format_duration(3600), "1h 0m");
    assert_eq!(format_duration(3661), "1h 1m");
    assert_eq!(format_duration(7325), "2h 2m");
}
