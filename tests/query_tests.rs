use chrono::{DateTime, Utc};
use taskdeck::models::{Priority, SortKey, StatusFilter, Task, TaskDraft, TaskFilters};
use taskdeck::query::{filter_tasks, sort_tasks, task_stats, validate_task};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn task(id: u64, title: &str) -> Task {
    Task {
        id,
        title: title.into(),
        description: String::new(),
        category_id: None,
        priority: Priority::Medium,
        completed: false,
        completed_at: None,
        due_date: None,
        created_at: at("2026-01-01T00:00:00Z"),
        order: id as i64,
        recurrence: None,
        time_tracking: None,
    }
}

#[test]
fn test_stats_pending_plus_completed_equals_total() {
    let now = at("2026-06-01T12:00:00Z");
    let mut tasks = vec![task(1, "a"), task(2, "b"), task(3, "c")];
    tasks[0].completed = true;
    tasks[0].completed_at = Some(now);

    let stats = task_stats(&tasks, now);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed + stats.pending, stats.total);
    assert_eq!(stats.completion_rate, 33);
}

#[test]
fn test_stats_empty_collection() {
    let stats = task_stats(&[], at("2026-06-01T12:00:00Z"));
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completion_rate, 0);
}

#[test]
fn test_stats_counts_overdue() {
    let now = at("2026-06-01T12:00:00Z");
    let mut tasks = vec![task(1, "late"), task(2, "future"), task(3, "done late")];
    tasks[0].due_date = Some(at("2026-05-01T12:00:00Z"));
    tasks[1].due_date = Some(at("2026-07-01T12:00:00Z"));
    tasks[2].due_date = Some(at("2026-05-01T12:00:00Z"));
    tasks[2].completed = true;
    tasks[2].completed_at = Some(now);

    let stats = task_stats(&tasks, now);
    assert_eq!(stats.overdue, 1);
}

#[test]
fn test_filter_overdue_excludes_completed() {
    let now = at("2026-06-01T12:00:00Z");
    let mut tasks = vec![
        task(1, "completed past due"),
        task(2, "pending past due"),
        task(3, "pending future due"),
        task(4, "pending no due"),
    ];
    tasks[0].completed = true;
    tasks[0].completed_at = Some(now);
    tasks[0].due_date = Some(at("2026-05-01T12:00:00Z"));
    tasks[1].due_date = Some(at("2026-05-01T12:00:00Z"));
    tasks[2].due_date = Some(at("2026-07-01T12:00:00Z"));

    let filters = TaskFilters {
        status: StatusFilter::Overdue,
        ..TaskFilters::default()
    };
    let filtered = filter_tasks(&tasks, &filters, now);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, 2);
    assert!(filtered.iter().all(|t| !t.completed));
}

#[test]
fn test_filter_requires_every_criterion() {
    let now = at("2026-06-01T12:00:00Z");
    let mut tasks = vec![task(1, "Write report"), task(2, "Write email"), task(3, "Report bug")];
    tasks[0].priority = Priority::High;
    tasks[0].category_id = Some(7);
    tasks[2].priority = Priority::High;
    tasks[2].category_id = Some(7);

    let filters = TaskFilters {
        priority: Some(Priority::High),
        category: Some(7),
        search: Some("report".into()),
        ..TaskFilters::default()
    };
    let filtered = filter_tasks(&tasks, &filters, now);
    assert_eq!(filtered.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn test_filter_search_matches_description() {
    let now = at("2026-06-01T12:00:00Z");
    let mut tasks = vec![task(1, "a"), task(2, "b")];
    tasks[1].description = "Remember the MILK".into();

    let filters = TaskFilters {
        search: Some("milk".into()),
        ..TaskFilters::default()
    };
    let filtered = filter_tasks(&tasks, &filters, now);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, 2);
}

#[test]
fn test_filter_preserves_input_order() {
    let now = at("2026-06-01T12:00:00Z");
    let tasks = vec![task(3, "c"), task(1, "a"), task(2, "b")];
    let filtered = filter_tasks(&tasks, &TaskFilters::default(), now);
    assert_eq!(filtered.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 1, 2]);
}

#[test]
fn test_sort_priority_ascending_low_first() {
    let mut tasks = vec![task(1, "a"), task(2, "b"), task(3, "c")];
    tasks[0].priority = Priority::High;
    tasks[1].priority = Priority::Low;
    tasks[2].priority = Priority::Medium;

    let sorted = sort_tasks(&tasks, SortKey::Priority, true);
    assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3, 1]);

    let sorted = sort_tasks(&tasks, SortKey::Priority, false);
    assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3, 2]);
}

#[test]
fn test_sort_is_stable_for_equal_keys() {
    let tasks = vec![task(10, "same"), task(20, "same"), task(30, "same")];
    let ascending = sort_tasks(&tasks, SortKey::Priority, true);
    assert_eq!(ascending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![10, 20, 30]);
    // Flipping the direction reverses the comparator, not the tie order.
    let descending = sort_tasks(&tasks, SortKey::Priority, false);
    assert_eq!(descending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![10, 20, 30]);
}

#[test]
fn test_sort_missing_due_date_last() {
    let mut tasks = vec![task(1, "no due"), task(2, "later"), task(3, "sooner")];
    tasks[1].due_date = Some(at("2026-09-01T00:00:00Z"));
    tasks[2].due_date = Some(at("2026-08-01T00:00:00Z"));

    let sorted = sort_tasks(&tasks, SortKey::DueDate, true);
    assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2, 1]);
}

#[test]
fn test_sort_title_ignores_case() {
    let tasks = vec![task(1, "banana"), task(2, "Apple"), task(3, "cherry")];
    let sorted = sort_tasks(&tasks, SortKey::Title, true);
    assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1, 3]);
}

#[test]
fn test_sort_created() {
    let mut tasks = vec![task(1, "a"), task(2, "b")];
    tasks[0].created_at = at("2026-03-01T00:00:00Z");
    tasks[1].created_at = at("2026-02-01T00:00:00Z");

    let sorted = sort_tasks(&tasks, SortKey::Created, true);
    assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn test_sort_default_key_is_manual_order() {
    let mut tasks = vec![task(1, "a"), task(2, "b"), task(3, "c")];
    tasks[0].order = 3;
    tasks[1].order = 1;
    tasks[2].order = 2;

    let sorted = sort_tasks(&tasks, SortKey::default(), true);
    assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3, 1]);
}

#[test]
fn test_validate_blank_title() {
    let now = at("2026-06-01T12:00:00Z");
    let draft = TaskDraft {
        title: "   ".into(),
        ..TaskDraft::default()
    };
    let result = validate_task(&draft, now);
    assert!(!result.is_valid());
    assert!(result.errors.contains_key("title"));
}

#[test]
fn test_validate_title_too_long() {
    let now = at("2026-06-01T12:00:00Z");
    let draft = TaskDraft {
        title: "x".repeat(201),
        ..TaskDraft::default()
    };
    let result = validate_task(&draft, now);
    assert!(result.errors.contains_key("title"));
}

#[test]
fn test_validate_description_too_long() {
    let now = at("2026-06-01T12:00:00Z");
    let draft = TaskDraft {
        title: "ok".into(),
        description: "x".repeat(1001),
        ..TaskDraft::default()
    };
    let result = validate_task(&draft, now);
    assert!(result.errors.contains_key("description"));
}

#[test]
fn test_validate_past_due_date() {
    let now = at("2026-06-01T12:00:00Z");
    let draft = TaskDraft {
        title: "ok".into(),
        due_date: Some(at("2026-05-01T12:00:00Z")),
        ..TaskDraft::default()
    };
    let result = validate_task(&draft, now);
    assert!(result.errors.contains_key("dueDate"));
}

#[test]
fn test_validate_accepts_reasonable_draft() {
    let now = at("2026-06-01T12:00:00Z");
    let draft = TaskDraft {
        title: "Write the report".into(),
        description: "With charts".into(),
        due_date: Some(at("2026-07-01T12:00:00Z")),
        ..TaskDraft::default()
    };
    let result = validate_task(&draft, now);
    assert!(result.is_valid());
    assert!(result.errors.is_empty());
}
