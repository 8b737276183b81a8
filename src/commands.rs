use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use log::info;

use crate::models::{
    Priority, Recurrence, RecurrenceInterval, RecurringConfig, SortKey, Task, TaskDraft,
    TaskFilters, TaskPatch,
};
use crate::query::{filter_tasks, sort_tasks, validate_task, ValidationResult};
use crate::recurrence::generate_instances;
use crate::store::{CategoryStore, TaskStore};
use crate::timer::{
    current_session_duration, format_duration, is_running, start_timer, stop_timer,
    total_task_duration,
};

/// Lists tasks in a formatted table after filtering and sorting.
///
/// Archived templates are hidden; live templates appear with a Template
/// status so their recurrence is visible.
pub fn cmd_list(
    tasks: &TaskStore,
    categories: &CategoryStore,
    filters: &TaskFilters,
    sort: SortKey,
    descending: bool,
) -> Result<()> {
    let now = Utc::now();
    let snapshot: Vec<Task> = tasks
        .all()
        .into_iter()
        .filter(|t| !t.is_archived())
        .collect();
    let visible = sort_tasks(&filter_tasks(&snapshot, filters, now), sort, !descending);

    if visible.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Tracked").add_attribute(Attribute::Bold),
        ]);

    let category_names = categories.all();
    for task in visible {
        let category = task
            .category_id
            .and_then(|id| category_names.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let due = task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let overdue = crate::query::is_overdue(&task, now);

        let (status, status_color) = if task.is_template() {
            ("Template", Color::Cyan)
        } else if task.completed {
            ("Done", Color::Green)
        } else if overdue {
            ("Overdue", Color::Red)
        } else {
            ("Pending", Color::Yellow)
        };

        let priority_color = match task.priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Grey,
        };

        let tracked = match task.time_tracking.as_ref() {
            Some(_) => format_duration(total_task_duration(&task, now)),
            None => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(task.id),
            Cell::new(&task.title),
            Cell::new(category),
            Cell::new(task.priority.as_str()).fg(priority_color),
            Cell::new(due).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(status).fg(status_color),
            Cell::new(tracked),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Prints aggregate statistics for the whole collection.
pub fn cmd_stats(tasks: &TaskStore) -> Result<()> {
    let stats = tasks.stats(Utc::now());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Total",
        "Completed",
        "Pending",
        "Overdue",
        "Completion",
    ]);
    table.add_row(vec![
        stats.total.to_string(),
        stats.completed.to_string(),
        stats.pending.to_string(),
        stats.overdue.to_string(),
        format!("{}%", stats.completion_rate),
    ]);
    println!("{table}");
    Ok(())
}

/// Adds a new task, or a recurring template when `recur` is given.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    tasks: &mut TaskStore,
    title: String,
    description: Option<String>,
    priority: Option<String>,
    category: Option<u64>,
    due: Option<String>,
    recur: Option<String>,
    every: Option<u32>,
    skip: Vec<String>,
) -> Result<()> {
    let priority = match priority {
        Some(p) => p.parse::<Priority>().map_err(|e| anyhow!(e))?,
        None => Priority::default(),
    };
    let due_date = due.as_deref().map(parse_due_date).transpose()?;

    let recurrence = match recur {
        Some(interval) => {
            let interval = interval.parse::<RecurrenceInterval>().map_err(|e| anyhow!(e))?;
            Some(Recurrence {
                is_template: true,
                template_id: None,
                config: Some(RecurringConfig {
                    interval,
                    frequency: every.unwrap_or(1),
                    exceptions: skip,
                }),
                archived: false,
            })
        }
        None => None,
    };

    let draft = TaskDraft {
        title,
        description: description.unwrap_or_default(),
        priority,
        category_id: category,
        due_date,
        recurrence,
    };

    let now = Utc::now();
    let validation = validate_task(&draft, now);
    if !validation.is_valid() {
        report_validation(&validation);
        bail!("task was not added");
    }

    let is_template = draft.recurrence.is_some();
    let task = tasks.create(draft, now);
    if is_template {
        println!("Recurring template added (id = {})", task.id);
    } else {
        println!("Task added (id = {})", task.id);
    }
    Ok(())
}

/// Marks one or more tasks as complete. Already-completed and missing ids
/// are reported without aborting the rest of the batch.
pub fn cmd_complete(tasks: &mut TaskStore, ids: Vec<u64>) -> Result<()> {
    let now = Utc::now();
    let mut completed = 0usize;
    for id in ids {
        match tasks.get(id) {
            Ok(task) if task.completed => {
                println!("Task {} is already completed.", id);
            }
            Ok(_) => {
                let patch = TaskPatch {
                    completed: Some(true),
                    ..TaskPatch::default()
                };
                tasks.update(id, patch, now)?;
                completed += 1;
                println!("Task {} marked as complete.", id);
            }
            Err(_) => {
                eprintln!("Task {} not found.", id);
            }
        }
    }
    if completed > 1 {
        println!("{} tasks marked as complete.", completed);
    }
    Ok(())
}

/// Removes a task. Templates are archived instead of deleted.
pub fn cmd_remove(tasks: &mut TaskStore, id: u64) -> Result<()> {
    let task = tasks.get(id)?;
    tasks.delete(id)?;
    if task.is_template() {
        println!("Template {} archived (instances keep their reference).", id);
    } else {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Edits an existing task's details. The merged result is validated before
/// anything is written.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    tasks: &mut TaskStore,
    id: u64,
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    category: Option<u64>,
    due: Option<String>,
    order: Option<i64>,
) -> Result<()> {
    let existing = tasks.get(id)?;
    let priority = priority
        .map(|p| p.parse::<Priority>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let due_date = due.as_deref().map(parse_due_date).transpose()?;

    let now = Utc::now();
    let merged = TaskDraft {
        title: title.clone().unwrap_or_else(|| existing.title.clone()),
        description: description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        priority: priority.unwrap_or(existing.priority),
        category_id: category.or(existing.category_id),
        due_date: due_date.or(existing.due_date),
        recurrence: None,
    };
    let validation = validate_task(&merged, now);
    if !validation.is_valid() {
        report_validation(&validation);
        bail!("task was not updated");
    }

    let patch = TaskPatch {
        title,
        description,
        priority,
        category_id: category.map(Some),
        due_date: due_date.map(Some),
        order,
        ..TaskPatch::default()
    };
    tasks.update(id, patch, now)?;
    println!("Task {} updated.", id);
    Ok(())
}

/// Searches titles and descriptions, case-insensitively.
pub fn cmd_search(tasks: &TaskStore, query: String) -> Result<()> {
    let matches = tasks.search(&query);
    if matches.is_empty() {
        println!("No tasks match '{}'.", query);
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Title", "Description", "Status"]);
    for task in matches {
        let status = if task.completed { "Done" } else { "Pending" };
        table.add_row(vec![
            task.id.to_string(),
            task.title.clone(),
            task.description.clone(),
            status.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Moves a task to a new manual sort position.
pub fn cmd_reorder(tasks: &mut TaskStore, id: u64, order: i64) -> Result<()> {
    tasks.reorder(id, order)?;
    println!("Task {} moved to position {}.", id, order);
    Ok(())
}

/// Starts the timer on a task. Fails if one is already running.
pub fn cmd_timer_start(tasks: &mut TaskStore, id: u64) -> Result<()> {
    let task = tasks.get(id)?;
    let updated = start_timer(&task, Utc::now())?;
    tasks.commit(updated)?;
    println!("Timer started on task {}.", id);
    Ok(())
}

/// Stops the running timer on a task, logging the session.
pub fn cmd_timer_stop(tasks: &mut TaskStore, id: u64) -> Result<()> {
    let task = tasks.get(id)?;
    if !is_running(&task) {
        println!("No active timer on task {}.", id);
        return Ok(());
    }
    let now = Utc::now();
    let updated = stop_timer(&task, now);
    let session = updated
        .time_tracking
        .as_ref()
        .and_then(|t| t.entries.last())
        .map(|e| e.duration)
        .unwrap_or(0);
    let total = total_task_duration(&updated, now);
    tasks.commit(updated)?;
    println!(
        "Timer stopped on task {}: logged {} (total {}).",
        id,
        format_duration(session),
        format_duration(total)
    );
    Ok(())
}

/// Shows the timer state and session history for a task.
pub fn cmd_timer_show(tasks: &TaskStore, id: u64) -> Result<()> {
    let task = tasks.get(id)?;
    let now = Utc::now();

    if is_running(&task) {
        println!(
            "Timer running: {} this session.",
            format_duration(current_session_duration(&task, now))
        );
    } else {
        println!("Timer idle.");
    }
    println!("Total tracked: {}", format_duration(total_task_duration(&task, now)));

    let entries = task
        .time_tracking
        .as_ref()
        .map(|t| t.entries.clone())
        .unwrap_or_default();
    if entries.is_empty() {
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Started", "Ended", "Duration"]);
    for entry in entries {
        table.add_row(vec![
            entry.start_time.format("%Y-%m-%d %H:%M").to_string(),
            entry.end_time.format("%Y-%m-%d %H:%M").to_string(),
            format_duration(entry.duration),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Expands a recurring template over a date window and inserts the
/// resulting instances.
pub fn cmd_generate(tasks: &mut TaskStore, template_id: u64, from: String, to: String) -> Result<()> {
    let start = parse_window_date(&from)?;
    let end = parse_window_date(&to)?;
    let template = tasks.get(template_id)?;

    let instances = generate_instances(&template, start, end, Utc::now())?;
    if instances.is_empty() {
        println!("No instances generated (window empty or all dates excluded).");
        return Ok(());
    }

    let inserted = tasks.insert_instances(instances);
    info!(
        "generated {} instances from template {}",
        inserted.len(),
        template_id
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Due"]);
    for instance in &inserted {
        let due = instance
            .due_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        table.add_row(vec![instance.id.to_string(), due]);
    }
    println!("{table}");
    println!(
        "Generated {} instances from template '{}'.",
        inserted.len(),
        template.title
    );
    Ok(())
}

/// Lists categories with their derived task counts.
pub fn cmd_category_list(categories: &mut CategoryStore, tasks: &TaskStore) -> Result<()> {
    categories.refresh_task_counts(&tasks.all());
    let all = categories.all();
    if all.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Color", "Icon", "Tasks"]);
    for category in all {
        table.add_row(vec![
            category.id.to_string(),
            category.name,
            category.color,
            category.icon,
            category.task_count.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Adds a new category.
pub fn cmd_category_add(
    categories: &mut CategoryStore,
    name: String,
    color: Option<String>,
    icon: Option<String>,
) -> Result<()> {
    let category = categories.create(
        name,
        color.unwrap_or_else(|| "#6B7280".to_string()),
        icon.unwrap_or_else(|| "folder".to_string()),
    );
    println!("Category '{}' added (id = {}).", category.name, category.id);
    Ok(())
}

/// Removes a category. Tasks keep their (now dangling) category reference.
pub fn cmd_category_remove(categories: &mut CategoryStore, id: u64) -> Result<()> {
    categories.delete(id)?;
    println!("Category {} removed. Tasks keep their category reference.", id);
    Ok(())
}

fn report_validation(validation: &ValidationResult) {
    eprintln!("Task is not valid:");
    for (field, message) in &validation.errors {
        eprintln!("  {}: {}", field, message);
    }
}

// Due dates given as bare dates land at the end of the day, so a task due
// "today" is not instantly overdue.
fn parse_due_date(s: &str) -> Result<DateTime<Utc>> {
    let date = parse_date(s)?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Ok(date.and_time(end_of_day).and_utc())
}

// Generation windows start at midnight so the window's first day is itself
// a candidate.
fn parse_window_date(s: &str) -> Result<DateTime<Utc>> {
    Ok(parse_date(s)?.and_time(NaiveTime::MIN).and_utc())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date '{}': {}. Use YYYY-MM-DD.", s, e))
}
