use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use crate::models::{Category, Task, TaskDraft, TaskPatch};
use crate::query::{self, TaskStats};

const SEED_TASKS: &str = include_str!("../data/tasks.json");
const SEED_CATEGORIES: &str = include_str!("../data/categories.json");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("task {0} not found")]
    TaskNotFound(u64),
    #[error("category {0} not found")]
    CategoryNotFound(u64),
}

/// In-memory system of record for tasks.
///
/// Ids follow the max-existing-plus-one rule and are never reused after a
/// deletion. All reads hand out clones: the pure query/recurrence/timer
/// functions work on snapshots, and callers write results back through
/// [`TaskStore::commit`].
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// High-water mark: max existing id + 1, kept past deletions so ids
    /// are never handed out twice.
    next_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self { tasks, next_id }
    }

    /// A store preloaded with the embedded fixture data.
    pub fn seeded() -> Self {
        let tasks = match serde_json::from_str(SEED_TASKS) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("failed to parse embedded task fixtures: {}", err);
                Vec::new()
            }
        };
        Self::with_tasks(tasks)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Snapshot of the whole collection, in insertion order.
    pub fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get(&self, id: u64) -> Result<Task, StoreError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    pub fn by_category(&self, category_id: u64) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.category_id == Some(category_id))
            .cloned()
            .collect()
    }

    /// Case-insensitive title/description search over the collection.
    pub fn search(&self, needle: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| query::matches_search(t, needle))
            .cloned()
            .collect()
    }

    pub fn stats(&self, now: DateTime<Utc>) -> TaskStats {
        query::task_stats(&self.tasks, now)
    }

    /// Inserts a new task from a draft, assigning identity and bookkeeping
    /// fields. Drafts are expected to have passed validation already.
    pub fn create(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Task {
        let task = Task {
            id: self.bump_id(),
            title: draft.title,
            description: draft.description,
            category_id: draft.category_id,
            priority: draft.priority,
            completed: false,
            completed_at: None,
            due_date: draft.due_date,
            created_at: now,
            order: self.tasks.len() as i64 + 1,
            recurrence: draft.recurrence,
            time_tracking: None,
        };
        debug!("created task {} (id {})", task.title, task.id);
        self.tasks.push(task.clone());
        task
    }

    /// Applies a partial update. `completed_at` tracks completion
    /// transitions only: it is set when a task flips to completed and
    /// cleared when it flips back, never refreshed on a no-op write.
    pub fn update(&mut self, id: u64, patch: TaskPatch, now: DateTime<Utc>) -> Result<Task, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category_id) = patch.category_id {
            task.category_id = category_id;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(order) = patch.order {
            task.order = order;
        }
        if let Some(completed) = patch.completed {
            if completed != task.completed {
                task.completed = completed;
                task.completed_at = if completed { Some(now) } else { None };
            }
        }
        if patch.reset_time_tracking {
            task.time_tracking = None;
        }
        Ok(task.clone())
    }

    /// Writes a full task record back into the store. Used to commit the
    /// results of the pure timer functions.
    pub fn commit(&mut self, task: Task) -> Result<Task, StoreError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(StoreError::TaskNotFound(task.id))?;
        *slot = task.clone();
        Ok(task)
    }

    /// Removes a task. Templates are archived instead so their instances
    /// keep a resolvable `template_id`.
    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        if let Some(recurrence) = self.tasks[idx].recurrence.as_mut().filter(|r| r.is_template) {
            info!("archiving template {}", id);
            recurrence.archived = true;
            return Ok(());
        }
        self.tasks.remove(idx);
        Ok(())
    }

    pub fn reorder(&mut self, id: u64, new_order: i64) -> Result<Task, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        task.order = new_order;
        Ok(task.clone())
    }

    /// Inserts generated instances, assigning each a fresh id and the next
    /// manual order slot. Returns the inserted records.
    pub fn insert_instances(&mut self, instances: Vec<Task>) -> Vec<Task> {
        let mut inserted = Vec::with_capacity(instances.len());
        for mut instance in instances {
            instance.id = self.bump_id();
            instance.order = self.tasks.len() as i64 + 1;
            self.tasks.push(instance.clone());
            inserted.push(instance);
        }
        inserted
    }

    fn bump_id(&mut self) -> u64 {
        // Default-constructed stores start handing out ids at 1.
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// In-memory category collection. Tasks reference categories weakly by id;
/// deleting a category never touches the tasks.
#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    categories: Vec<Category>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// A store preloaded with the embedded fixture data.
    pub fn seeded() -> Self {
        let categories = match serde_json::from_str(SEED_CATEGORIES) {
            Ok(categories) => categories,
            Err(err) => {
                warn!("failed to parse embedded category fixtures: {}", err);
                Vec::new()
            }
        };
        Self { categories }
    }

    pub fn all(&self) -> Vec<Category> {
        self.categories.clone()
    }

    pub fn get(&self, id: u64) -> Result<Category, StoreError> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::CategoryNotFound(id))
    }

    pub fn create(&mut self, name: String, color: String, icon: String) -> Category {
        let category = Category {
            id: self.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            name,
            color,
            icon,
            task_count: 0,
        };
        self.categories.push(category.clone());
        category
    }

    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let len_before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == len_before {
            return Err(StoreError::CategoryNotFound(id));
        }
        Ok(())
    }

    /// Recomputes the derived per-category task counts from a task
    /// snapshot. Archived templates are not counted.
    pub fn refresh_task_counts(&mut self, tasks: &[Task]) {
        for category in self.categories.iter_mut() {
            category.task_count = tasks
                .iter()
                .filter(|t| t.category_id == Some(category.id) && !t.is_archived())
                .count() as u32;
        }
    }
}
