use std::cell::{Cell, RefCell};
use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{RoutineError, StorageError};
use crate::models::{Frequency, Occurrence, Task, TaskDraft, TaskPatch};
use crate::summary::TodaySummary;
use crate::today::today_occurrences;

/// Durable home of the task collection.
pub trait TaskRepository {
    /// Reads the whole collection. A missing slot is an empty collection.
    fn load(&self) -> Result<Vec<Task>, StorageError>;

    /// Replaces the stored collection.
    fn save(&self, tasks: &[Task]) -> Result<(), StorageError>;
}

/// Keeps the collection in memory. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tasks: RefCell<Vec<Task>>,
    saves: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        MemoryRepository {
            tasks: RefCell::new(tasks),
            ..Self::default()
        }
    }

    /// What the last successful save wrote.
    pub fn stored(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TaskRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.tasks.borrow().clone())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "storage unavailable",
            )));
        }
        *self.tasks.borrow_mut() = tasks.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// The task store: a single-writer collection backed by a repository.
///
/// Every mutation builds a new collection and swaps it in whole, so a
/// snapshot returned by [`Routine::tasks`] never changes under its holder.
/// Persistence runs after each swap; failures are logged and the in-memory
/// collection stays authoritative.
pub struct Routine<R: TaskRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    tasks: Arc<Vec<Task>>,
}

impl<R: TaskRepository, C: Clock> Routine<R, C> {
    /// Loads the collection, falling back to empty when the slot is unreadable.
    pub fn open(repo: R, clock: C) -> Self {
        let tasks = match repo.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(error = %e, "failed to load tasks, starting with an empty list");
                Vec::new()
            }
        };
        for t in tasks.iter().filter(|t| matches!(t.frequency, Frequency::Unknown(_))) {
            warn!(id = %t.id, title = %t.title, frequency = %t.frequency, "unrecognized frequency, task will occur every day");
        }
        debug!(count = tasks.len(), "tasks loaded");
        Routine {
            repo,
            clock,
            tasks: Arc::new(tasks),
        }
    }

    /// Current snapshot of the collection.
    pub fn tasks(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Finds a task by full id or by a prefix matching exactly one task.
    pub fn resolve_id(&self, prefix: &str) -> Option<String> {
        if let Some(t) = self.get(prefix) {
            return Some(t.id.clone());
        }
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(t), None) => Some(t.id.clone()),
            _ => None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Appends a task built from `draft`, returning its new id.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<String, RoutineError> {
        draft.validate()?;
        let id = Uuid::new_v4().to_string();
        let task = draft.into_task(id.clone(), self.clock.timestamp());
        debug!(id = %id, title = %task.title, "adding task");
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.extend(self.tasks.iter().cloned());
        next.push(task);
        self.replace(next);
        Ok(id)
    }

    /// Merges `patch` into the task with `id`. Returns false if there is none.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> bool {
        self.map_task(id, |t| patch.apply(t))
    }

    pub fn set_pinned(&mut self, id: &str, pinned: bool) -> bool {
        self.update_task(id, &TaskPatch { pinned: Some(pinned), ..Default::default() })
    }

    /// Flips today's completion: clears the marker if it is set for today,
    /// otherwise stamps today's date.
    pub fn toggle_completion(&mut self, id: &str) -> bool {
        let today = self.clock.today();
        self.map_task(id, |t| {
            let mut t = t.clone();
            t.last_completed_date = if t.is_completed_on(today) { None } else { Some(today) };
            t
        })
    }

    pub fn remove_task(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            debug!(id, "remove ignored, no such task");
            return false;
        }
        let next = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.replace(next);
        true
    }

    /// Clears the completion marker on every task.
    pub fn reset_all_completions(&mut self) {
        let next = self
            .tasks
            .iter()
            .map(|t| Task { last_completed_date: None, ..t.clone() })
            .collect();
        self.replace(next);
    }

    pub fn clear_all(&mut self) {
        self.replace(Vec::new());
    }

    /// Today's occurrences as of the store's clock.
    pub fn today_occurrences(&self) -> Vec<Occurrence> {
        today_occurrences(&self.tasks, self.clock.now())
    }

    pub fn summary(&self) -> TodaySummary {
        TodaySummary::from_occurrences(&self.today_occurrences())
    }

    fn map_task<F>(&mut self, id: &str, f: F) -> bool
    where
        F: Fn(&Task) -> Task,
    {
        if self.get(id).is_none() {
            debug!(id, "update ignored, no such task");
            return false;
        }
        let next = self
            .tasks
            .iter()
            .map(|t| if t.id == id { f(t) } else { t.clone() })
            .collect();
        self.replace(next);
        true
    }

    fn replace(&mut self, next: Vec<Task>) {
        self.tasks = Arc::new(next);
        debug!(count = self.tasks.len(), "collection replaced");
        if let Err(e) = self.repo.save(&self.tasks) {
            error!(error = %e, "failed to persist tasks");
        }
    }
}
