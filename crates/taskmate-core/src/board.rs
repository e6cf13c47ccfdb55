//! Immutable snapshot of a task list session and the transitions on it.

use serde::Serialize;
use time::OffsetDateTime;

use crate::id::TaskId;
use crate::model::Task;
use crate::query::{SortKey, StatusFilter, TaskQuery, query};
use crate::stats::TaskStats;

/// Named state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardAction {
    /// Replace the whole collection (initial load, refresh).
    SetTasks(Vec<Task>),
    /// Append a task.
    Add(Task),
    /// Replace the task with the same id; unknown ids are ignored.
    Update(Task),
    /// Remove a task; unknown ids are ignored.
    Delete(TaskId),
    /// Change the status facet.
    SetStatusFilter(StatusFilter),
    /// Change the ordering.
    SetSort(SortKey),
    /// Change the free-text query.
    SetSearch(String),
}

/// Task collection plus the list settings shown alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    tasks: Vec<Task>,
    status: StatusFilter,
    sort: SortKey,
    search: String,
}

impl Board {
    /// Board holding `tasks` with default list settings.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    /// Apply a transition, producing the next snapshot.
    #[must_use]
    pub fn apply(self, action: BoardAction) -> Self {
        match action {
            BoardAction::SetTasks(tasks) => Self { tasks, ..self },
            BoardAction::Add(task) => {
                let mut tasks = self.tasks;
                tasks.push(task);
                Self { tasks, ..self }
            }
            BoardAction::Update(task) => {
                let tasks = self
                    .tasks
                    .into_iter()
                    .map(|existing| if existing.id == task.id { task.clone() } else { existing })
                    .collect();
                Self { tasks, ..self }
            }
            BoardAction::Delete(id) => {
                let tasks = self.tasks.into_iter().filter(|task| task.id != id).collect();
                Self { tasks, ..self }
            }
            BoardAction::SetStatusFilter(status) => Self { status, ..self },
            BoardAction::SetSort(sort) => Self { sort, ..self },
            BoardAction::SetSearch(search) => Self { search, ..self },
        }
    }

    /// All tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Current status facet.
    #[must_use]
    pub const fn status_filter(&self) -> StatusFilter {
        self.status
    }

    /// Current ordering.
    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    /// Current free-text query.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The query described by the current settings.
    #[must_use]
    pub fn query(&self) -> TaskQuery {
        TaskQuery::sorted_by(self.sort)
            .with_search(self.search.clone())
            .with_status(self.status)
    }

    /// Tasks as the list screen shows them.
    #[must_use]
    pub fn visible(&self) -> Vec<Task> {
        query(&self.tasks, &self.query())
    }

    /// Counters over the whole collection, ignoring list settings.
    #[must_use]
    pub fn stats(&self, now: OffsetDateTime) -> TaskStats {
        TaskStats::compute(&self.tasks, now)
    }
}
