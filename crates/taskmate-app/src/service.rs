use taskmate_core::{Board, BoardAction, SortKey, StatusFilter, Task, TaskId, TaskStats};
use taskmate_store::KeyValueStore;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::task_patch::{TaskDraft, TaskPatch};
use crate::task_repository::{OwnerId, TaskRepository};
use crate::validation::{ValidationError, validate_title};

/// Whether the collection reached the store after an in-memory change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The store holds the new collection.
    Saved,
    /// The store write failed; the in-memory board still has the change.
    Failed,
}

/// Result of a mutation addressed at a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    /// The board changed.
    Changed {
        /// Value produced by the mutation.
        value: T,
        /// Outcome of writing the collection back.
        persisted: PersistOutcome,
    },
    /// No task had the given id; nothing changed and nothing was written.
    NoOp,
}

impl<T> Applied<T> {
    /// Value of a successful change.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Self::Changed { value, .. } => Some(value),
            Self::NoOp => None,
        }
    }

    /// Returns true when nothing changed.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Service façade owning one owner's board and writing it through to the store.
///
/// Every mutation updates the in-memory board first, then replaces the stored
/// collection. Writes are serialized by the board lock so the store always
/// ends up with the last snapshot.
pub struct TaskService<S> {
    repo: TaskRepository<S>,
    owner: OwnerId,
    board: Mutex<Board>,
}

impl<S> TaskService<S> {
    /// Service with an empty board; call [`TaskService::load`] to fill it.
    pub fn new(repo: TaskRepository<S>, owner: OwnerId) -> Self {
        Self {
            repo,
            owner,
            board: Mutex::new(Board::default()),
        }
    }

    /// Owner whose collection this service manages.
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Underlying repository.
    pub const fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }
}

impl<S: KeyValueStore> TaskService<S> {
    /// Replace the board's tasks with the stored collection.
    ///
    /// A failed load is logged and leaves an empty board. Returns the number
    /// of tasks loaded.
    pub async fn load(&self) -> usize {
        let tasks = match self.repo.load_all(&self.owner).await {
            Ok(tasks) => tasks,
            Err(err) => {
                error!(owner = %self.owner, error = %err, "Failed to load tasks");
                Vec::new()
            }
        };
        let count = tasks.len();
        self.dispatch(BoardAction::SetTasks(tasks)).await;
        count
    }

    /// Create a task from `draft`.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] when the title is blank; the
    /// board is left untouched.
    pub async fn add(
        &self,
        draft: TaskDraft,
        now: OffsetDateTime,
    ) -> Result<Applied<Task>, ValidationError> {
        validate_title(&draft.title)?;
        let task = draft.into_task(now);
        let mut board = self.board.lock().await;
        *board = std::mem::take(&mut *board).apply(BoardAction::Add(task.clone()));
        let persisted = self.persist(&board).await;
        debug!(id = %task.id, "Added task");
        Ok(Applied::Changed {
            value: task,
            persisted,
        })
    }

    /// Edit the task with `id`.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] when the patch blanks the title.
    pub async fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
        now: OffsetDateTime,
    ) -> Result<Applied<Task>, ValidationError> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        Ok(self.modify(id, |task| patch.apply_to(task, now)).await)
    }

    /// Flip the task between completed and to-do.
    pub async fn toggle(&self, id: &TaskId, now: OffsetDateTime) -> Applied<Task> {
        self.modify(id, |task| {
            let mut next = task.clone();
            next.status = next.status.toggled();
            next.touch(now);
            next
        })
        .await
    }

    /// Remove the task with `id`.
    pub async fn delete(&self, id: &TaskId) -> Applied<Task> {
        let mut board = self.board.lock().await;
        let Some(removed) = board.get(id).cloned() else {
            warn!(%id, "Delete ignored: unknown task");
            return Applied::NoOp;
        };
        *board = std::mem::take(&mut *board).apply(BoardAction::Delete(id.clone()));
        let persisted = self.persist(&board).await;
        debug!(%id, "Deleted task");
        Applied::Changed {
            value: removed,
            persisted,
        }
    }

    /// Drop every task of the owner.
    pub async fn clear(&self) -> PersistOutcome {
        let mut board = self.board.lock().await;
        *board = std::mem::take(&mut *board).apply(BoardAction::SetTasks(Vec::new()));
        self.persist(&board).await
    }

    /// Change the status facet of [`TaskService::visible`].
    pub async fn set_status_filter(&self, status: StatusFilter) {
        self.dispatch(BoardAction::SetStatusFilter(status)).await;
    }

    /// Change the ordering of [`TaskService::visible`].
    pub async fn set_sort(&self, sort: SortKey) {
        self.dispatch(BoardAction::SetSort(sort)).await;
    }

    /// Change the free-text query of [`TaskService::visible`].
    pub async fn set_search(&self, search: impl Into<String>) {
        self.dispatch(BoardAction::SetSearch(search.into())).await;
    }

    /// Tasks after search, status filter and sort.
    pub async fn visible(&self) -> Vec<Task> {
        self.board.lock().await.visible()
    }

    /// Task with `id`, if present.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.board.lock().await.get(id).cloned()
    }

    /// Counters over the whole collection.
    pub async fn stats(&self, now: OffsetDateTime) -> TaskStats {
        self.board.lock().await.stats(now)
    }

    /// Copy of the current board.
    pub async fn snapshot(&self) -> Board {
        self.board.lock().await.clone()
    }

    async fn modify<F>(&self, id: &TaskId, edit: F) -> Applied<Task>
    where
        F: FnOnce(&Task) -> Task,
    {
        let mut board = self.board.lock().await;
        let Some(current) = board.get(id) else {
            warn!(%id, "Update ignored: unknown task");
            return Applied::NoOp;
        };
        let next = edit(current);
        *board = std::mem::take(&mut *board).apply(BoardAction::Update(next.clone()));
        let persisted = self.persist(&board).await;
        debug!(%id, status = %next.status, "Updated task");
        Applied::Changed {
            value: next,
            persisted,
        }
    }

    async fn dispatch(&self, action: BoardAction) {
        let mut board = self.board.lock().await;
        *board = std::mem::take(&mut *board).apply(action);
    }

    async fn persist(&self, board: &Board) -> PersistOutcome {
        match self.repo.replace_all(board.tasks(), &self.owner).await {
            Ok(()) => PersistOutcome::Saved,
            Err(err) => {
                error!(owner = %self.owner, error = %err, "Failed to save tasks");
                PersistOutcome::Failed
            }
        }
    }
}
