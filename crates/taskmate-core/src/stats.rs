use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::date::is_same_day;
use crate::model::Task;
use crate::query::{SortKey, sort_tasks};

/// Aggregate counters over a task collection. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Tasks in the completed status.
    pub completed: usize,
    /// `total - completed`.
    pub pending: usize,
    /// Not completed and due strictly before `now`.
    pub overdue: usize,
}

impl TaskStats {
    /// Single pass over `tasks`; `now` is the reference instant for overdue.
    #[must_use]
    pub fn compute(tasks: &[Task], now: OffsetDateTime) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            if task.status.is_completed() {
                stats.completed += 1;
            } else if task.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        stats.pending = stats.total - stats.completed;
        stats
    }

    /// Completed share as a whole percentage; 0 for an empty collection.
    #[must_use]
    pub fn completion_rate(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let rate = self.completed.saturating_mul(100) / self.total;
        u8::try_from(rate).unwrap_or(100)
    }
}

/// Tasks due on `date` in `offset`, in input order.
#[must_use]
pub fn due_on(tasks: &[Task], date: Date, offset: UtcOffset) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.due_date.is_some_and(|due| is_same_day(due, date, offset)))
        .cloned()
        .collect()
}

/// Up to `limit` open tasks, earliest deadline first, undated last.
#[must_use]
pub fn upcoming(tasks: &[Task], limit: usize) -> Vec<Task> {
    let open: Vec<Task> = tasks
        .iter()
        .filter(|task| !task.status.is_completed())
        .cloned()
        .collect();
    let mut sorted = sort_tasks(&open, SortKey::DueDate);
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::model::Status;
    use time::macros::{date, datetime};

    fn task(id: &str, status: Status, due: Option<OffsetDateTime>) -> Task {
        let mut task = Task::new(id, datetime!(2024-01-01 00:00 UTC));
        task.id = TaskId::from(id);
        task.status = status;
        task.due_date = due;
        task
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_status() {
        let now = datetime!(2024-03-10 00:00 UTC);
        let yesterday = Some(datetime!(2024-03-09 00:00 UTC));

        let open = task("open", Status::Todo, yesterday);
        let done = task("done", Status::Completed, yesterday);
        let undated = task("undated", Status::Todo, None);
        let undated_done = task("undated-done", Status::Completed, None);

        assert!(open.is_overdue(now));
        assert!(!done.is_overdue(now));
        assert!(!undated.is_overdue(now));
        assert!(!undated_done.is_overdue(now));

        let stats = TaskStats::compute(&[open, done, undated, undated_done], now);
        assert_eq!(
            stats,
            TaskStats {
                total: 4,
                completed: 2,
                pending: 2,
                overdue: 1,
            }
        );
    }

    #[test]
    fn due_exactly_now_is_not_overdue() {
        let now = datetime!(2024-03-10 12:00 UTC);
        let task = task("edge", Status::InProgress, Some(now));
        assert!(!task.is_overdue(now));
        assert_eq!(TaskStats::compute(&[task], now).overdue, 0);
    }

    #[test]
    fn empty_collection_has_zero_stats() {
        let stats = TaskStats::compute(&[], datetime!(2024-03-10 00:00 UTC));
        assert_eq!(stats, TaskStats::default());
        assert_eq!(stats.completion_rate(), 0);
    }

    #[test]
    fn completion_rate_rounds_down() {
        let now = datetime!(2024-03-10 00:00 UTC);
        let tasks = [
            task("a", Status::Completed, None),
            task("b", Status::Todo, None),
            task("c", Status::Todo, None),
        ];
        assert_eq!(TaskStats::compute(&tasks, now).completion_rate(), 33);
    }

    #[test]
    fn due_on_matches_calendar_day() {
        let tasks = [
            task("morning", Status::Todo, Some(datetime!(2024-03-10 08:00 UTC))),
            task("night", Status::Completed, Some(datetime!(2024-03-10 23:59 UTC))),
            task("next", Status::Todo, Some(datetime!(2024-03-11 00:00 UTC))),
            task("none", Status::Todo, None),
        ];
        let ids: Vec<String> = due_on(&tasks, date!(2024-03-10), UtcOffset::UTC)
            .into_iter()
            .map(|task| task.id.to_string())
            .collect();
        assert_eq!(ids, vec!["morning", "night"]);
    }

    #[test]
    fn upcoming_skips_completed_and_truncates() {
        let tasks = [
            task("undated", Status::Todo, None),
            task("later", Status::Todo, Some(datetime!(2024-05-01 00:00 UTC))),
            task("done", Status::Completed, Some(datetime!(2024-01-02 00:00 UTC))),
            task("soon", Status::InProgress, Some(datetime!(2024-04-01 00:00 UTC))),
        ];
        let ids: Vec<String> = upcoming(&tasks, 2)
            .into_iter()
            .map(|task| task.id.to_string())
            .collect();
        assert_eq!(ids, vec!["soon", "later"]);
    }
}
