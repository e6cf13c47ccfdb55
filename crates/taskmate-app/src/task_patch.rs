use taskmate_core::model::DEFAULT_CATEGORY;
use taskmate_core::{Priority, Status, Task};
use time::OffsetDateTime;

/// Append `tag` unless it is blank or already present. Returns whether it was added.
pub fn push_unique_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let trimmed = tag.trim();
    if trimmed.is_empty() || tags.iter().any(|existing| existing == trimmed) {
        return false;
    }
    tags.push(trimmed.to_owned());
    true
}

/// Fields of a task before it gets an id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Display name; must not be blank.
    pub title: String,
    /// Free text.
    pub description: String,
    /// Blank falls back to the default category.
    pub category: String,
    /// Urgency.
    pub priority: Priority,
    /// Initial status.
    pub status: Status,
    /// Optional deadline.
    pub due_date: Option<OffsetDateTime>,
    /// Labels, de-duplicated on entry.
    pub tags: Vec<String>,
}

impl TaskDraft {
    /// Draft with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Add tags the way the form does: trimmed, blanks and duplicates dropped.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for tag in tags {
            push_unique_tag(&mut self.tags, tag.as_ref());
        }
        self
    }

    /// Materialize the task with a fresh id, stamped at `now`.
    #[must_use]
    pub fn into_task(self, now: OffsetDateTime) -> Task {
        let mut task = Task::new(self.title.trim(), now);
        task.description = self.description;
        task.category = if self.category.trim().is_empty() {
            DEFAULT_CATEGORY.to_owned()
        } else {
            self.category.trim().to_owned()
        };
        task.priority = self.priority;
        task.status = self.status;
        task.due_date = self.due_date;
        task.tags = self.tags;
        task
    }
}

/// Partial edit of an existing task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New status.
    pub status: Option<Status>,
    /// `Some(None)` clears the deadline.
    pub due_date: Option<Option<OffsetDateTime>>,
    /// Tags to append (de-duplicated).
    pub add_tags: Vec<String>,
    /// Tags to drop.
    pub remove_tags: Vec<String>,
}

impl TaskPatch {
    /// Returns true when applying the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.add_tags.is_empty()
            && self.remove_tags.is_empty()
    }

    /// Produce the edited copy of `task`, refreshing `updated_at`.
    #[must_use]
    pub fn apply_to(&self, task: &Task, now: OffsetDateTime) -> Task {
        let mut next = task.clone();
        if let Some(title) = &self.title {
            next.title = title.trim().to_owned();
        }
        if let Some(description) = &self.description {
            next.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            next.category = category.trim().to_owned();
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        next.tags.retain(|tag| !self.remove_tags.contains(tag));
        for tag in &self.add_tags {
            push_unique_tag(&mut next.tags, tag);
        }
        next.touch(now);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn draft_suppresses_duplicate_and_blank_tags() {
        let draft = TaskDraft::titled("Plan trip").with_tags(["travel", " travel ", "", "summer"]);
        assert_eq!(draft.tags, vec!["travel".to_owned(), "summer".to_owned()]);
    }

    #[test]
    fn draft_defaults_blank_category() {
        let task = TaskDraft::titled("  Stretch  ").into_task(datetime!(2024-03-10 07:00 UTC));
        assert_eq!(task.title, "Stretch");
        assert_eq!(task.category, "General");
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn patch_edits_fields_and_refreshes_updated_at() {
        let created = datetime!(2024-03-10 07:00 UTC);
        let mut task = TaskDraft::titled("Stretch").with_tags(["health"]).into_task(created);
        task.due_date = Some(datetime!(2024-03-11 07:00 UTC));

        let patch = TaskPatch {
            priority: Some(Priority::High),
            due_date: Some(None),
            add_tags: vec!["morning".into(), "health".into()],
            remove_tags: vec!["health".into()],
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
        let later = datetime!(2024-03-10 09:00 UTC);
        let edited = patch.apply_to(&task, later);

        assert_eq!(edited.id, task.id);
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.due_date, None);
        assert_eq!(edited.tags, vec!["morning".to_owned(), "health".to_owned()]);
        assert_eq!(edited.created_at, created);
        assert_eq!(edited.updated_at, later);
        assert!(TaskPatch::default().is_empty());
    }
}
