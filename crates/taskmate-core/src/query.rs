//! Search, filter and sort over an in-memory task collection.
//!
//! Every function here is pure: inputs are borrowed, outputs are fresh
//! vectors, and the caller's slice is never reordered.

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_provider::DataLocale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

use crate::model::{ParseEnumError, Priority, Status, Task};

/// Case-insensitive substring matcher for task fields.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Lower-case a query string into a matcher. Returns `None` for blank
    /// inputs; surrounding whitespace is otherwise part of the needle.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// Whether title, description, category or any tag contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
            || self.matches_field(&task.description)
            || self.matches_field(&task.category)
            || task.tags.iter().any(|tag| self.matches_field(tag))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

/// Status facet of the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    /// No filtering.
    #[default]
    All,
    /// Only tasks with exactly this status.
    Only(Status),
}

impl StatusFilter {
    /// Whether the task passes the filter.
    #[must_use]
    pub fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => task.status == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        value.to_string()
    }
}

impl FromStr for StatusFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Ordering applied to the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Earliest deadline first, undated tasks last.
    #[default]
    DueDate,
    /// Highest priority first.
    Priority,
    /// Newest first.
    Created,
    /// Title, collated case-insensitively.
    Alphabetical,
}

impl SortKey {
    /// String representation used on the command line and in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "due-date",
            Self::Priority => "priority",
            Self::Created => "created",
            Self::Alphabetical => "alphabetical",
        }
    }

    /// Comparator for this key. Equal keys compare `Equal` so a stable sort
    /// keeps input order.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::DueDate => compare_due_dates(a, b),
            Self::Priority => b.priority.weight().cmp(&a.priority.weight()),
            Self::Created => b.created_at.cmp(&a.created_at),
            Self::Alphabetical => compare_titles(&a.title, &b.title),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "due-date" | "duedate" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "created" => Ok(Self::Created),
            "alphabetical" | "title" => Ok(Self::Alphabetical),
            _ => Err(ParseEnumError {
                kind: "sort key",
                token: s.to_owned(),
            }),
        }
    }
}

fn compare_due_dates(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

thread_local! {
    static TITLE_COLLATOR: Option<Collator> = title_collator();
}

// Secondary strength: accents count, case does not.
fn title_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(&DataLocale::default(), options).ok()
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    TITLE_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    })
}

/// Parameters of a task list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Free-text query; blank matches everything.
    pub search: String,
    /// Status facet.
    pub status: StatusFilter,
    /// Exact category facet.
    pub category: Option<String>,
    /// Exact priority facet.
    pub priority: Option<Priority>,
    /// Ordering of the result.
    pub sort: SortKey,
}

impl TaskQuery {
    /// Query that only sorts.
    #[must_use]
    pub fn sorted_by(sort: SortKey) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    /// Set the free-text query.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set the status facet.
    #[must_use]
    pub const fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Set the category facet.
    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Set the priority facet.
    #[must_use]
    pub const fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    fn admits_facets(&self, task: &Task) -> bool {
        self.category.as_deref().is_none_or(|category| task.category == category)
            && self.priority.is_none_or(|priority| task.priority == priority)
    }
}

/// Run search, then the status filter, then the remaining facets, then sort.
#[must_use]
pub fn query(tasks: &[Task], params: &TaskQuery) -> Vec<Task> {
    let matcher = TextMatcher::new(&params.search);
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| matcher.as_ref().is_none_or(|m| m.matches(task)))
        .filter(|task| params.status.admits(task))
        .filter(|task| params.admits_facets(task))
        .cloned()
        .collect();
    selected.sort_by(|a, b| params.sort.compare(a, b));
    selected
}

/// Tasks matching the free-text query, in input order.
#[must_use]
pub fn search(tasks: &[Task], text: &str) -> Vec<Task> {
    let Some(matcher) = TextMatcher::new(text) else {
        return tasks.to_vec();
    };
    tasks.iter().filter(|task| matcher.matches(task)).cloned().collect()
}

/// Tasks admitted by the status filter, in input order.
#[must_use]
pub fn filter_status(tasks: &[Task], status: StatusFilter) -> Vec<Task> {
    tasks.iter().filter(|task| status.admits(task)).cloned().collect()
}

/// Stable sort into a new vector.
#[must_use]
pub fn sort_tasks(tasks: &[Task], key: SortKey) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(tasks: &[Task]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for task in tasks {
        if !seen.iter().any(|category| category == &task.category) {
            seen.push(task.category.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use time::OffsetDateTime;
    use time::macros::datetime;

    fn task(id: &str, title: &str) -> Task {
        let mut task = Task::new(title, datetime!(2024-01-01 09:00 UTC));
        task.id = TaskId::from(id);
        task
    }

    fn due(mut task: Task, at: OffsetDateTime) -> Task {
        task.due_date = Some(at);
        task
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn matcher_skips_blank_queries() {
        assert!(TextMatcher::new("").is_none());
        assert!(TextMatcher::new("   ").is_none());
        assert!(TextMatcher::new("\n").is_none());
    }

    #[test]
    fn matcher_finds_text_across_fields() {
        let mut subject = task("a", "Quarterly Report");
        subject.description = "Summarise revenue".into();
        subject.category = "Work".into();
        subject.tags = vec!["Finance".into()];

        for needle in ["report", "REVENUE", "work", "finance", "nan"] {
            let matcher = TextMatcher::new(needle)
                .unwrap_or_else(|| panic!("matcher must exist for queries with content"));
            assert!(matcher.matches(&subject), "{needle} should match");
        }
        let missing =
            TextMatcher::new("health").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(!missing.matches(&subject));
    }

    #[test]
    fn matcher_keeps_surrounding_whitespace() {
        let milk = task("milk", "Buy milk");
        assert!(search(&[milk.clone()], "milk ").is_empty());
        assert_eq!(ids(&search(&[milk.clone()], "MILK")), vec!["milk"]);
        assert_eq!(ids(&search(&[milk], " milk")), vec!["milk"]);
    }

    #[test]
    fn due_date_sort_places_undated_tasks_last() {
        let a = due(task("a", "A"), datetime!(2024-01-01 00:00 UTC));
        let b = due(task("b", "B"), datetime!(2024-06-01 00:00 UTC));
        let c = task("c", "C");
        let d = task("d", "D");

        let sorted = sort_tasks(&[c.clone(), b.clone(), d.clone(), a.clone()], SortKey::DueDate);
        assert_eq!(ids(&sorted), vec!["a", "b", "c", "d"]);

        let sorted = sort_tasks(&[d, a, c, b], SortKey::DueDate);
        assert_eq!(ids(&sorted), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn priority_sort_is_descending_and_stable() {
        let mut low = task("low", "x");
        low.priority = Priority::Low;
        let mut high1 = task("high1", "x");
        high1.priority = Priority::High;
        let mut high2 = task("high2", "x");
        high2.priority = Priority::High;
        let medium = task("medium", "x");

        let sorted = sort_tasks(&[low, high1, medium, high2], SortKey::Priority);
        assert_eq!(ids(&sorted), vec!["high1", "high2", "medium", "low"]);
    }

    #[test]
    fn created_sort_is_newest_first() {
        let mut old = task("old", "x");
        old.created_at = datetime!(2023-01-01 00:00 UTC);
        let mut new = task("new", "x");
        new.created_at = datetime!(2024-05-01 00:00 UTC);
        let sorted = sort_tasks(&[old, new], SortKey::Created);
        assert_eq!(ids(&sorted), vec!["new", "old"]);
    }

    #[test]
    fn alphabetical_sort_ignores_case() {
        let sorted = sort_tasks(
            &[task("1", "banana"), task("2", "Apple"), task("3", "cherry")],
            SortKey::Alphabetical,
        );
        assert_eq!(ids(&sorted), vec!["2", "1", "3"]);
    }

    #[test]
    fn alphabetical_sort_keeps_input_order_for_case_variants() {
        let sorted = sort_tasks(
            &[task("lower", "apple"), task("upper", "Apple")],
            SortKey::Alphabetical,
        );
        assert_eq!(ids(&sorted), vec!["lower", "upper"]);

        let sorted = sort_tasks(
            &[task("upper", "Apple"), task("lower", "apple")],
            SortKey::Alphabetical,
        );
        assert_eq!(ids(&sorted), vec!["upper", "lower"]);
    }

    #[test]
    fn alphabetical_sort_collates_accented_titles() {
        let sorted = sort_tasks(
            &[task("z", "zebra"), task("e", "\u{e9}clair"), task("a", "apple")],
            SortKey::Alphabetical,
        );
        assert_eq!(ids(&sorted), vec!["a", "e", "z"]);
    }

    #[test]
    fn query_applies_search_then_status_then_sort() {
        let mut done = due(task("done", "Pay rent"), datetime!(2024-02-01 00:00 UTC));
        done.status = Status::Completed;
        let open_late = due(task("late", "Pay taxes"), datetime!(2024-04-15 00:00 UTC));
        let open_early = due(task("early", "Pay gas bill"), datetime!(2024-03-01 00:00 UTC));
        let unrelated = task("walk", "Walk the dog");
        let tasks = vec![done, open_late, unrelated, open_early];

        let params = TaskQuery::sorted_by(SortKey::DueDate)
            .with_search("Pay ")
            .with_status(StatusFilter::Only(Status::Todo));
        assert_eq!(ids(&query(&tasks, &params)), vec!["early", "late"]);

        let everything = query(&tasks, &TaskQuery::default());
        assert_eq!(everything.len(), tasks.len());
        assert_eq!(ids(&tasks), vec!["done", "late", "walk", "early"]);
    }

    #[test]
    fn category_and_priority_facets_narrow_results() {
        let mut work = task("work", "Deck");
        work.category = "Work".into();
        work.priority = Priority::High;
        let mut home = task("home", "Laundry");
        home.category = "Personal".into();
        let tasks = vec![work, home];

        let params = TaskQuery::default().with_category(Some("Work".into()));
        assert_eq!(ids(&query(&tasks, &params)), vec!["work"]);

        let params = TaskQuery::default().with_priority(Some(Priority::Medium));
        assert_eq!(ids(&query(&tasks, &params)), vec!["home"]);
    }

    #[test]
    fn empty_collection_yields_empty_result() {
        assert!(query(&[], &TaskQuery::sorted_by(SortKey::Priority)).is_empty());
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let mut a = task("a", "x");
        a.category = "Work".into();
        let mut b = task("b", "x");
        b.category = "Health".into();
        let mut c = task("c", "x");
        c.category = "Work".into();
        assert_eq!(categories(&[a, b, c]), vec!["Work".to_owned(), "Health".to_owned()]);
    }

    #[test]
    fn parses_cli_tokens() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "in-progress".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(Status::InProgress))
        );
        assert_eq!("dueDate".parse::<SortKey>(), Ok(SortKey::DueDate));
        assert_eq!("due_date".parse::<SortKey>(), Ok(SortKey::DueDate));
        assert!("random".parse::<SortKey>().is_err());
    }
}
