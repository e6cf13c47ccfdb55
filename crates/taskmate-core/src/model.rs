use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use time::OffsetDateTime;

use crate::id::TaskId;

/// Categories offered by the task form. The model itself accepts any label.
pub const SUGGESTED_CATEGORIES: [&str; 6] =
    ["General", "Work", "Personal", "Health", "Learning", "Shopping"];

/// Category assigned when the caller leaves it blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Error returned when parsing one of the closed vocabularies fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: {token}")]
pub struct ParseEnumError {
    /// Vocabulary that was being parsed.
    pub kind: &'static str,
    /// Offending input.
    pub token: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, token: &str) -> Self {
        Self {
            kind,
            token: token.to_owned(),
        }
    }
}

fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default urgency.
    #[default]
    Medium,
    /// Do first.
    High,
}

impl Priority {
    /// Sort weight; higher is more urgent.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// String representation used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError::new("priority", s)),
        }
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Not started.
    #[default]
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl Status {
    /// String representation used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Whether the status counts as finished.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Status reached by the quick toggle: completed tasks reopen as todo,
    /// everything else completes.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Todo,
            Self::Todo | Self::InProgress => Self::Completed,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "todo" => Ok(Self::Todo),
            "in-progress" | "inprogress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

/// A single unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, immutable after creation.
    pub id: TaskId,
    /// Display name.
    pub title: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Free-text label, usually one of [`SUGGESTED_CATEGORIES`].
    #[serde(default)]
    pub category: String,
    /// Urgency.
    #[serde(default)]
    pub priority: Priority,
    /// Workflow status.
    #[serde(default)]
    pub status: Status,
    /// Optional deadline.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification instant.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Labels in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// Create a todo task stamped with `now`.
    #[must_use]
    pub fn new(title: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            category: DEFAULT_CATEGORY.to_owned(),
            priority: Priority::default(),
            status: Status::default(),
            due_date: None,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }

    /// Refresh `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now.max(self.created_at);
    }

    /// Whether the task has a due date strictly before `now` and is not completed.
    #[must_use]
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.status.is_completed() && self.due_date.is_some_and(|due| due < now)
    }
}

/// Two-valued theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Default.
    #[default]
    Light,
    /// Dark mode.
    Dark,
}

impl Theme {
    /// Stored literal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Decode a stored value; anything other than `"dark"` is light.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Convenience flag for renderers.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseEnumError::new("theme", s)),
        }
    }
}

/// User-level preferences stored with the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Preferred theme.
    #[serde(default)]
    pub theme: Theme,
    /// Whether reminders are enabled.
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

const fn default_notifications() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            notifications: true,
        }
    }
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Optional avatar URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Preferences.
    #[serde(default)]
    pub preferences: Preferences,
}
