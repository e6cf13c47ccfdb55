//! Domain types, queries and calendar layout for taskmate.
//!
//! Everything in this crate is synchronous and free of I/O; callers pass the
//! current instant explicitly so results are deterministic.

/// Session snapshot and its transitions.
pub mod board;
/// Month grid layout.
pub mod calendar;
/// Calendar date primitives.
pub mod date;
/// Identifier types.
pub mod id;
/// Task, user and preference records.
pub mod model;
/// Search, filter and sort.
pub mod query;
/// Aggregate counters and dashboard selections.
pub mod stats;

pub use board::{Board, BoardAction};
pub use calendar::{CalendarError, DayCell, GridModel, MonthCursor};
pub use id::TaskId;
pub use model::{ParseEnumError, Preferences, Priority, Status, Task, Theme, User};
pub use query::{SortKey, StatusFilter, TaskQuery, TextMatcher, query};
pub use stats::TaskStats;
