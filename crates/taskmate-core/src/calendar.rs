//! Month grid layout for a calendar view.

use serde::Serialize;
use thiserror::Error;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::date::{self, local_date, month_from_index};
use crate::model::Task;

/// Errors raised while laying out a month.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// Month index outside `0..=11`.
    #[error("invalid month index {0} (expected 0-11)")]
    InvalidMonth(u8),
    /// Year outside the supported calendar range.
    #[error("year {0} is out of range")]
    YearOutOfRange(i32),
}

const MIN_YEAR: i32 = Date::MIN.year();
const MAX_YEAR: i32 = Date::MAX.year();

/// The month currently displayed. `month0` is 0-based (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MonthCursor {
    year: i32,
    month0: u8,
}

impl MonthCursor {
    /// Create a cursor, rejecting month indices above 11.
    ///
    /// # Errors
    /// Returns [`CalendarError::InvalidMonth`] for an out-of-range month and
    /// [`CalendarError::YearOutOfRange`] for a year `time::Date` cannot hold.
    pub const fn new(year: i32, month0: u8) -> Result<Self, CalendarError> {
        if month0 > 11 {
            return Err(CalendarError::InvalidMonth(month0));
        }
        if !matches!(year, MIN_YEAR..=MAX_YEAR) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        Ok(Self { year, month0 })
    }

    /// Cursor for the month containing `date`.
    #[must_use]
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month0: u8::from(date.month()) - 1,
        }
    }

    /// Displayed year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Displayed month, 0-based.
    #[must_use]
    pub const fn month0(self) -> u8 {
        self.month0
    }

    /// English month name.
    #[must_use]
    pub fn name(self) -> &'static str {
        date::month_name(self.month0).unwrap_or_default()
    }

    /// The following month; December rolls over to January of the next year.
    /// The last supported month stays put.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month0 == 11 {
            if self.year >= MAX_YEAR {
                return self;
            }
            Self {
                year: self.year + 1,
                month0: 0,
            }
        } else {
            Self {
                year: self.year,
                month0: self.month0 + 1,
            }
        }
    }

    /// The preceding month; January rolls back to December of the previous year.
    /// The first supported month stays put.
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month0 == 0 {
            if self.year <= MIN_YEAR {
                return self;
            }
            Self {
                year: self.year - 1,
                month0: 11,
            }
        } else {
            Self {
                year: self.year,
                month0: self.month0 - 1,
            }
        }
    }
}

/// One day of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// Day of month, starting at 1.
    pub day: u8,
    /// Calendar date of the cell.
    pub date: Date,
    /// The cell is the current date.
    pub is_today: bool,
    /// The cell is the selected date.
    pub is_selected: bool,
    /// At least one task due that day is completed.
    pub has_completed: bool,
    /// At least one task due that day is not completed.
    pub has_pending: bool,
}

/// Computed layout of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridModel {
    /// Month shown by the grid.
    pub cursor: MonthCursor,
    /// 28 to 31.
    pub days_in_month: u8,
    /// Leading blank cells (0 = month starts on Sunday).
    pub first_weekday_offset: u8,
    /// One cell per day, in order.
    pub days: Vec<DayCell>,
}

impl GridModel {
    /// Lay out `month0` of `year` and flag each day against `tasks`.
    ///
    /// `today` is the date at the moment of rendering; `offset` maps task
    /// due instants onto calendar days.
    ///
    /// # Errors
    /// Returns an error when the month index is above 11 or the year is outside
    /// the supported range.
    pub fn build(
        year: i32,
        month0: u8,
        tasks: &[Task],
        selected: Option<Date>,
        today: Date,
        offset: UtcOffset,
    ) -> Result<Self, CalendarError> {
        let cursor = MonthCursor::new(year, month0)?;
        let month = month_from_index(month0).ok_or(CalendarError::InvalidMonth(month0))?;
        let days_in_month =
            date::days_in_month(year, month0).ok_or(CalendarError::YearOutOfRange(year))?;
        let first_weekday_offset =
            date::first_weekday_offset(year, month0).ok_or(CalendarError::YearOutOfRange(year))?;

        let dated: Vec<(Date, bool)> = tasks
            .iter()
            .filter_map(|task| {
                task.due_date
                    .map(|due| (local_date(due, offset), task.status.is_completed()))
            })
            .filter(|(due, _)| due.year() == year && due.month() == month)
            .collect();

        let mut days = Vec::with_capacity(usize::from(days_in_month));
        for day in 1..=days_in_month {
            let date = Date::from_calendar_date(year, month, day)
                .map_err(|_| CalendarError::YearOutOfRange(year))?;
            let mut cell = DayCell {
                day,
                date,
                is_today: date == today,
                is_selected: selected == Some(date),
                has_completed: false,
                has_pending: false,
            };
            for &(_, completed) in dated.iter().filter(|(due, _)| *due == date) {
                if completed {
                    cell.has_completed = true;
                } else {
                    cell.has_pending = true;
                }
            }
            days.push(cell);
        }

        Ok(Self {
            cursor,
            days_in_month,
            first_weekday_offset,
            days,
        })
    }

    /// Build the grid for the month a [`MonthCursor`] points at.
    ///
    /// # Errors
    /// Returns an error when the cursor's year is outside the supported range.
    pub fn for_cursor(
        cursor: MonthCursor,
        tasks: &[Task],
        selected: Option<Date>,
        today: Date,
        offset: UtcOffset,
    ) -> Result<Self, CalendarError> {
        Self::build(cursor.year(), cursor.month0(), tasks, selected, today, offset)
    }

    /// Week rows of seven slots; `None` marks leading or trailing padding.
    #[must_use]
    pub fn rows(&self) -> Vec<[Option<DayCell>; 7]> {
        let leading = usize::from(self.first_weekday_offset);
        let slots: Vec<Option<DayCell>> = std::iter::repeat_n(None, leading)
            .chain(self.days.iter().copied().map(Some))
            .collect();
        slots
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                for (slot, cell) in row.iter_mut().zip(chunk) {
                    *slot = *cell;
                }
                row
            })
            .collect()
    }

    /// Tasks due on `date`, as listed under the grid when a day is selected.
    #[must_use]
    pub fn tasks_on(tasks: &[Task], date: Date, offset: UtcOffset) -> Vec<Task> {
        crate::stats::due_on(tasks, date, offset)
    }
}

/// Today's calendar date as seen from `offset`.
#[must_use]
pub fn today(now: OffsetDateTime, offset: UtcOffset) -> Date {
    local_date(now, offset)
}
