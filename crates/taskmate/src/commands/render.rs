use std::io::Write;

use anyhow::Result;
use taskmate_core::calendar::GridModel;
use taskmate_core::date::{WEEKDAY_LABELS, format_date, local_date};
use taskmate_core::{DayCell, Task, TaskStats, User};
use time::{OffsetDateTime, UtcOffset};

pub fn task_table<W: Write>(
    out: &mut W,
    tasks: &[Task],
    now: OffsetDateTime,
    offset: UtcOffset,
) -> Result<()> {
    writeln!(out, "ID | Status | Priority | Due | Category | Title | Tags")?;
    writeln!(out, "-- | ------ | -------- | --- | -------- | ----- | ----")?;
    for task in tasks {
        let due = task.due_date.map_or_else(
            || "-".to_owned(),
            |due| {
                let day = format_date(local_date(due, offset));
                if task.is_overdue(now) {
                    format!("{day} (overdue)")
                } else {
                    day
                }
            },
        );
        let tags = if task.tags.is_empty() {
            "-".to_owned()
        } else {
            task.tags.join(", ")
        };
        writeln!(
            out,
            "{} | {} | {} | {} | {} | {} | {}",
            task.id, task.status, task.priority, due, task.category, task.title, tags
        )?;
    }
    Ok(())
}

/// One line per task, used under dashboards and calendar selections.
pub fn task_lines<W: Write>(out: &mut W, tasks: &[Task], offset: UtcOffset) -> Result<()> {
    for task in tasks {
        let mark = if task.status.is_completed() { 'x' } else { ' ' };
        let due = task
            .due_date
            .map(|due| format!(" (due {})", format_date(local_date(due, offset))))
            .unwrap_or_default();
        writeln!(out, "  [{mark}] {} {}{due}", task.id, task.title)?;
    }
    Ok(())
}

pub fn stats<W: Write>(out: &mut W, stats: &TaskStats) -> Result<()> {
    writeln!(out, "Total:     {}", stats.total)?;
    writeln!(out, "Completed: {}", stats.completed)?;
    writeln!(out, "Pending:   {}", stats.pending)?;
    writeln!(out, "Overdue:   {}", stats.overdue)?;
    writeln!(out, "Done:      {}%", stats.completion_rate())?;
    Ok(())
}

pub fn profile<W: Write>(out: &mut W, user: &User) -> Result<()> {
    writeln!(out, "Name:          {}", user.name)?;
    writeln!(out, "Email:         {}", user.email)?;
    writeln!(out, "Theme:         {}", user.preferences.theme)?;
    let notifications = if user.preferences.notifications { "on" } else { "off" };
    writeln!(out, "Notifications: {notifications}")?;
    Ok(())
}

/// Month grid, four columns per day.
///
/// `@` marks today, `>` the selected day; a trailing `*` means something is
/// still pending that day and `+` means everything due was completed.
pub fn calendar<W: Write>(out: &mut W, grid: &GridModel) -> Result<()> {
    writeln!(out, "{} {}", grid.cursor.name(), grid.cursor.year())?;
    let header: Vec<String> = WEEKDAY_LABELS.iter().map(|label| format!("{label:>4}")).collect();
    writeln!(out, "{}", header.concat().trim_end())?;
    for row in grid.rows() {
        let line: String = row
            .iter()
            .map(|cell| cell.map_or_else(|| "    ".to_owned(), day_cell))
            .collect();
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

fn day_cell(cell: DayCell) -> String {
    let lead = if cell.is_selected {
        '>'
    } else if cell.is_today {
        '@'
    } else {
        ' '
    };
    let flag = if cell.has_pending {
        '*'
    } else if cell.has_completed {
        '+'
    } else {
        ' '
    };
    format!("{lead}{:>2}{flag}", cell.day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmate_core::Status;
    use time::macros::{date, datetime};

    fn rendered(grid: &GridModel) -> String {
        let mut buf = Vec::new();
        calendar(&mut buf, grid).unwrap_or_else(|err| panic!("render: {err}"));
        String::from_utf8(buf).unwrap_or_else(|err| panic!("utf8: {err}"))
    }

    #[test]
    fn february_leap_year_layout() {
        let grid = GridModel::build(2024, 1, &[], None, date!(2024 - 02 - 10), UtcOffset::UTC)
            .unwrap_or_else(|err| panic!("grid: {err}"));
        let text = rendered(&grid);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "February 2024");
        assert_eq!(lines[1], " Sun Mon Tue Wed Thu Fri Sat");
        // 2024-02-01 is a Thursday.
        assert_eq!(lines[2], format!("{}1   2   3", " ".repeat(18)));
        assert!(lines[3].contains("@10"));
        assert!(lines.last().is_some_and(|line| line.ends_with("29")));
    }

    #[test]
    fn markers_reflect_task_state() {
        let mut done = Task::new("Done", datetime!(2024-03-01 00:00 UTC));
        done.status = Status::Completed;
        done.due_date = Some(datetime!(2024-03-05 09:00 UTC));
        let mut open = Task::new("Open", datetime!(2024-03-01 00:00 UTC));
        open.due_date = Some(datetime!(2024-03-06 09:00 UTC));

        let grid = GridModel::build(
            2024,
            2,
            &[done, open],
            Some(date!(2024 - 03 - 06)),
            date!(2024 - 03 - 20),
            UtcOffset::UTC,
        )
        .unwrap_or_else(|err| panic!("grid: {err}"));
        let text = rendered(&grid);
        assert!(text.contains("  5+"));
        assert!(text.contains("> 6*"));
    }

    #[test]
    fn table_flags_overdue() {
        let mut task = Task::new("Late", datetime!(2024-03-01 00:00 UTC));
        task.due_date = Some(datetime!(2024-03-02 00:00 UTC));
        let mut buf = Vec::new();
        task_table(&mut buf, &[task], datetime!(2024-03-03 00:00 UTC), UtcOffset::UTC)
            .unwrap_or_else(|err| panic!("render: {err}"));
        let text = String::from_utf8(buf).unwrap_or_else(|err| panic!("utf8: {err}"));
        assert!(text.contains("Mar 2, 2024 (overdue)"));
    }
}
