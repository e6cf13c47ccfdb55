use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use taskmate_app::{
    AppConfig, Applied, AuthIdentity, DefaultsConfig, OwnerId, PersistOutcome, ProfileRepository,
    TaskDraft, TaskPatch, TaskRepository, TaskService, ThemeRepository, validate_profile,
};
use taskmate_core::calendar::{self, GridModel, MonthCursor};
use taskmate_core::stats::{due_on, upcoming};
use taskmate_core::{Task, TaskId, query};
use taskmate_store::{FileStore, KeyValueStore};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};
use tracing::debug;

use crate::{Command, ListFormat, ProfileAction, ThemeAction};

mod render;

const DEFAULT_OWNER: &str = "local";
const UPCOMING_LIMIT: usize = 5;
const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Everything a command needs for one owner.
pub struct Session<S> {
    tasks: TaskService<Arc<S>>,
    profiles: ProfileRepository<Arc<S>>,
    themes: ThemeRepository<Arc<S>>,
    offset: UtcOffset,
}

impl Session<FileStore> {
    /// Open the file store under `data_dir` and load the owner's tasks.
    pub async fn open(data_dir: &Path, owner: Option<String>) -> Result<Self> {
        let config = AppConfig::from_dir(data_dir)?;
        let store = FileStore::open(data_dir)
            .await
            .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
        Self::with_store(Arc::new(store), &config.defaults, owner).await
    }
}

impl<S: KeyValueStore> Session<S> {
    /// Build a session over an already opened store.
    pub async fn with_store(
        store: Arc<S>,
        defaults: &DefaultsConfig,
        owner: Option<String>,
    ) -> Result<Self> {
        let owner = owner
            .or_else(|| defaults.owner.clone())
            .unwrap_or_else(|| DEFAULT_OWNER.to_owned());
        let owner = OwnerId::new(owner)?;
        let offset = defaults.utc_offset()?;

        let tasks = TaskService::new(TaskRepository::new(Arc::clone(&store)), owner);
        let loaded = tasks.load().await;
        tasks.set_sort(defaults.sort).await;
        tasks.set_status_filter(defaults.status).await;
        debug!(owner = %tasks.owner(), loaded, "Session ready");

        Ok(Self {
            tasks,
            profiles: ProfileRepository::new(Arc::clone(&store)),
            themes: ThemeRepository::new(store),
            offset,
        })
    }
}

#[allow(clippy::too_many_lines)]
pub async fn run<S: KeyValueStore, W: Write>(
    command: Command,
    session: &Session<S>,
    now: OffsetDateTime,
    out: &mut W,
) -> Result<()> {
    let offset = session.offset;
    match command {
        Command::Add {
            title,
            description,
            category,
            priority,
            status,
            due,
            tags,
        } => {
            let due_date = due.map(|raw| parse_due(&raw, now, offset)).transpose()?;
            let draft = TaskDraft {
                title,
                description: description.unwrap_or_default(),
                category: category.unwrap_or_default(),
                priority,
                status,
                due_date,
                tags: Vec::new(),
            }
            .with_tags(tags);
            let applied = session.tasks.add(draft, now).await?;
            report(out, applied, "created task")?;
        }
        Command::List {
            search,
            status,
            sort,
            category,
            priority,
            format,
        } => {
            if let Some(search) = search {
                session.tasks.set_search(search).await;
            }
            if let Some(status) = status {
                session.tasks.set_status_filter(status).await;
            }
            if let Some(sort) = sort {
                session.tasks.set_sort(sort).await;
            }
            let board = session.tasks.snapshot().await;
            let params = board.query().with_category(category).with_priority(priority);
            let tasks = query(board.tasks(), &params);

            if tasks.is_empty() {
                if board.tasks().is_empty() {
                    writeln!(out, "No tasks found")?;
                } else {
                    writeln!(out, "No tasks matched the provided filters")?;
                }
                return Ok(());
            }
            match format {
                ListFormat::Table => render::task_table(out, &tasks, now, offset)?,
                ListFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?,
            }
        }
        Command::Show { id } => {
            let id = parse_task_id(&id);
            let task = session
                .tasks
                .get(&id)
                .await
                .with_context(|| format!("no task with id {id}"))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?;
        }
        Command::Edit {
            id,
            title,
            description,
            category,
            priority,
            status,
            due,
            clear_due,
            add_tags,
            remove_tags,
        } => {
            let due_date = if clear_due {
                Some(None)
            } else {
                due.map(|raw| parse_due(&raw, now, offset).map(Some)).transpose()?
            };
            let patch = TaskPatch {
                title,
                description,
                category,
                priority,
                status,
                due_date,
                add_tags,
                remove_tags,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let id = parse_task_id(&id);
            let applied = session.tasks.update(&id, &patch, now).await?;
            report(out, applied, "updated task")?;
        }
        Command::Toggle { id } => {
            let id = parse_task_id(&id);
            let applied = session.tasks.toggle(&id, now).await;
            report(out, applied, "toggled task")?;
        }
        Command::Rm { id } => {
            let id = parse_task_id(&id);
            let applied = session.tasks.delete(&id).await;
            report(out, applied, "deleted task")?;
        }
        Command::Stats => {
            render::stats(out, &session.tasks.stats(now).await)?;
        }
        Command::Today => {
            let board = session.tasks.snapshot().await;
            let today = calendar::today(now, offset);
            writeln!(out, "Due today ({}):", taskmate_core::date::format_date(today))?;
            let due_today = due_on(board.tasks(), today, offset);
            if due_today.is_empty() {
                writeln!(out, "  nothing due")?;
            }
            render::task_lines(out, &due_today, offset)?;
            writeln!(out, "Upcoming:")?;
            render::task_lines(out, &upcoming(board.tasks(), UPCOMING_LIMIT), offset)?;
        }
        Command::Calendar {
            year,
            month,
            select,
        } => {
            let today = calendar::today(now, offset);
            let selected = select.as_deref().map(parse_day).transpose()?;
            let anchor = MonthCursor::containing(selected.unwrap_or(today));
            let year = year.unwrap_or_else(|| anchor.year());
            let month0 = month.map_or_else(|| anchor.month0(), |month| month.saturating_sub(1));
            let board = session.tasks.snapshot().await;
            let grid = GridModel::build(year, month0, board.tasks(), selected, today, offset)?;
            render::calendar(out, &grid)?;
            if let Some(day) = selected {
                let tasks: Vec<Task> = GridModel::tasks_on(board.tasks(), day, offset);
                writeln!(out)?;
                writeln!(out, "{}:", taskmate_core::date::format_date(day))?;
                if tasks.is_empty() {
                    writeln!(out, "  nothing due")?;
                }
                render::task_lines(out, &tasks, offset)?;
            }
        }
        Command::Theme { action } => match action.unwrap_or(ThemeAction::Show) {
            ThemeAction::Show => writeln!(out, "{}", session.themes.load().await?)?,
            ThemeAction::Toggle => writeln!(out, "{}", session.themes.toggle().await?)?,
            ThemeAction::Set { theme } => {
                session.themes.save(theme).await?;
                writeln!(out, "{theme}")?;
            }
        },
        Command::Profile { action } => {
            let identity = AuthIdentity {
                id: session.tasks.owner().to_string(),
                ..AuthIdentity::default()
            };
            let mut user = match action {
                Some(ProfileAction::Notifications) => {
                    session.profiles.toggle_notifications(&identity).await?
                }
                Some(ProfileAction::Set { name, email }) => {
                    let mut user = session.profiles.ensure(&identity).await?;
                    if let Some(name) = name {
                        user.name = name.trim().to_owned();
                    }
                    if let Some(email) = email {
                        user.email = email.trim().to_owned();
                    }
                    validate_profile(&user.name, &user.email)?;
                    session.profiles.save(&user).await?;
                    user
                }
                Some(ProfileAction::Show) | None => session.profiles.ensure(&identity).await?,
            };
            user.preferences.theme = session.themes.load().await?;
            render::profile(out, &user)?;
        }
        Command::Export => {
            let json = session
                .tasks
                .repository()
                .export_json(session.tasks.owner())
                .await?;
            writeln!(out, "{json}")?;
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every task without --yes");
            }
            let outcome = session.tasks.clear().await;
            if outcome == PersistOutcome::Failed {
                bail!("tasks were cleared in memory but could not be saved");
            }
            writeln!(out, "cleared all tasks for {}", session.tasks.owner())?;
        }
    }

    Ok(())
}

fn report<W: Write>(out: &mut W, applied: Applied<Task>, verb: &str) -> Result<()> {
    match applied {
        Applied::Changed { value, persisted } => {
            writeln!(out, "{verb}: {} ({})", value.id, value.title)?;
            if persisted == PersistOutcome::Failed {
                writeln!(out, "warning: the change could not be saved")?;
            }
        }
        Applied::NoOp => writeln!(out, "no matching task; nothing changed")?,
    }
    Ok(())
}

fn parse_task_id(raw: &str) -> TaskId {
    TaskId::from(raw.trim())
}

fn parse_day(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), DAY_FORMAT)
        .with_context(|| format!("invalid date '{raw}': expected YYYY-MM-DD"))
}

/// Accept RFC 3339, or a bare day that keeps the current local time of day.
fn parse_due(raw: &str, now: OffsetDateTime, offset: UtcOffset) -> Result<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(raw.trim(), &Rfc3339) {
        return Ok(instant);
    }
    let day = parse_day(raw)
        .with_context(|| format!("invalid due date '{raw}': expected YYYY-MM-DD or RFC 3339"))?;
    Ok(now.to_offset(offset).replace_date(day))
}
