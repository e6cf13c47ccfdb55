//! CLI entry point for taskmate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskmate_core::{Priority, SortKey, Status, StatusFilter, Theme};
use time::OffsetDateTime;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal tasks with a month calendar, stored per owner.
#[derive(Parser, Debug)]
#[command(
    name = "taskmate",
    version,
    about = "taskmate: personal tasks, stats and a month calendar"
)]
struct Cli {
    /// Directory holding stored data and config.toml (defaults to the platform data dir).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Owner whose tasks are read and written.
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = Priority::Medium)]
        priority: Priority,
        #[arg(long, default_value_t = Status::Todo)]
        status: Status,
        /// `YYYY-MM-DD` (keeps the current time of day) or RFC 3339.
        #[arg(long)]
        due: Option<String>,
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks after search, filter and sort.
    #[command(alias = "ls")]
    List {
        #[arg(short = 'q', long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<StatusFilter>,
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Print one task as JSON.
    Show { id: String },

    /// Change fields of a task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
        #[arg(long = "remove-tag")]
        remove_tags: Vec<String>,
    },

    /// Flip a task between completed and to-do.
    Toggle { id: String },

    /// Delete a task.
    #[command(alias = "delete")]
    Rm { id: String },

    /// Show total, completed, pending and overdue counts.
    Stats,

    /// Tasks due today and the next upcoming ones.
    Today,

    /// Render a month grid with task markers.
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        /// Month number, 1 to 12.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        month: Option<u8>,
        /// Highlight a day and list its tasks (`YYYY-MM-DD`).
        #[arg(long)]
        select: Option<String>,
    },

    /// Show or change the colour theme.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Show or edit the user profile.
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Print the owner's stored tasks as JSON.
    Export,

    /// Delete every task of the owner.
    Clear {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ThemeAction {
    /// Print the current theme.
    Show,
    /// Switch between light and dark.
    Toggle,
    /// Set an explicit theme.
    Set { theme: Theme },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ProfileAction {
    /// Print the profile, creating it on first use.
    Show,
    /// Update name and/or email.
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Turn notifications on or off.
    Notifications,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        data_dir,
        owner,
        cmd,
    } = Cli::parse();

    install_tracing();

    let data_dir = resolve_data_dir(data_dir)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(async move {
        let session = commands::Session::open(&data_dir, owner).await?;
        let mut stdout = std::io::stdout().lock();
        commands::run(cmd, &session, OffsetDateTime::now_utc(), &mut stdout).await
    })
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("taskmate"))
        .context("could not determine a data directory; pass --data-dir")
}

fn install_tracing() {
    // RUST_LOG is honoured; the default level is INFO.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
