//! # Routinely
//!
//! A terminal daily-routine tracker. Define recurring or one-off tasks with a
//! time, category and reminder offset; see which of them apply today, tick
//! them off, and watch the day's progress.
//!
//! ## Usage
//!
//! Run without arguments (or with `ui`) to open the interactive dashboard.
//!
//! ```bash
//! # Every day at 07:00, pinned to the top
//! routinely add "Wake up & stretch" --time 07:00 --category Wellness --pin
//!
//! # Mondays, Wednesdays and Fridays
//! routinely add "Gym" --time 18:00 --days mon,wed,fri
//!
//! # Once
//! routinely add "Dentist" --time 14:30 --date 2025-12-01
//!
//! # Today's view, then tick a task off by id prefix
//! routinely today
//! routinely toggle 3f2a
//! ```
//!
//! ## Data Storage
//!
//! Tasks live in one JSON slot under the local data directory:
//! *   Linux: `~/.local/share/routinely/daily-routine-tasks.json`
//! *   macOS: `~/Library/Application Support/routinely/daily-routine-tasks.json`
//! *   Windows: `%LOCALAPPDATA%\routinely\daily-routine-tasks.json`
//!
//! Override it with the `ROUTINE_DB` environment variable. Logging goes to
//! stderr and follows `RUST_LOG` (default `routinely=warn`).

use std::io;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use routinely::clock::SystemClock;
use routinely::commands::*;
use routinely::storage::JsonFileRepository;
use routinely::store::Routine;
use routinely::today::ListFilter;
use routinely::tui::run_tui;

#[derive(Parser)]
#[command(name = "routinely")]
#[command(about = "Daily routine tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct FieldArgs {
    /// Time of day, HH:MM (24h)
    #[arg(short, long)]
    time: Option<String>,
    /// Category label, e.g. Wellness, Work, Home
    #[arg(short, long)]
    category: Option<String>,
    /// Free-form notes
    #[arg(short, long)]
    notes: Option<String>,
    /// daily, weekdays, weekends, custom or once
    #[arg(short, long)]
    frequency: Option<String>,
    /// Days for custom frequency, e.g. mon,wed,fri or 1,3,5
    #[arg(short, long)]
    days: Option<String>,
    /// Date for a one-off task, YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// Reminder, in minutes before the task time
    #[arg(short, long)]
    reminder: Option<u32>,
}

impl FieldArgs {
    fn into_fields(self, title: Option<String>, pinned: Option<bool>) -> TaskFields {
        TaskFields {
            title,
            time: self.time,
            category: self.category,
            notes: self.notes,
            frequency: self.frequency,
            days: self.days,
            date: self.date,
            reminder: self.reminder,
            pinned,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's routine and progress
    Today {
        /// all, focus or completed
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// List every task
    List,
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        #[arg(required_unless_present = "template")]
        title: Option<String>,
        /// Prefill from a template: morning, workday or evening
        #[arg(long)]
        template: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
        /// Keep at the top of today's list
        #[arg(short, long)]
        pin: bool,
    },
    /// Edit a task
    Edit {
        /// Task id or unique prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Mark a task done for today, or undo it
    Toggle {
        id: String,
    },
    /// Pin a task to the top of today's list
    Pin {
        id: String,
    },
    /// Unpin a task
    Unpin {
        id: String,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Clear every completion mark and start the day over
    Reset,
    /// Delete all tasks
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// List quick-add suggestions
    Ideas,
    /// Add a suggestion by its number
    Idea {
        number: usize,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("routinely=warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => {
                eprintln!("Unsupported shell: {}", shell);
                return;
            }
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "routinely", &mut io::stdout());
        return;
    }

    let mut routine = Routine::open(JsonFileRepository::from_env(), SystemClock);

    match cli.command {
        Some(Commands::Today { filter }) => match filter.parse::<ListFilter>() {
            Ok(f) => cmd_today(&routine, f),
            Err(e) => eprintln!("{}", e),
        },
        Some(Commands::List) => cmd_list(&routine),
        Some(Commands::Add { title, template, fields, pin }) => {
            let fields = fields.into_fields(title, pin.then_some(true));
            match template {
                Some(label) => cmd_add_template(&mut routine, &label, fields, false),
                None => cmd_add(&mut routine, fields, false),
            };
        }
        Some(Commands::Edit { id, title, fields }) => {
            cmd_edit(&mut routine, &id, fields.into_fields(title, None), false)
        }
        Some(Commands::Toggle { id }) => cmd_toggle(&mut routine, &id, false),
        Some(Commands::Pin { id }) => cmd_pin(&mut routine, &id, true, false),
        Some(Commands::Unpin { id }) => cmd_pin(&mut routine, &id, false, false),
        Some(Commands::Remove { id }) => cmd_remove(&mut routine, &id, false),
        Some(Commands::Reset) => cmd_reset(&mut routine, false),
        Some(Commands::Clear { force }) => cmd_clear(&mut routine, force),
        Some(Commands::Ideas) => cmd_ideas(),
        Some(Commands::Idea { number }) => {
            cmd_idea_add(&mut routine, number, false);
        }
        Some(Commands::Completions { .. }) => {}
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(routine) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}
