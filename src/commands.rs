use std::io::{self, Write};

use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::clock::Clock;
use crate::ideas::{find_template, routine_ideas, routine_templates, CATEGORIES, DEFAULT_REMINDER};
use crate::models::{parse_time, Frequency, Occurrence, TaskDraft, TaskPatch};
use crate::recurrence::{describe, parse_days};
use crate::schedule::{format_minutes, format_time_label, reminder_due, reminder_label, status_label, Status};
use crate::store::{Routine, TaskRepository};
use crate::summary::TodaySummary;
use crate::today::{group_by_segment, ListFilter};

/// Raw task fields as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub title: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub frequency: Option<String>,
    /// e.g. `mon,wed,fri` or `1,3,5`
    pub days: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub reminder: Option<u32>,
    pub pinned: Option<bool>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}. Use YYYY-MM-DD.", s, e))
}

impl TaskFields {
    /// Builds a new-task draft. Days imply `custom` and a date implies `once`
    /// when no frequency is given.
    pub fn into_draft(self) -> Result<TaskDraft, String> {
        let title = self.title.unwrap_or_default();
        let time = match &self.time {
            Some(t) => parse_time(t).map_err(|e| format!("Invalid time '{}': {}. Use HH:MM.", t, e))?,
            None => return Err("A time is required (HH:MM).".to_string()),
        };
        let custom_days = self.days.as_deref().map(parse_days).transpose()?;
        let target_date = self.date.as_deref().map(parse_date).transpose()?;
        let frequency = match &self.frequency {
            Some(f) => f.parse::<Frequency>()?,
            None if custom_days.is_some() => Frequency::Custom,
            None if target_date.is_some() => Frequency::Once,
            None => Frequency::Daily,
        };
        if frequency == Frequency::Once && target_date.is_none() {
            return Err("A one-off task needs --date YYYY-MM-DD.".to_string());
        }
        Ok(TaskDraft {
            category: self.category.unwrap_or_else(|| CATEGORIES[0].to_string()),
            notes: self.notes,
            custom_days,
            target_date,
            reminder_offset: self.reminder.unwrap_or(DEFAULT_REMINDER),
            pinned: self.pinned.unwrap_or(false),
            ..TaskDraft::new(title, time, frequency)
        })
    }

    /// Fills every unset field from `base`. Days or a date given without a
    /// frequency keep their inferred frequency rather than the base one.
    pub fn or_template(self, base: &TaskDraft) -> TaskFields {
        let frequency = match self.frequency {
            Some(f) => Some(f),
            None if self.days.is_some() || self.date.is_some() => None,
            None => Some(base.frequency.to_string()),
        };
        TaskFields {
            title: self.title.or_else(|| Some(base.title.clone())),
            time: self.time.or_else(|| Some(base.time.format("%H:%M").to_string())),
            category: self.category.or_else(|| Some(base.category.clone())),
            notes: self.notes.or_else(|| base.notes.clone()),
            frequency,
            days: self.days,
            date: self.date,
            reminder: self.reminder.or(Some(base.reminder_offset)),
            pinned: self.pinned.or(Some(base.pinned)),
        }
    }

    /// Builds a partial update. An empty notes, days or date value clears it.
    pub fn into_patch(self) -> Result<TaskPatch, String> {
        let time = match &self.time {
            Some(t) => Some(parse_time(t).map_err(|e| format!("Invalid time '{}': {}. Use HH:MM.", t, e))?),
            None => None,
        };
        let frequency = self.frequency.as_deref().map(str::parse::<Frequency>).transpose()?;
        let custom_days = match self.days.as_deref().map(str::trim) {
            Some("") => Some(None),
            Some(d) => Some(Some(parse_days(d)?)),
            None => None,
        };
        let target_date = match self.date.as_deref().map(str::trim) {
            Some("") => Some(None),
            Some(d) => Some(Some(parse_date(d)?)),
            None => None,
        };
        let notes = self.notes.map(|n| {
            let n = n.trim().to_string();
            if n.is_empty() { None } else { Some(n) }
        });
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("Title must not be empty.".to_string());
            }
        }
        Ok(TaskPatch {
            title: self.title.map(|t| t.trim().to_string()),
            time,
            category: self.category,
            notes,
            frequency,
            custom_days,
            target_date,
            reminder_offset: self.reminder,
            pinned: self.pinned,
            last_completed_date: None,
        })
    }
}

fn resolve<R: TaskRepository, C: Clock>(routine: &Routine<R, C>, id: &str, silent: bool) -> Option<String> {
    let found = routine.resolve_id(id);
    if found.is_none() && !silent {
        eprintln!("Task {} not found (or the prefix is ambiguous).", id);
    }
    found
}

/// Adds a new task and returns its id.
pub fn cmd_add<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, fields: TaskFields, silent: bool) -> Option<String> {
    let draft = match fields.into_draft() {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return None;
        }
    };
    match routine.add_task(draft) {
        Ok(id) => {
            if !silent { println!("Task added (id = {})", &id[..8.min(id.len())]); }
            Some(id)
        }
        Err(e) => {
            if !silent { eprintln!("Could not add task: {}", e); }
            None
        }
    }
}

/// Adds a task prefilled from the template named `label`.
pub fn cmd_add_template<R: TaskRepository, C: Clock>(
    routine: &mut Routine<R, C>,
    label: &str,
    fields: TaskFields,
    silent: bool,
) -> Option<String> {
    let Some(template) = find_template(label) else {
        if !silent {
            let labels: Vec<&str> = routine_templates().iter().map(|t| t.label).collect();
            eprintln!("No template '{}'. Choose from: {}.", label, labels.join(", "));
        }
        return None;
    };
    cmd_add(routine, fields.or_template(&template.draft), silent)
}

/// Adds the suggestion at 1-based `index` from [`routine_ideas`].
pub fn cmd_idea_add<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, index: usize, silent: bool) -> Option<String> {
    let ideas = routine_ideas();
    let Some(draft) = index.checked_sub(1).and_then(|i| ideas.get(i)).cloned() else {
        if !silent { eprintln!("No suggestion #{}. Run `routinely ideas` to list them.", index); }
        return None;
    };
    let title = draft.title.clone();
    match routine.add_task(draft) {
        Ok(id) => {
            if !silent { println!("Added '{}'.", title); }
            Some(id)
        }
        Err(e) => {
            if !silent { eprintln!("Could not add suggestion: {}", e); }
            None
        }
    }
}

/// Edits an existing task's details.
pub fn cmd_edit<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, id: &str, fields: TaskFields, silent: bool) {
    let Some(id) = resolve(routine, id, silent) else { return };
    let patch = match fields.into_patch() {
        Ok(p) => p,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    if patch.is_empty() {
        if !silent { println!("Nothing to change."); }
        return;
    }
    routine.update_task(&id, &patch);
    if !silent { println!("Task {} updated.", &id[..8.min(id.len())]); }
}

/// Flips today's completion for a task.
pub fn cmd_toggle<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, id: &str, silent: bool) {
    let Some(id) = resolve(routine, id, silent) else { return };
    routine.toggle_completion(&id);
    if !silent {
        let today = routine.clock().today();
        if let Some(t) = routine.get(&id) {
            if t.is_completed_on(today) {
                println!("'{}' marked done for today.", t.title);
            } else {
                println!("'{}' marked not done.", t.title);
            }
        }
    }
}

pub fn cmd_pin<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, id: &str, pinned: bool, silent: bool) {
    let Some(id) = resolve(routine, id, silent) else { return };
    routine.set_pinned(&id, pinned);
    if !silent { println!("Task {} {}.", &id[..8.min(id.len())], if pinned { "pinned" } else { "unpinned" }); }
}

/// Removes a task from the routine.
pub fn cmd_remove<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, id: &str, silent: bool) {
    let Some(id) = resolve(routine, id, silent) else { return };
    routine.remove_task(&id);
    if !silent { println!("Task {} removed.", &id[..8.min(id.len())]); }
}

/// Clears today's completion marks without deleting anything.
pub fn cmd_reset<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, silent: bool) {
    routine.reset_all_completions();
    if !silent { println!("Completion marks cleared. Fresh start."); }
}

/// Deletes every task, asking first unless `force` is set.
pub fn cmd_clear<R: TaskRepository, C: Clock>(routine: &mut Routine<R, C>, force: bool) {
    if !force {
        print!("Delete all {} tasks? This cannot be undone. [y/N] ", routine.tasks().len());
        if io::stdout().flush().is_err() {
            return;
        }
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }
    routine.clear_all();
    println!("All tasks deleted.");
}

fn status_color(o: &Occurrence) -> Color {
    match Status::of(o) {
        Status::Completed => Color::Green,
        Status::Missed => Color::Red,
        Status::DueSoon => Color::Yellow,
        Status::Upcoming => Color::Reset,
    }
}

fn print_summary(summary: &TodaySummary, date: NaiveDate) {
    println!(
        "{}  {}% complete ({} done, {} remaining, {} planned)",
        date.format("%A, %B %-d"),
        summary.completion_rate,
        summary.completed,
        summary.remaining,
        summary.total
    );
    match &summary.next_up {
        Some(o) => println!(
            "Next up: {} at {} ({}), starts in {}",
            o.task.title,
            format_time_label(o.task.time),
            o.task.category,
            format_minutes(o.minutes_until)
        ),
        None => println!("Next up: nothing left on the clock."),
    }
    if !summary.missed.is_empty() {
        let names: Vec<&str> = summary.missed.iter().take(3).map(|o| o.task.title.as_str()).collect();
        let more = summary.missed.len().saturating_sub(3);
        if more > 0 {
            println!("Missed: {} and {} more", names.join(", "), more);
        } else {
            println!("Missed: {}", names.join(", "));
        }
    }
}

/// Prints today's routine grouped by part of day.
pub fn cmd_today<R: TaskRepository, C: Clock>(routine: &Routine<R, C>, filter: ListFilter) {
    let occurrences = routine.today_occurrences();
    print_summary(&TodaySummary::from_occurrences(&occurrences), routine.clock().today());

    let shown = filter.apply(&occurrences);
    if shown.is_empty() {
        println!("No tasks for today ({}).", filter);
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Repeats").add_attribute(Attribute::Bold),
            Cell::new("Reminder").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for (segment, items) in group_by_segment(&shown) {
        table.add_row(vec![
            Cell::new(""),
            Cell::new(segment.label()).add_attribute(Attribute::Bold).fg(Color::Cyan),
            Cell::new(format!("{} task{}", items.len(), if items.len() == 1 { "" } else { "s" })).fg(Color::Cyan),
        ]);
        for o in items {
            let title = if o.task.pinned { format!("* {}", o.task.title) } else { o.task.title.clone() };
            let reminder = if reminder_due(&o) {
                format!("{} (now)", reminder_label(o.task.reminder_offset))
            } else {
                reminder_label(o.task.reminder_offset)
            };
            table.add_row(vec![
                Cell::new(o.task.short_id()),
                Cell::new(format_time_label(o.task.time)),
                Cell::new(title),
                Cell::new(&o.task.category),
                Cell::new(describe(&o.task)),
                Cell::new(reminder),
                Cell::new(status_label(&o)).fg(status_color(&o)),
            ]);
        }
    }

    println!("{table}");
}

/// Lists every task, whether or not it occurs today.
pub fn cmd_list<R: TaskRepository, C: Clock>(routine: &Routine<R, C>) {
    let tasks = routine.tasks();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    let today = routine.clock().today();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Repeats").add_attribute(Attribute::Bold),
            Cell::new("Pinned").add_attribute(Attribute::Bold),
            Cell::new("Last done").add_attribute(Attribute::Bold),
            Cell::new("Notes").add_attribute(Attribute::Bold),
        ]);

    for t in tasks.iter() {
        let last_done = match t.last_completed_date {
            Some(d) if d == today => "today".to_string(),
            Some(d) => d.to_string(),
            None => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(t.short_id()),
            Cell::new(t.time.format("%H:%M")),
            Cell::new(&t.title),
            Cell::new(&t.category),
            Cell::new(describe(t)),
            Cell::new(if t.pinned { "yes" } else { "" }),
            Cell::new(last_done),
            Cell::new(t.notes.clone().unwrap_or_default()),
        ]);
    }

    println!("{table}");
}

/// Lists the built-in quick-add suggestions.
pub fn cmd_ideas() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL)
        .set_header(vec!["#", "Suggestion", "Category", "Time", "Repeats", "Notes"]);
    for (i, d) in routine_ideas().into_iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            d.title,
            d.category,
            d.time.format("%H:%M").to_string(),
            d.frequency.to_string(),
            d.notes.unwrap_or_default(),
        ]);
    }
    println!("{table}");
    println!("Add one with `routinely idea <#>`.");

    let mut templates = Table::new();
    templates.load_preset(UTF8_FULL)
        .set_header(vec!["Template", "Title", "Category", "Time", "Repeats", "Pinned"]);
    for t in routine_templates() {
        templates.add_row(vec![
            t.label.to_string(),
            t.draft.title,
            t.draft.category,
            t.draft.time.format("%H:%M").to_string(),
            t.draft.frequency.to_string(),
            if t.draft.pinned { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{templates}");
    println!("Start from one with `routinely add --template <name>`; other flags override it.");
}
