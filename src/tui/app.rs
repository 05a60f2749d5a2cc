use ratatui::widgets::TableState;

use crate::clock::Clock;
use crate::commands::{cmd_add, TaskFields};
use crate::ideas::{routine_ideas, DEFAULT_REMINDER};
use crate::models::{parse_time, Frequency, Occurrence, TaskDraft};
use crate::recurrence::parse_days;
use crate::schedule::DaySegment;
use crate::store::{Routine, TaskRepository};
use crate::summary::TodaySummary;
use crate::today::{group_by_segment, ListFilter};

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
    ConfirmClear,
}

#[derive(Debug, PartialEq)]
pub enum ViewMode {
    Today,
    Ideas,
}

/// Steps of the "Add Task" wizard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AddStep {
    #[default]
    Title,
    Time,
    Category,
    Frequency,
    /// Days for custom tasks, date for one-off tasks.
    Schedule,
    Reminder,
}

pub enum DisplayItem {
    SegmentHeader(DaySegment, usize),
    Task(Occurrence),
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub fields: TaskFields,
    pub step: AddStep,
    pub frequency: Option<Frequency>,
}

impl AddState {
    pub fn prompt(&self) -> String {
        match self.step {
            AddStep::Title => "Add Task: Enter Title".to_string(),
            AddStep::Time => "Add Task: Enter Time (HH:MM)".to_string(),
            AddStep::Category => "Add Task: Enter Category (Optional)".to_string(),
            AddStep::Frequency => "Add Task: daily / weekdays / weekends / custom / once".to_string(),
            AddStep::Schedule => match self.frequency {
                Some(Frequency::Once) => "Add Task: Enter Date (YYYY-MM-DD)".to_string(),
                _ => "Add Task: Enter Days (e.g. mon,wed,fri)".to_string(),
            },
            AddStep::Reminder => format!("Add Task: Reminder minutes before (default {})", DEFAULT_REMINDER),
        }
    }
}

pub struct App<R: TaskRepository, C: Clock> {
    pub routine: Routine<R, C>,
    pub summary: TodaySummary,
    pub display_items: Vec<DisplayItem>,
    pub ideas: Vec<TaskDraft>,
    pub state: TableState,
    pub idea_state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub filter: ListFilter,
    pub input_buffer: String,
    pub add_state: AddState,
    /// One-line feedback shown in the help bar.
    pub message: Option<String>,
}

impl<R: TaskRepository, C: Clock> App<R, C> {
    pub fn new(routine: Routine<R, C>) -> Self {
        let ideas = routine_ideas();
        let mut idea_state = TableState::default();
        if !ideas.is_empty() {
            idea_state.select(Some(0));
        }
        let mut app = App {
            summary: routine.summary(),
            routine,
            display_items: Vec::new(),
            ideas,
            state: TableState::default(),
            idea_state,
            view_mode: ViewMode::Today,
            input_mode: InputMode::Normal,
            filter: ListFilter::All,
            input_buffer: String::new(),
            add_state: AddState::default(),
            message: None,
        };
        app.reload();
        app
    }

    /// Re-projects today's tasks and rebuilds the grouped rows.
    pub fn reload(&mut self) {
        let occurrences = self.routine.today_occurrences();
        self.summary = TodaySummary::from_occurrences(&occurrences);

        self.display_items.clear();
        for (segment, items) in group_by_segment(&self.filter.apply(&occurrences)) {
            self.display_items.push(DisplayItem::SegmentHeader(segment, items.len()));
            self.display_items.extend(items.into_iter().map(DisplayItem::Task));
        }

        if self.display_items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.display_items.len() {
                self.state.select(Some(self.display_items.len() - 1));
            }
        } else {
            self.state.select(Some(1.min(self.display_items.len() - 1)));
        }
    }

    fn list_len(&self) -> usize {
        match self.view_mode {
            ViewMode::Today => self.display_items.len(),
            ViewMode::Ideas => self.ideas.len(),
        }
    }

    fn list_state(&mut self) -> &mut TableState {
        match self.view_mode {
            ViewMode::Today => &mut self.state,
            ViewMode::Ideas => &mut self.idea_state,
        }
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        let len = self.list_len();
        if len == 0 { return; }
        let state = self.list_state();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        let len = self.list_len();
        if len == 0 { return; }
        let state = self.list_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    /// The task under the cursor, if the cursor is on a task row.
    pub fn selected(&self) -> Option<&Occurrence> {
        if self.view_mode != ViewMode::Today { return None; }
        match self.state.selected().and_then(|i| self.display_items.get(i)) {
            Some(DisplayItem::Task(o)) => Some(o),
            _ => None,
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.selected().map(|o| o.task.id.clone())
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.routine.toggle_completion(&id);
            self.reload();
        }
    }

    pub fn pin_selected(&mut self) {
        if let Some(o) = self.selected() {
            let (id, pinned) = (o.task.id.clone(), !o.task.pinned);
            self.routine.set_pinned(&id, pinned);
            self.reload();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(o) = self.selected() {
            let (id, title) = (o.task.id.clone(), o.task.title.clone());
            self.routine.remove_task(&id);
            self.message = Some(format!("Removed '{}'", title));
            self.reload();
        }
    }

    pub fn reset_completions(&mut self) {
        self.routine.reset_all_completions();
        self.message = Some("Completion marks cleared".to_string());
        self.reload();
    }

    pub fn start_clear(&mut self) {
        self.input_mode = InputMode::ConfirmClear;
    }

    pub fn confirm_clear(&mut self, yes: bool) {
        if yes {
            self.routine.clear_all();
            self.message = Some("All tasks deleted".to_string());
            self.reload();
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.state.select(None);
        self.reload();
    }

    /// Toggles between today's list and the suggestions.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Today => ViewMode::Ideas,
            ViewMode::Ideas => ViewMode::Today,
        };
    }

    /// Adds the highlighted suggestion and returns to today's list.
    pub fn add_selected_idea(&mut self) {
        if self.view_mode != ViewMode::Ideas { return; }
        let Some(draft) = self.idea_state.selected().and_then(|i| self.ideas.get(i)).cloned() else { return };
        let title = draft.title.clone();
        match self.routine.add_task(draft) {
            Ok(_) => self.message = Some(format!("Added '{}'", title)),
            Err(e) => self.message = Some(e.to_string()),
        }
        self.view_mode = ViewMode::Today;
        self.reload();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.message = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in the "Add Task" wizard. Invalid input keeps the step
    /// and reports why in the help bar.
    pub fn handle_input(&mut self) {
        if self.input_mode != InputMode::Adding { return; }
        let input = self.input_buffer.trim().to_string();
        let step = self.add_state.step;
        let st = &mut self.add_state;
        let advance = match step {
            AddStep::Title => {
                if input.is_empty() {
                    Err("Title is required".to_string())
                } else {
                    st.fields.title = Some(input);
                    Ok(AddStep::Time)
                }
            }
            AddStep::Time => match parse_time(&input) {
                Ok(_) => {
                    st.fields.time = Some(input);
                    Ok(AddStep::Category)
                }
                Err(_) => Err(format!("'{}' is not a HH:MM time", input)),
            },
            AddStep::Category => {
                if !input.is_empty() {
                    st.fields.category = Some(input);
                }
                Ok(AddStep::Frequency)
            }
            AddStep::Frequency => {
                let parsed = if input.is_empty() { Ok(Frequency::Daily) } else { input.parse::<Frequency>() };
                match parsed {
                    Ok(f) => {
                        let next = if matches!(f, Frequency::Custom | Frequency::Once) {
                            AddStep::Schedule
                        } else {
                            AddStep::Reminder
                        };
                        st.fields.frequency = Some(f.to_string());
                        st.frequency = Some(f);
                        Ok(next)
                    }
                    Err(e) => Err(e),
                }
            }
            AddStep::Schedule => {
                if st.frequency == Some(Frequency::Once) {
                    match chrono::NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
                        Ok(_) => {
                            st.fields.date = Some(input);
                            Ok(AddStep::Reminder)
                        }
                        Err(_) => Err(format!("'{}' is not a YYYY-MM-DD date", input)),
                    }
                } else {
                    match parse_days(&input) {
                        Ok(_) => {
                            st.fields.days = Some(input);
                            Ok(AddStep::Reminder)
                        }
                        Err(e) => Err(e),
                    }
                }
            }
            AddStep::Reminder => {
                if input.is_empty() {
                    self.finish_add();
                    return;
                }
                match input.parse::<u32>() {
                    Ok(m) => {
                        st.fields.reminder = Some(m);
                        self.finish_add();
                        return;
                    }
                    Err(_) => Err(format!("'{}' is not a number of minutes", input)),
                }
            }
        };
        match advance {
            Ok(step) => {
                self.add_state.step = step;
                self.input_buffer.clear();
                self.message = None;
            }
            Err(e) => self.message = Some(e),
        }
    }

    fn finish_add(&mut self) {
        let fields = std::mem::take(&mut self.add_state.fields);
        let title = fields.title.clone().unwrap_or_default();
        self.message = Some(match cmd_add(&mut self.routine, fields, true) {
            Some(_) => format!("Added '{}'", title),
            None => format!("Could not add '{}'", title),
        });
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.reload();
    }
}
