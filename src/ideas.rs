use chrono::NaiveTime;
use crate::models::{Frequency, TaskDraft};

/// Reminder offset new tasks start with.
pub const DEFAULT_REMINDER: u32 = 10;

pub const CATEGORIES: [&str; 5] = ["Wellness", "Work", "Home", "Learning", "Personal"];

fn draft(
    title: &str,
    (h, m): (u32, u32),
    category: &str,
    frequency: Frequency,
    reminder_offset: u32,
    notes: &str,
) -> TaskDraft {
    TaskDraft {
        category: category.to_string(),
        notes: Some(notes.to_string()),
        reminder_offset,
        ..TaskDraft::new(title, NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default(), frequency)
    }
}

/// Quick-add suggestions.
pub fn routine_ideas() -> Vec<TaskDraft> {
    vec![
        draft("Hydrate & vitamins", (8, 0), "Wellness", Frequency::Daily, 5, "Drink 500ml water"),
        draft("Inbox zero", (15, 0), "Work", Frequency::Weekdays, 10, "15-minute email sweep"),
        draft("Mindful break", (12, 30), "Personal", Frequency::Daily, 0, "5-minute breathing"),
        draft("Reading", (21, 30), "Learning", Frequency::Daily, 15, "15 pages of a book"),
    ]
}

/// A labelled starting point for a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineTemplate {
    pub label: &'static str,
    pub draft: TaskDraft,
}

/// Prefills for the add form. Fields given alongside a template override it.
pub fn routine_templates() -> Vec<RoutineTemplate> {
    vec![
        RoutineTemplate {
            label: "Morning",
            draft: TaskDraft {
                pinned: true,
                ..draft("Wake up & stretch", (7, 0), "Wellness", Frequency::Daily, DEFAULT_REMINDER, "5 minute stretch + water")
            },
        },
        RoutineTemplate {
            label: "Workday",
            draft: draft("Focus block", (9, 0), "Work", Frequency::Weekdays, DEFAULT_REMINDER, "Deep work session"),
        },
        RoutineTemplate {
            label: "Evening",
            draft: draft("Daily review", (20, 30), "Personal", Frequency::Daily, DEFAULT_REMINDER, "Reflect & plan tomorrow"),
        },
    ]
}

/// Looks a template up by label, ignoring case.
pub fn find_template(label: &str) -> Option<RoutineTemplate> {
    let label = label.trim();
    routine_templates().into_iter().find(|t| t.label.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_valid_drafts() {
        for d in routine_ideas() {
            assert!(d.validate().is_ok(), "{}", d.title);
        }
        assert_eq!(routine_ideas()[1].frequency, Frequency::Weekdays);
        assert_eq!(routine_ideas()[2].time, NaiveTime::from_hms_opt(12, 30, 0).unwrap());
    }

    #[test]
    fn templates_prefill_the_add_form() {
        let templates = routine_templates();
        let labels: Vec<&str> = templates.iter().map(|t| t.label).collect();
        assert_eq!(labels, ["Morning", "Workday", "Evening"]);
        for t in &templates {
            assert!(t.draft.validate().is_ok(), "{}", t.label);
            assert_eq!(t.draft.reminder_offset, DEFAULT_REMINDER);
        }

        let morning = find_template(" morning ").unwrap();
        assert_eq!(morning.draft.title, "Wake up & stretch");
        assert!(morning.draft.pinned);

        let workday = find_template("WORKDAY").unwrap();
        assert_eq!(workday.draft.frequency, Frequency::Weekdays);
        assert!(!workday.draft.pinned);

        let evening = find_template("evening").unwrap();
        assert_eq!(evening.draft.time, NaiveTime::from_hms_opt(20, 30, 0).unwrap());
        assert!(find_template("lunch").is_none());
    }
}
