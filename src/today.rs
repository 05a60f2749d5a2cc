use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use crate::models::{Occurrence, Task};
use crate::recurrence::occurs_on;
use crate::schedule::{minutes_until, DaySegment};

/// Projects the task collection onto the day of `now`.
///
/// Keeps tasks that occur today, marks completion against today's date and
/// attaches the countdown. Pinned tasks come first, then by time of day; the
/// sort is stable so ties keep collection order. `tasks` is not modified.
pub fn today_occurrences(tasks: &[Task], now: NaiveDateTime) -> Vec<Occurrence> {
    let today = now.date();
    let mut occurrences: Vec<Occurrence> = tasks
        .iter()
        .filter(|t| occurs_on(t, today))
        .map(|t| Occurrence {
            task: t.clone(),
            completed: t.is_completed_on(today),
            minutes_until: minutes_until(t.time, now),
        })
        .collect();
    occurrences.sort_by(|a, b| {
        b.task
            .pinned
            .cmp(&a.task.pinned)
            .then_with(|| a.task.time.cmp(&b.task.time))
    });
    occurrences
}

/// Which occurrences a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    /// The next three open tasks.
    Focus,
    Completed,
}

pub const FOCUS_LIMIT: usize = 3;

impl ListFilter {
    pub fn apply(&self, occurrences: &[Occurrence]) -> Vec<Occurrence> {
        match self {
            ListFilter::All => occurrences.to_vec(),
            ListFilter::Focus => occurrences
                .iter()
                .filter(|o| !o.completed)
                .take(FOCUS_LIMIT)
                .cloned()
                .collect(),
            ListFilter::Completed => occurrences.iter().filter(|o| o.completed).cloned().collect(),
        }
    }

    pub fn next(&self) -> ListFilter {
        match self {
            ListFilter::All => ListFilter::Focus,
            ListFilter::Focus => ListFilter::Completed,
            ListFilter::Completed => ListFilter::All,
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListFilter::All => "all",
            ListFilter::Focus => "focus",
            ListFilter::Completed => "completed",
        })
    }
}

impl FromStr for ListFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ListFilter::All),
            "focus" => Ok(ListFilter::Focus),
            "completed" | "done" => Ok(ListFilter::Completed),
            other => Err(format!("Unknown filter '{}'. Supported: all, focus, completed.", other)),
        }
    }
}

/// Groups occurrences by part of day, Morning first. Empty groups are dropped
/// and each group keeps the projected order.
pub fn group_by_segment(occurrences: &[Occurrence]) -> Vec<(DaySegment, Vec<Occurrence>)> {
    DaySegment::ALL
        .iter()
        .map(|seg| {
            let items: Vec<Occurrence> = occurrences
                .iter()
                .filter(|o| DaySegment::of(o.task.time) == *seg)
                .cloned()
                .collect();
            (*seg, items)
        })
        .filter(|(_, items)| !items.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_time, Frequency, TaskDraft};
    use chrono::{NaiveDate, Utc};

    fn task(id: &str, time: &str, pinned: bool) -> Task {
        TaskDraft {
            pinned,
            ..TaskDraft::new(id, parse_time(time).unwrap(), Frequency::Daily)
        }
        .into_task(id.into(), Utc::now())
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-15T06:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn ids(occ: &[Occurrence]) -> Vec<&str> {
        occ.iter().map(|o| o.task.id.as_str()).collect()
    }

    #[test]
    fn pinned_first_then_by_time() {
        let tasks = vec![task("a", "09:00", false), task("b", "07:00", true), task("c", "08:00", false)];
        assert_eq!(ids(&today_occurrences(&tasks, now())), vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_collection_order() {
        let tasks = vec![
            task("x", "08:00", false),
            task("p2", "10:00", true),
            task("y", "08:00", false),
            task("p1", "10:00", true),
        ];
        assert_eq!(ids(&today_occurrences(&tasks, now())), vec!["p2", "p1", "x", "y"]);
    }

    #[test]
    fn filters_and_marks_completion() {
        let mut done = task("done", "07:00", false);
        done.last_completed_date = NaiveDate::from_ymd_opt(2024, 3, 15);
        let mut stale = task("stale", "07:30", false);
        stale.last_completed_date = NaiveDate::from_ymd_opt(2024, 3, 14);
        let mut weekend = task("weekend", "08:00", false);
        weekend.frequency = Frequency::Weekends;

        let tasks = vec![done, stale, weekend];
        let occ = today_occurrences(&tasks, now());
        assert_eq!(ids(&occ), vec!["done", "stale"]);
        assert!(occ[0].completed);
        assert!(!occ[1].completed);
        assert_eq!(occ[0].minutes_until, 60);
        assert_eq!(occ[1].minutes_until, 90);
    }

    #[test]
    fn projection_leaves_input_alone() {
        let tasks = vec![task("a", "09:00", false), task("b", "07:00", true)];
        let before = tasks.clone();
        let first = today_occurrences(&tasks, now());
        let second = today_occurrences(&tasks, now());
        assert_eq!(tasks, before);
        assert_eq!(first, second);
    }

    #[test]
    fn focus_takes_three_open_tasks() {
        let mut tasks: Vec<Task> = ["06:30", "07:00", "08:00", "09:00", "10:00"]
            .iter()
            .enumerate()
            .map(|(i, t)| task(&i.to_string(), t, false))
            .collect();
        tasks[0].last_completed_date = NaiveDate::from_ymd_opt(2024, 3, 15);
        let occ = today_occurrences(&tasks, now());
        assert_eq!(ids(&ListFilter::Focus.apply(&occ)), vec!["1", "2", "3"]);
        assert_eq!(ids(&ListFilter::Completed.apply(&occ)), vec!["0"]);
        assert_eq!(ListFilter::All.apply(&occ).len(), 5);
    }

    #[test]
    fn groups_by_segment_in_day_order() {
        let tasks = vec![task("late", "22:00", false), task("am", "08:00", false), task("pm", "13:00", false)];
        let groups = group_by_segment(&today_occurrences(&tasks, now()));
        let labels: Vec<DaySegment> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(labels, vec![DaySegment::Morning, DaySegment::Afternoon, DaySegment::Night]);
    }
}
