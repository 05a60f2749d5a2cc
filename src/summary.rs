use crate::models::Occurrence;

/// Progress figures for today's projected occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct TodaySummary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    /// Rounded percentage, 0 for an empty day.
    pub completion_rate: u32,
    /// The nearest open task that is not yet due.
    pub next_up: Option<Occurrence>,
    /// Open tasks whose time has passed, in projected order.
    pub missed: Vec<Occurrence>,
}

impl TodaySummary {
    pub fn from_occurrences(occurrences: &[Occurrence]) -> Self {
        let total = occurrences.len();
        let completed = occurrences.iter().filter(|o| o.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        // min_by_key returns the first minimum, keeping projected order on ties
        let next_up = occurrences
            .iter()
            .filter(|o| !o.completed && o.minutes_until >= 0)
            .min_by_key(|o| o.minutes_until)
            .cloned();

        let missed = occurrences
            .iter()
            .filter(|o| !o.completed && o.minutes_until < 0)
            .cloned()
            .collect();

        TodaySummary {
            total,
            completed,
            remaining: total - completed,
            completion_rate,
            next_up,
            missed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_time, Frequency, TaskDraft};
    use chrono::Utc;

    fn occ(id: &str, completed: bool, minutes_until: i64) -> Occurrence {
        Occurrence {
            task: TaskDraft::new(id, parse_time("08:00").unwrap(), Frequency::Daily)
                .into_task(id.into(), Utc::now()),
            completed,
            minutes_until,
        }
    }

    #[test]
    fn empty_day() {
        let s = TodaySummary::from_occurrences(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.completion_rate, 0);
        assert!(s.next_up.is_none());
        assert!(s.missed.is_empty());
    }

    #[test]
    fn counts_and_picks_next_up() {
        let items = vec![
            occ("done", true, 10),
            occ("later", false, 90),
            occ("soon", false, 20),
            occ("missed", false, -15),
        ];
        let s = TodaySummary::from_occurrences(&items);
        assert_eq!((s.total, s.completed, s.remaining), (4, 1, 3));
        assert_eq!(s.completion_rate, 25);
        assert_eq!(s.next_up.unwrap().task.id, "soon");
        assert_eq!(s.missed.len(), 1);
        assert_eq!(s.missed[0].task.id, "missed");
    }

    #[test]
    fn rate_rounds_to_nearest() {
        let items = vec![occ("a", true, 0), occ("b", true, 0), occ("c", false, 5)];
        assert_eq!(TodaySummary::from_occurrences(&items).completion_rate, 67);
    }

    #[test]
    fn next_up_tie_keeps_first() {
        let items = vec![occ("first", false, 30), occ("second", false, 30)];
        assert_eq!(TodaySummary::from_occurrences(&items).next_up.unwrap().task.id, "first");
    }
}
