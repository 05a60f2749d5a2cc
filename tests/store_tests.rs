use chrono::NaiveDate;
use routinely::clock::FixedClock;
use routinely::models::{parse_time, Frequency, TaskDraft, TaskPatch};
use routinely::store::{MemoryRepository, Routine};

fn routine_at(now: &str) -> Routine<MemoryRepository, FixedClock> {
    Routine::open(MemoryRepository::new(), FixedClock::at(now))
}

fn draft(title: &str, time: &str) -> TaskDraft {
    TaskDraft::new(title, parse_time(time).unwrap(), Frequency::Daily)
}

#[test]
fn test_add_assigns_id_and_timestamp() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let a = routine.add_task(draft("Stretch", "07:00")).unwrap();
    let b = routine.add_task(draft("Read", "21:30")).unwrap();
    assert_ne!(a, b);

    let task = routine.get(&a).unwrap();
    assert_eq!(task.created_at.to_rfc3339(), "2024-03-15T08:00:00+00:00");
    assert_eq!(task.last_completed_date, None);
    assert_eq!(routine.repository().stored().len(), 2);
}

#[test]
fn test_add_rejects_empty_title() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    assert!(routine.add_task(draft("  ", "07:00")).is_err());
    assert!(routine.tasks().is_empty());
    assert_eq!(routine.repository().save_count(), 0);
}

#[test]
fn test_toggle_twice_restores_state() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let id = routine.add_task(draft("Stretch", "07:00")).unwrap();

    assert!(routine.toggle_completion(&id));
    assert_eq!(routine.get(&id).unwrap().last_completed_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    assert!(routine.today_occurrences()[0].completed);

    assert!(routine.toggle_completion(&id));
    assert_eq!(routine.get(&id).unwrap().last_completed_date, None);
    assert!(!routine.today_occurrences()[0].completed);
}

#[test]
fn test_completion_does_not_carry_to_next_day() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let id = routine.add_task(draft("Stretch", "07:00")).unwrap();
    routine.toggle_completion(&id);

    let mut tomorrow = Routine::open(routine.into_repository(), FixedClock::at("2024-03-16T08:00:00"));
    assert!(!tomorrow.today_occurrences()[0].completed);

    // toggling on a new day overwrites the single completion slot
    tomorrow.toggle_completion(&id);
    assert_eq!(tomorrow.get(&id).unwrap().last_completed_date, NaiveDate::from_ymd_opt(2024, 3, 16));
}

#[test]
fn test_reset_clears_every_completion() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let ids: Vec<String> = ["06:00", "07:00", "09:00"]
        .iter()
        .map(|t| routine.add_task(draft(t, t)).unwrap())
        .collect();
    routine.toggle_completion(&ids[0]);
    routine.toggle_completion(&ids[2]);
    assert_eq!(routine.summary().completed, 2);

    routine.reset_all_completions();
    assert!(routine.today_occurrences().iter().all(|o| !o.completed));
    assert_eq!(routine.tasks().len(), 3);
}

#[test]
fn test_clear_all_empties_reads() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    routine.add_task(draft("Stretch", "07:00")).unwrap();
    routine.clear_all();
    assert!(routine.today_occurrences().is_empty());
    assert!(routine.repository().stored().is_empty());
}

#[test]
fn test_unknown_id_is_a_silent_noop() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    routine.add_task(draft("Stretch", "07:00")).unwrap();
    let saves = routine.repository().save_count();
    let before = routine.tasks();

    assert!(!routine.toggle_completion("missing"));
    assert!(!routine.remove_task("missing"));
    assert!(!routine.update_task("missing", &TaskPatch { pinned: Some(true), ..Default::default() }));

    assert_eq!(routine.repository().save_count(), saves);
    assert_eq!(*routine.tasks(), *before);
}

#[test]
fn test_update_merges_fields() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let id = routine.add_task(draft("Gym", "18:00")).unwrap();
    let patch = TaskPatch {
        frequency: Some(Frequency::Custom),
        custom_days: Some(Some(vec![1, 3, 5])),
        category: Some("Wellness".into()),
        ..Default::default()
    };
    assert!(routine.update_task(&id, &patch));

    let task = routine.get(&id).unwrap();
    assert_eq!(task.title, "Gym");
    assert_eq!(task.frequency, Frequency::Custom);
    assert_eq!(task.category, "Wellness");
    // 2024-03-15 is a Friday
    assert_eq!(routine.today_occurrences().len(), 1);
}

#[test]
fn test_remove_deletes_only_target() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let a = routine.add_task(draft("A", "07:00")).unwrap();
    let b = routine.add_task(draft("B", "08:00")).unwrap();
    assert!(routine.remove_task(&a));
    let ids: Vec<String> = routine.tasks().iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![b]);
}

#[test]
fn test_snapshots_are_not_mutated() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let id = routine.add_task(draft("Stretch", "07:00")).unwrap();
    let snapshot = routine.tasks();

    routine.toggle_completion(&id);
    routine.add_task(draft("Read", "21:30")).unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].last_completed_date, None);
    assert_eq!(routine.tasks().len(), 2);
}

#[test]
fn test_save_failure_keeps_memory_authoritative() {
    let repo = MemoryRepository::new();
    repo.set_fail_writes(true);
    let mut routine = Routine::open(repo, FixedClock::at("2024-03-15T08:00:00"));

    let id = routine.add_task(draft("Stretch", "07:00")).unwrap();
    assert!(routine.get(&id).is_some());
    assert!(routine.repository().stored().is_empty());

    routine.repository().set_fail_writes(false);
    routine.toggle_completion(&id);
    assert_eq!(routine.repository().stored().len(), 1);
}

#[test]
fn test_projection_order_from_store() {
    let mut routine = routine_at("2024-03-15T06:00:00");
    routine.add_task(draft("nine", "09:00")).unwrap();
    routine.add_task(TaskDraft { pinned: true, ..draft("seven", "07:00") }).unwrap();
    routine.add_task(draft("eight", "08:00")).unwrap();

    let titles: Vec<String> = routine.today_occurrences().into_iter().map(|o| o.task.title).collect();
    assert_eq!(titles, vec!["seven", "eight", "nine"]);
}

#[test]
fn test_resolve_id_by_prefix() {
    let mut routine = routine_at("2024-03-15T08:00:00");
    let id = routine.add_task(draft("Stretch", "07:00")).unwrap();
    assert_eq!(routine.resolve_id(&id[..6]), Some(id.clone()));
    assert_eq!(routine.resolve_id(&id), Some(id));
    assert_eq!(routine.resolve_id("zzzz"), None);
    assert_eq!(routine.resolve_id(""), None);
}
