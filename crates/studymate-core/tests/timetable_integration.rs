//! Integration tests for the generate/apply workflow against a real
//! database file.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use studymate_core::planner::{self, TimetableSink};
use studymate_core::storage::{Config, Database};
use studymate_core::{NewDeadline, Priority, StudyContext, Timetable};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn open_db(dir: &tempfile::TempDir) -> Database {
    Database::open_at(&dir.path().join("studymate.db")).unwrap()
}

fn add(db: &Database, user_id: i64, title: &str, subject: &str, due: NaiveDateTime, hours: u32) -> i64 {
    db.add_deadline(&NewDeadline {
        user_id,
        title: title.to_string(),
        subject: subject.to_string(),
        due_date: due,
        priority: Priority::High,
        study_hours: hours,
        description: String::new(),
    })
    .unwrap()
}

#[test]
fn test_generate_and_apply_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let essay = add(&db, 1, "Essay", "History", at(21, 17), 10);
    let lab = add(&db, 1, "Lab report", "Chemistry", at(26, 12), 3);

    // Monday morning.
    let ctx = StudyContext::new(1, at(19, 8));
    let config = Config::default().planner.generator_config();
    let plan = planner::generate(&ctx, &db, &config).unwrap();

    assert!(!plan.is_nothing_to_schedule());
    assert_eq!(plan.days.len(), 7);
    assert_eq!(plan.total_sessions, 5);
    assert_eq!(plan.total_hours, 13.0);
    assert_eq!(plan.subjects, vec!["Chemistry", "History"]);
    assert_eq!(plan.hours_for_deadline(essay), 10.0);
    assert_eq!(plan.hours_for_deadline(lab), 3.0);

    // Monday: essay is two days out, afternoon slot; lab fills the evening.
    let monday = &plan.days[0];
    assert_eq!(monday.day_name, "Monday");
    assert_eq!(monday.sessions.len(), 3);
    assert_eq!(monday.sessions[0].title, "Study: Essay");
    assert_eq!(monday.sessions[0].start, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    assert!(monday.sessions[1].is_break());
    assert_eq!(monday.sessions[1].start, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
    assert_eq!(monday.sessions[2].title, "Review: Lab report");

    // Wednesday: essay due today gets the rest of its budget.
    let wednesday = &plan.days[2];
    assert_eq!(wednesday.sessions[0].title, "CRITICAL: Essay");
    assert_eq!(wednesday.sessions[0].duration_minutes, 180);

    // Generating never consumes stored budgets.
    assert_eq!(db.get_deadline(essay).unwrap().unwrap().remaining_hours, 10);

    let summary = planner::apply(&ctx, &mut db, &plan, &config.default_subject).unwrap();
    assert_eq!(summary.inserted, 5);
    assert_eq!(summary.skipped_breaks, 3);

    let entries = db.timetable_entries(1).unwrap();
    let planned: Vec<_> = plan
        .study_sessions()
        .map(|(day, s)| (s.title.clone(), day.date.and_time(s.start), day.date.and_time(s.end)))
        .collect();
    let stored: Vec<_> = entries
        .iter()
        .map(|e| (e.title.clone(), e.start_time, e.end_time))
        .collect();
    assert_eq!(stored, planned);
    assert!(entries.iter().all(|e| e.entry_type == "study"));
    assert_eq!(entries[0].start_time, at(19, 14));
}

#[test]
fn test_apply_replaces_previous_plan_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = StudyContext::new(1, at(19, 8));
    let config = Config::default().planner.generator_config();

    {
        let mut db = open_db(&dir);
        add(&db, 1, "Quiz", "Physics", at(20, 9), 2);
        let plan = planner::generate(&ctx, &db, &config).unwrap();
        planner::apply(&ctx, &mut db, &plan, "Study").unwrap();
        assert_eq!(db.timetable_entries(1).unwrap().len(), 1);
    }

    let mut db = open_db(&dir);
    assert_eq!(db.timetable_entries(1).unwrap().len(), 1);

    add(&db, 1, "Project", "Physics", at(24, 9), 4);
    let plan = planner::generate(&ctx, &db, &config).unwrap();
    let summary = planner::apply(&ctx, &mut db, &plan, "Study").unwrap();

    let entries = db.timetable_entries(1).unwrap();
    assert_eq!(entries.len(), summary.inserted);
    assert_eq!(entries.len(), plan.total_sessions);
}

#[test]
fn test_applying_an_empty_plan_clears_the_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let ctx = StudyContext::new(1, at(19, 8));
    let config = Config::default().planner.generator_config();

    let id = add(&db, 1, "Quiz", "Physics", at(20, 9), 2);
    let plan = planner::generate(&ctx, &db, &config).unwrap();
    planner::apply(&ctx, &mut db, &plan, "Study").unwrap();

    db.set_completed(id, true).unwrap();
    let plan = planner::generate(&ctx, &db, &config).unwrap();
    assert!(plan.is_nothing_to_schedule());
    assert_eq!(plan.total_sessions, 0);
    assert!(plan.days.is_empty());

    let summary = planner::apply(&ctx, &mut db, &plan, "Study").unwrap();
    assert_eq!(summary.inserted, 0);
    assert!(db.timetable_entries(1).unwrap().is_empty());
}

#[test]
fn test_users_do_not_see_each_others_plans() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let config = Config::default().planner.generator_config();

    add(&db, 1, "Essay", "History", at(21, 17), 4);
    add(&db, 2, "Thesis", "Sociology", at(22, 17), 8);

    let alice = StudyContext::new(1, at(19, 8));
    let bob = StudyContext::new(2, at(19, 8));

    let plan = planner::generate(&alice, &db, &config).unwrap();
    assert_eq!(plan.subjects, vec!["History"]);
    planner::apply(&alice, &mut db, &plan, "Study").unwrap();

    let plan = planner::generate(&bob, &db, &config).unwrap();
    planner::apply(&bob, &mut db, &plan, "Study").unwrap();

    assert!(db
        .timetable_entries(1)
        .unwrap()
        .iter()
        .all(|e| e.title.ends_with("Essay")));
    assert!(db
        .timetable_entries(2)
        .unwrap()
        .iter()
        .all(|e| e.title.ends_with("Thesis")));
}

#[test]
fn test_client_edited_plan_is_applied_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let ctx = StudyContext::new(1, at(19, 8));

    let json = r#"{
        "total_sessions": 1,
        "total_hours": 1.5,
        "subjects": [],
        "days": [{
            "date": "2026-10-20",
            "day_name": "Tuesday",
            "sessions": [
                {"day_index": 1, "start": "10:30", "end": "12:00",
                 "title": "Revision", "duration_minutes": 90},
                {"day_index": 1, "start": "12:00", "end": "12:30",
                 "title": "Study Break", "duration_minutes": 30, "kind": "break"}
            ]
        }]
    }"#;
    let plan: Timetable = serde_json::from_str(json).unwrap();

    let summary = planner::apply(&ctx, &mut db, &plan, "General").unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped_breaks, 1);

    let entries = db.timetable_entries(1).unwrap();
    assert_eq!(entries[0].subject, "General");
    assert_eq!(entries[0].priority, "medium");
    assert_eq!(entries[0].start_time, at(20, 10) + chrono::Duration::minutes(30));
}
