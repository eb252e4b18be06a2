//! Integration tests for the study timer log and its statistics.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use studymate_core::storage::Database;
use studymate_core::timer::{self, dashboard_summary, daily_minutes, find_timer, timer_usage};
use studymate_core::{CoreError, StudyContext, TimerOutcome, ValidationError};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn run_timer(db: &Database, user_id: i64, slug: &str, start: NaiveDateTime, minutes: u64) -> i64 {
    let kind = find_timer(slug).unwrap();
    let id = db
        .start_study_session(&StudyContext::new(user_id, start), kind.name, kind.default_minutes)
        .unwrap();
    let end = StudyContext::new(user_id, start + Duration::minutes(minutes as i64));
    db.end_study_session(
        &end,
        id,
        &TimerOutcome {
            completed_seconds: minutes * 60,
            interruptions: 1,
            focus_score: 80.0,
        },
    )
    .unwrap();
    id
}

#[test]
fn test_log_feeds_dashboard_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("studymate.db")).unwrap();

    run_timer(&db, 1, "pomodoro", at(17, 9), 25);
    run_timer(&db, 1, "deep-focus", at(18, 9), 90);
    run_timer(&db, 1, "pomodoro", at(19, 9), 25);
    run_timer(&db, 1, "pomodoro", at(19, 11), 20);
    run_timer(&db, 2, "flowtime", at(19, 9), 45);

    let sessions = db.study_sessions(1).unwrap();
    assert_eq!(sessions.len(), 4);
    assert!(sessions.iter().all(|s| !s.is_open()));

    let usage = timer_usage(&sessions);
    assert_eq!(usage.len(), 2);
    assert_eq!(usage[1].timer_type, "Pomodoro Timer");
    assert_eq!(usage[1].total_minutes, 70);
    assert_eq!(usage[1].sessions, 3);

    let today = at(19, 0).date();
    let daily = daily_minutes(&sessions, today, 7);
    assert_eq!(daily[0].minutes, 45);
    assert_eq!(daily[1].minutes, 90);

    let summary = dashboard_summary(&sessions, today);
    assert_eq!(summary.streak_days, 3);
    assert_eq!(summary.today_hours, 0.8);
    assert_eq!(summary.total_hours, 2.7);
    assert_eq!(summary.last_timer.as_deref(), Some("Pomodoro Timer"));
}

#[test]
fn test_sessions_cannot_be_ended_twice_or_by_another_user() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("studymate.db")).unwrap();

    let ctx = StudyContext::new(1, at(19, 9));
    let id = db.start_study_session(&ctx, "Pomodoro Timer", 25).unwrap();

    let intruder = StudyContext::new(2, at(19, 10));
    let err = db
        .end_study_session(&intruder, id, &TimerOutcome::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::NotFound { .. })
    ));

    db.end_study_session(&ctx, id, &TimerOutcome::default()).unwrap();
    let err = db
        .end_study_session(&ctx, id, &TimerOutcome::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn test_catalogue_lists_ten_timers() {
    assert_eq!(timer::TIMER_CATALOGUE.len(), 10);
    assert_eq!(find_timer("Night Study Timer").unwrap().default_minutes, 40);
    assert!(find_timer("egg timer").is_none());
}
