//! Persisted calendar entries and their resolution from a plan.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timetable::Timetable;

/// Entry type recorded for applied study sessions.
pub const ENTRY_TYPE_STUDY: &str = "study";

/// A calendar entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub subject: String,
    pub description: String,
    pub duration_minutes: u32,
    pub priority: String,
    pub entry_type: String,
    pub created_at: DateTime<Utc>,
}

/// A calendar entry ready to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimetableEntry {
    pub user_id: i64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub subject: String,
    pub description: String,
    pub duration_minutes: u32,
    pub priority: String,
    pub entry_type: String,
}

/// Turn every non-break session of `timetable` into an absolute entry.
///
/// Start and end are the session's day plus its time of day. Sessions with no
/// subject get `default_subject`.
///
/// # Errors
/// Returns `ValidationError::InvalidTimeRange` for a session that does not
/// end after it starts (possible only in client-edited plans).
pub fn resolve_entries(
    user_id: i64,
    timetable: &Timetable,
    default_subject: &str,
) -> Result<Vec<NewTimetableEntry>, ValidationError> {
    timetable
        .study_sessions()
        .map(|(day, session)| {
            let start_time = day.date.and_time(session.start);
            let end_time = day.date.and_time(session.end);
            if end_time <= start_time {
                return Err(ValidationError::InvalidTimeRange {
                    start: start_time,
                    end: end_time,
                });
            }
            let subject = if session.subject.trim().is_empty() {
                default_subject.to_string()
            } else {
                session.subject.clone()
            };
            Ok(NewTimetableEntry {
                user_id,
                title: session.title.clone(),
                start_time,
                end_time,
                subject,
                description: session.description.clone(),
                duration_minutes: session.duration_minutes,
                priority: session.priority.clone(),
                entry_type: ENTRY_TYPE_STUDY.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{DaySchedule, PlanOutcome, ScheduledSession, SessionKind};
    use chrono::{NaiveDate, NaiveTime};

    fn session(start: u32, end: u32, kind: SessionKind, subject: &str) -> ScheduledSession {
        ScheduledSession {
            day_index: 1,
            start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            title: "URGENT: Essay".to_string(),
            subject: subject.to_string(),
            description: "Intensive study".to_string(),
            duration_minutes: (end.saturating_sub(start)) * 60,
            priority: "high".to_string(),
            kind,
            deadline_id: Some(4),
        }
    }

    fn plan(sessions: Vec<ScheduledSession>) -> Timetable {
        let mut day = DaySchedule::new(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        day.sessions = sessions;
        Timetable {
            outcome: PlanOutcome::Planned,
            total_sessions: 0,
            total_hours: 0.0,
            subjects: vec![],
            days: vec![day],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn resolves_absolute_times_and_skips_breaks() {
        let timetable = plan(vec![
            session(9, 13, SessionKind::Study, "English"),
            session(13, 14, SessionKind::Break, ""),
            session(14, 16, SessionKind::Study, ""),
        ]);
        let entries = resolve_entries(3, &timetable, "Study").unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.user_id, 3);
        assert_eq!(
            first.start_time,
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap().and_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            first.end_time,
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap().and_hms_opt(13, 0, 0).unwrap()
        );
        assert_eq!(first.priority, "high");
        assert_eq!(first.entry_type, "study");
        assert_eq!(entries[1].subject, "Study");
    }

    #[test]
    fn rejects_inverted_sessions() {
        let timetable = plan(vec![session(16, 14, SessionKind::Study, "Maths")]);
        assert!(matches!(
            resolve_entries(1, &timetable, "Study"),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }
}
