//! Study timetable types.
//!
//! A [`Timetable`] is the generated (or client-edited) plan: one
//! [`DaySchedule`] per day of the horizon, each holding the study sessions
//! and breaks placed on that day, plus aggregate totals.

pub mod generator;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub use generator::{GeneratorConfig, TimetableGenerator, UrgencyTier};

/// Whether a scheduled session is study time or a rest break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Study,
    Break,
}

/// One block on a day of the timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    /// Offset from the generation date (0 = anchor day).
    pub day_index: u8,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    /// Stress label (critical/high/medium/low).
    #[serde(default = "default_priority_label")]
    pub priority: String,
    #[serde(default)]
    pub kind: SessionKind,
    #[serde(default)]
    pub deadline_id: Option<i64>,
}

fn default_priority_label() -> String {
    "medium".to_string()
}

impl ScheduledSession {
    pub fn is_break(&self) -> bool {
        self.kind == SessionKind::Break
    }

    /// Hours of study this session accounts for (breaks count zero).
    pub fn study_hours(&self) -> f64 {
        if self.is_break() {
            0.0
        } else {
            f64::from(self.duration_minutes) / 60.0
        }
    }
}

/// Sessions placed on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub day_name: String,
    pub sessions: Vec<ScheduledSession>,
}

impl DaySchedule {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            day_name: date.format("%A").to_string(),
            sessions: Vec::new(),
        }
    }

    pub fn study_sessions(&self) -> impl Iterator<Item = &ScheduledSession> {
        self.sessions.iter().filter(|s| !s.is_break())
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    #[default]
    Planned,
    /// No pending deadline had hours left to allocate.
    NothingToSchedule,
}

/// A generated study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default)]
    pub outcome: PlanOutcome,
    pub total_sessions: usize,
    pub total_hours: f64,
    pub subjects: Vec<String>,
    pub days: Vec<DaySchedule>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl Timetable {
    /// An empty plan reporting that there was nothing to schedule.
    pub fn nothing_to_schedule() -> Self {
        Self {
            outcome: PlanOutcome::NothingToSchedule,
            total_sessions: 0,
            total_hours: 0.0,
            subjects: Vec::new(),
            days: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn is_nothing_to_schedule(&self) -> bool {
        self.outcome == PlanOutcome::NothingToSchedule
    }

    /// All non-break sessions in plan order.
    pub fn study_sessions(&self) -> impl Iterator<Item = (&DaySchedule, &ScheduledSession)> {
        self.days
            .iter()
            .flat_map(|day| day.study_sessions().map(move |s| (day, s)))
    }

    /// Hours allocated to one deadline across the whole plan.
    pub fn hours_for_deadline(&self, deadline_id: i64) -> f64 {
        self.study_sessions()
            .filter(|(_, s)| s.deadline_id == Some(deadline_id))
            .map(|(_, s)| s.study_hours())
            .sum()
    }

    /// Parse a plan as printed by `timetable generate --json`, possibly
    /// edited by hand.
    ///
    /// # Errors
    /// Returns `CoreError::Json` if the document does not describe a plan.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// `HH:MM` serialization for times of day.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(kind: SessionKind, minutes: u32) -> ScheduledSession {
        ScheduledSession {
            day_index: 0,
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            title: "Study: Essay".to_string(),
            subject: "History".to_string(),
            description: String::new(),
            duration_minutes: minutes,
            priority: "medium".to_string(),
            kind,
            deadline_id: Some(1),
        }
    }

    #[test]
    fn session_times_serialize_as_hh_mm() {
        let json = serde_json::to_value(session(SessionKind::Study, 60)).unwrap();
        assert_eq!(json["start"], "09:00");
        assert_eq!(json["end"], "10:00");
        assert_eq!(json["kind"], "study");
    }

    #[test]
    fn client_submitted_session_defaults() {
        let raw = r#"{"day_index":2,"start":"14:00","end":"16:00","title":"Study: Lab","duration_minutes":120}"#;
        let parsed: ScheduledSession = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.kind, SessionKind::Study);
        assert_eq!(parsed.priority, "medium");
        assert!(parsed.subject.is_empty());
        assert_eq!(parsed.deadline_id, None);
    }

    #[test]
    fn breaks_carry_no_study_hours() {
        assert_eq!(session(SessionKind::Break, 30).study_hours(), 0.0);
        assert_eq!(session(SessionKind::Study, 90).study_hours(), 1.5);
    }

    #[test]
    fn from_json_rejects_non_plans() {
        assert!(matches!(
            Timetable::from_json(r#"{"days": 3}"#),
            Err(crate::error::CoreError::Json(_))
        ));
    }

    #[test]
    fn day_name_follows_date() {
        let day = DaySchedule::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(day.day_name, "Monday");
    }
}
