//! Study timers and the session log.
//!
//! Timers themselves run on the client; the core only records when a session
//! started and how it ended, and aggregates statistics from that log.

mod stats;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use stats::{
    daily_minutes, dashboard_summary, timer_usage, DailyMinutes, DashboardSummary, TimerUsage,
};

/// A timer offered to students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerKind {
    pub name: &'static str,
    pub slug: &'static str,
    pub default_minutes: u32,
}

/// Timers shown on the timer page, in display order.
pub const TIMER_CATALOGUE: &[TimerKind] = &[
    TimerKind { name: "Pomodoro Timer", slug: "pomodoro", default_minutes: 25 },
    TimerKind { name: "Deep Focus Timer", slug: "deep-focus", default_minutes: 90 },
    TimerKind { name: "52-17 Timer", slug: "52-17", default_minutes: 52 },
    TimerKind { name: "Timeboxing Timer", slug: "timeboxing", default_minutes: 30 },
    TimerKind { name: "Flowtime Timer", slug: "flowtime", default_minutes: 45 },
    TimerKind { name: "Exam Countdown Timer", slug: "exam-countdown", default_minutes: 60 },
    TimerKind { name: "Group Study Sync Timer", slug: "group-study", default_minutes: 50 },
    TimerKind { name: "Night Study Timer", slug: "night-study", default_minutes: 40 },
    TimerKind { name: "Micro-Session Timer", slug: "micro-session", default_minutes: 10 },
    TimerKind { name: "Custom Smart Timer", slug: "custom-smart", default_minutes: 30 },
];

/// Look a timer up by slug or display name, ignoring case.
pub fn find_timer(key: &str) -> Option<&'static TimerKind> {
    let key = key.trim();
    TIMER_CATALOGUE
        .iter()
        .find(|t| t.slug.eq_ignore_ascii_case(key) || t.name.eq_ignore_ascii_case(key))
}

/// One logged timer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub user_id: i64,
    pub timer_type: String,
    pub planned_minutes: u32,
    pub completed_seconds: u64,
    pub interruptions: u32,
    pub focus_score: f64,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
}

impl StudySession {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// How a timer run ended, as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TimerOutcome {
    pub completed_seconds: u64,
    #[serde(default)]
    pub interruptions: u32,
    #[serde(default)]
    pub focus_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_lookup_by_slug_or_name() {
        assert_eq!(find_timer("pomodoro").map(|t| t.default_minutes), Some(25));
        assert_eq!(find_timer("deep focus timer").map(|t| t.slug), Some("deep-focus"));
        assert!(find_timer("egg timer").is_none());
    }

    #[test]
    fn catalogue_slugs_are_unique() {
        let mut slugs: Vec<_> = TIMER_CATALOGUE.iter().map(|t| t.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), TIMER_CATALOGUE.len());
    }
}
