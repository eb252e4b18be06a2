//! Statistics over the study session log.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::StudySession;

/// Time spent with one timer type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerUsage {
    pub timer_type: String,
    pub total_minutes: u64,
    pub sessions: u64,
}

/// Minutes studied on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMinutes {
    pub date: NaiveDate,
    /// Abbreviated weekday, e.g. "Mon".
    pub weekday: String,
    pub minutes: u64,
}

/// Headline numbers for the student dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardSummary {
    /// All-time hours, rounded to one decimal.
    pub total_hours: f64,
    /// Hours completed today, rounded to one decimal.
    pub today_hours: f64,
    /// Consecutive days with completed study time.
    pub streak_days: u32,
    pub last_timer: Option<String>,
}

/// Per timer type totals, ordered by timer type.
pub fn timer_usage(sessions: &[StudySession]) -> Vec<TimerUsage> {
    let mut by_type: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for s in sessions {
        let entry = by_type.entry(s.timer_type.as_str()).or_default();
        entry.0 += s.completed_seconds;
        entry.1 += 1;
    }
    by_type
        .into_iter()
        .map(|(timer_type, (seconds, count))| TimerUsage {
            timer_type: timer_type.to_string(),
            total_minutes: seconds / 60,
            sessions: count,
        })
        .collect()
}

/// Minutes per day for the `days` days ending at `today` (index 0 = today).
pub fn daily_minutes(sessions: &[StudySession], today: NaiveDate, days: u32) -> Vec<DailyMinutes> {
    (0..days)
        .map(|i| {
            let date = today - Duration::days(i64::from(i));
            let seconds: u64 = sessions
                .iter()
                .filter(|s| s.started_at.date() == date)
                .map(|s| s.completed_seconds)
                .sum();
            DailyMinutes {
                date,
                weekday: date.format("%a").to_string(),
                minutes: seconds / 60,
            }
        })
        .collect()
}

/// Dashboard numbers as of `today`.
///
/// The streak counts back from today, or from yesterday when nothing has
/// been completed yet today.
pub fn dashboard_summary(sessions: &[StudySession], today: NaiveDate) -> DashboardSummary {
    let total_seconds: u64 = sessions.iter().map(|s| s.completed_seconds).sum();
    let today_seconds: u64 = sessions
        .iter()
        .filter(|s| s.started_at.date() == today)
        .map(|s| s.completed_seconds)
        .sum();

    let active_days: HashSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.completed_seconds > 0)
        .map(|s| s.started_at.date())
        .collect();
    let mut cursor = if active_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak_days = 0;
    while active_days.contains(&cursor) {
        streak_days += 1;
        cursor -= Duration::days(1);
    }

    let last_timer = sessions
        .iter()
        .max_by_key(|s| (s.started_at, s.id))
        .map(|s| s.timer_type.clone());

    DashboardSummary {
        total_hours: round_tenths(total_seconds as f64 / 3600.0),
        today_hours: round_tenths(today_seconds as f64 / 3600.0),
        streak_days,
        last_timer,
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn session(id: i64, timer: &str, on: NaiveDate, seconds: u64) -> StudySession {
        StudySession {
            id,
            user_id: 1,
            timer_type: timer.to_string(),
            planned_minutes: 25,
            completed_seconds: seconds,
            interruptions: 0,
            focus_score: 0.0,
            started_at: on.and_hms_opt(10, 0, 0).unwrap(),
            ended_at: None,
        }
    }

    #[test]
    fn usage_groups_by_timer_type() {
        let sessions = vec![
            session(1, "Pomodoro Timer", day(19), 1500),
            session(2, "Pomodoro Timer", day(18), 1500),
            session(3, "Deep Focus Timer", day(18), 5400),
        ];
        let usage = timer_usage(&sessions);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].timer_type, "Deep Focus Timer");
        assert_eq!(usage[0].total_minutes, 90);
        assert_eq!(usage[1].sessions, 2);
        assert_eq!(usage[1].total_minutes, 50);
    }

    #[test]
    fn daily_minutes_cover_the_last_week() {
        let sessions = vec![
            session(1, "Pomodoro Timer", day(19), 1500),
            session(2, "Pomodoro Timer", day(17), 600),
            session(3, "Pomodoro Timer", day(1), 600),
        ];
        let daily = daily_minutes(&sessions, day(19), 7);
        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0].weekday, "Mon");
        assert_eq!(daily[0].minutes, 25);
        assert_eq!(daily[1].minutes, 0);
        assert_eq!(daily[2].minutes, 10);
        assert_eq!(daily.iter().map(|d| d.minutes).sum::<u64>(), 35);
    }

    #[test]
    fn summary_counts_streak_and_rounds_hours() {
        let sessions = vec![
            session(1, "Pomodoro Timer", day(16), 3600),
            session(2, "Pomodoro Timer", day(17), 3600),
            session(3, "Deep Focus Timer", day(18), 5400),
            session(4, "Pomodoro Timer", day(14), 0),
        ];
        let summary = dashboard_summary(&sessions, day(19));
        assert_eq!(summary.total_hours, 3.5);
        assert_eq!(summary.today_hours, 0.0);
        // Nothing yet today, so the streak runs 18, 17, 16.
        assert_eq!(summary.streak_days, 3);
        assert_eq!(summary.last_timer.as_deref(), Some("Deep Focus Timer"));
    }

    #[test]
    fn empty_log_summary() {
        let summary = dashboard_summary(&[], day(19));
        assert_eq!(summary, DashboardSummary::default());
    }
}
