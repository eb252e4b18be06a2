//! Deadline records and priority tiers.
//!
//! A deadline is a user task with a due date and a study-hour budget that the
//! timetable generator spreads over the days before it is due.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage format for wall-clock timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// User-set priority of a deadline.
///
/// Distinct from the urgency tier the generator derives from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Parse a priority label, falling back to `Medium` for anything unknown.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            other => {
                tracing::warn!(priority = other, "unknown priority, using medium");
                Priority::Medium
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// May be empty; consumers substitute a default subject.
    pub subject: String,
    pub due_date: NaiveDateTime,
    pub priority: Priority,
    /// Study hours still to allocate before the due date.
    pub remaining_hours: u32,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Deadline {
    /// Whether the generator should consider this deadline at all.
    pub fn is_schedulable(&self) -> bool {
        !self.completed && self.remaining_hours > 0
    }
}

/// Fields supplied when creating a deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeadline {
    pub user_id: i64,
    pub title: String,
    pub subject: String,
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub priority: Priority,
    pub study_hours: u32,
    #[serde(default)]
    pub description: String,
}

/// Parse a due date in any of the accepted input shapes.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the same with a `T` separator, or a bare
/// `YYYY-MM-DD` (interpreted as 23:59 that day).
pub fn parse_due_date(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.trim().replacen('T', " ", 1);
    for fmt in [DATETIME_FORMAT, "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 0))
}
