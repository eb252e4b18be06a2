//! Deadline-driven timetable generation.
//!
//! Greedy, day-by-day allocation over a fixed horizon:
//! - Deadlines are visited earliest-due first (stable for ties)
//! - Each visit derives an urgency tier from the whole days left until due
//! - The tier fixes a per-day hour cap, a start slot and a gate on how
//!   crowded the day may already be
//! - Long days get one short break after their first session
//!
//! The generator is pure: it works on copies and never touches storage.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DaySchedule, PlanOutcome, ScheduledSession, SessionKind, Timetable};
use crate::deadline::Deadline;
use crate::error::ConfigError;

/// Session length (hours) at or above which a day gets a break.
const LONG_SESSION_HOURS: u32 = 3;

const MAX_HORIZON_DAYS: u32 = 31;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Urgency derived from days left until a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    /// Due today or overdue
    Critical,
    /// Due tomorrow
    Urgent,
    /// Due in 2-3 days
    Moderate,
    /// Due in 4-7 days
    Light,
}

impl UrgencyTier {
    /// Tier for a deadline `days_until_due` whole days away, if any.
    pub fn from_days_until_due(days_until_due: i64) -> Option<Self> {
        match days_until_due {
            d if d <= 0 => Some(UrgencyTier::Critical),
            1 => Some(UrgencyTier::Urgent),
            2..=3 => Some(UrgencyTier::Moderate),
            4..=7 => Some(UrgencyTier::Light),
            _ => None,
        }
    }

    /// Maximum hours placed for one deadline on one day.
    pub fn daily_cap_hours(&self) -> u32 {
        match self {
            UrgencyTier::Critical => 6,
            UrgencyTier::Urgent => 4,
            UrgencyTier::Moderate => 3,
            UrgencyTier::Light => 2,
        }
    }

    pub fn title_prefix(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "CRITICAL:",
            UrgencyTier::Urgent => "URGENT:",
            UrgencyTier::Moderate => "Study:",
            UrgencyTier::Light => "Review:",
        }
    }

    /// Stress label carried on sessions and persisted as entry priority.
    pub fn stress_label(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "critical",
            UrgencyTier::Urgent => "high",
            UrgencyTier::Moderate => "medium",
            UrgencyTier::Light => "low",
        }
    }

    /// Whether a session of this tier may join a day already holding
    /// `placed` study sessions.
    fn admits(&self, placed: usize) -> bool {
        match self {
            UrgencyTier::Critical | UrgencyTier::Urgent => true,
            UrgencyTier::Moderate => placed == 0,
            UrgencyTier::Light => placed < 2,
        }
    }

    fn description(&self, subject: &str, days_until_due: i64) -> String {
        match self {
            UrgencyTier::Critical => format!("Final preparation for {subject} - due today"),
            UrgencyTier::Urgent => format!("Intensive study for {subject} - due tomorrow"),
            UrgencyTier::Moderate => {
                format!("Prepare for {subject} - due in {days_until_due} days")
            }
            UrgencyTier::Light => format!("Early preparation for {subject}"),
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Days in the plan, starting at the anchor day
    pub horizon_days: u32,
    /// Length of the break inserted on long days (minutes)
    pub break_minutes: u32,
    /// Start hour for critical and urgent sessions
    pub morning_start: u32,
    /// Start hour for moderate sessions
    pub afternoon_start: u32,
    /// Start hour for light review sessions
    pub evening_start: u32,
    /// Subject used when a deadline has none
    pub default_subject: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            break_minutes: 30,
            morning_start: 9,
            afternoon_start: 14,
            evening_start: 19,
            default_subject: "Study".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Check the horizon, and that every slot filled to its tier cap, plus
    /// the break after it, ends before midnight.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let slots = [
            ("planner.morning_start", self.morning_start, UrgencyTier::Critical),
            ("planner.afternoon_start", self.afternoon_start, UrgencyTier::Moderate),
            ("planner.evening_start", self.evening_start, UrgencyTier::Light),
        ];
        for (key, start, tier) in slots {
            if start.saturating_add(tier.daily_cap_hours()) >= 24 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!(
                        "a {}h session starting at {start:02}:00 would cross midnight",
                        tier.daily_cap_hours()
                    ),
                });
            }
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(ConfigError::InvalidValue {
                key: "planner.horizon_days".to_string(),
                message: format!("must be between 1 and {MAX_HORIZON_DAYS}"),
            });
        }
        // The break starts when the first session ends, at the latest when a
        // slot is filled to its cap.
        let latest_first_end = slots
            .iter()
            .map(|(_, start, tier)| start + tier.daily_cap_hours())
            .max()
            .unwrap_or(0);
        if (latest_first_end * 60).saturating_add(self.break_minutes) >= 24 * 60 {
            return Err(ConfigError::InvalidValue {
                key: "planner.break_minutes".to_string(),
                message: format!(
                    "a {}min break after a session ending at {latest_first_end:02}:00 would cross midnight",
                    self.break_minutes
                ),
            });
        }
        Ok(())
    }

    fn slot_start(&self, tier: UrgencyTier) -> NaiveTime {
        let hour = match tier {
            UrgencyTier::Critical | UrgencyTier::Urgent => self.morning_start,
            UrgencyTier::Moderate => self.afternoon_start,
            UrgencyTier::Light => self.evening_start,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Whole days from `at` until `due`, rounded down.
///
/// Counts 24h periods from the anchor's time of day, so a deadline due in
/// 22 hours is 0 days away even when it falls on the next calendar date,
/// and anything already overdue is negative.
fn days_until_due(due: NaiveDateTime, at: NaiveDateTime) -> i64 {
    (due - at).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Working copy of a deadline during one run.
struct Pending<'a> {
    deadline: &'a Deadline,
    remaining_hours: u32,
}

/// Deadline-driven timetable generator
pub struct TimetableGenerator {
    config: GeneratorConfig,
}

impl Default for TimetableGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableGenerator {
    /// Create a new generator with default config
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    /// Create with custom config
    ///
    /// # Errors
    /// Returns an error if the config fails [`GeneratorConfig::validate`].
    pub fn with_config(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Generate a plan for `deadlines` starting on the anchor's date.
    ///
    /// Day `i` is evaluated at `anchor + i days`, so urgency depends on the
    /// anchor's time of day as well as its date.
    ///
    /// Completed deadlines and deadlines without remaining hours are ignored;
    /// if nothing is left the result reports [`PlanOutcome::NothingToSchedule`].
    pub fn generate(&self, deadlines: &[Deadline], anchor: NaiveDateTime) -> Timetable {
        let mut pending: Vec<Pending<'_>> = deadlines
            .iter()
            .filter(|d| d.is_schedulable())
            .map(|deadline| Pending {
                deadline,
                remaining_hours: deadline.remaining_hours,
            })
            .collect();

        if pending.is_empty() {
            tracing::info!("no pending deadlines with hours left, nothing to schedule");
            return Timetable::nothing_to_schedule();
        }

        // Vec::sort_by_key is stable, ties keep input order.
        pending.sort_by_key(|p| p.deadline.due_date);

        let subjects: Vec<String> = pending
            .iter()
            .map(|p| p.deadline.subject.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut days = Vec::with_capacity(self.config.horizon_days as usize);
        for offset in 0..self.config.horizon_days {
            let day_anchor = anchor + Duration::days(i64::from(offset));
            days.push(self.plan_day(&mut pending, day_anchor, offset as u8));
        }

        let total_sessions: usize = days.iter().map(|d| d.study_sessions().count()).sum();
        let total_hours: f64 = days
            .iter()
            .flat_map(|d| d.study_sessions())
            .map(ScheduledSession::study_hours)
            .sum();

        tracing::info!(
            deadlines = pending.len(),
            total_sessions,
            total_hours,
            "generated timetable"
        );

        Timetable {
            outcome: PlanOutcome::Planned,
            total_sessions,
            total_hours,
            subjects,
            days,
            generated_at: Utc::now(),
        }
    }

    fn plan_day(
        &self,
        pending: &mut [Pending<'_>],
        day_anchor: NaiveDateTime,
        day_index: u8,
    ) -> DaySchedule {
        let date = day_anchor.date();
        let mut day = DaySchedule::new(date);

        for item in pending.iter_mut() {
            if item.remaining_hours == 0 {
                continue;
            }
            let days_left = days_until_due(item.deadline.due_date, day_anchor);
            let Some(tier) = UrgencyTier::from_days_until_due(days_left) else {
                continue;
            };
            if !tier.admits(day.sessions.len()) {
                tracing::debug!(
                    deadline = item.deadline.id,
                    day = %date,
                    ?tier,
                    "day too full for tier, skipping"
                );
                continue;
            }

            let hours = tier.daily_cap_hours().min(item.remaining_hours);
            item.remaining_hours -= hours;
            let session = self.session_for(item.deadline, tier, hours, days_left, day_index);
            day.sessions.push(session);

            tracing::debug!(
                deadline = item.deadline.id,
                day = %date,
                days_left,
                ?tier,
                hours,
                remaining = item.remaining_hours,
                "allocated study hours"
            );
        }

        self.insert_break(&mut day, day_index);
        day
    }

    fn session_for(
        &self,
        deadline: &Deadline,
        tier: UrgencyTier,
        hours: u32,
        days_until_due: i64,
        day_index: u8,
    ) -> ScheduledSession {
        let subject = if deadline.subject.trim().is_empty() {
            tracing::warn!(deadline = deadline.id, "deadline has no subject, using default");
            self.config.default_subject.clone()
        } else {
            deadline.subject.clone()
        };
        let start = self.config.slot_start(tier);
        ScheduledSession {
            day_index,
            start,
            end: start + Duration::hours(i64::from(hours)),
            title: format!("{} {}", tier.title_prefix(), deadline.title),
            description: tier.description(&subject, days_until_due),
            subject,
            duration_minutes: hours * 60,
            priority: tier.stress_label().to_string(),
            kind: SessionKind::Study,
            deadline_id: Some(deadline.id),
        }
    }

    fn insert_break(&self, day: &mut DaySchedule, day_index: u8) {
        let long_day = day
            .sessions
            .iter()
            .any(|s| s.duration_minutes >= LONG_SESSION_HOURS * 60);
        if !long_day {
            return;
        }
        let Some(first) = day.sessions.first() else {
            return;
        };
        let start = first.end;
        day.sessions.insert(
            1,
            ScheduledSession {
                day_index,
                start,
                end: start + Duration::minutes(i64::from(self.config.break_minutes)),
                title: "Study Break".to_string(),
                subject: String::new(),
                description: "Rest and refresh".to_string(),
                duration_minutes: self.config.break_minutes,
                priority: "low".to_string(),
                kind: SessionKind::Break,
                deadline_id: None,
            },
        );
        tracing::debug!(day = %day.date, "inserted study break");
    }
}
