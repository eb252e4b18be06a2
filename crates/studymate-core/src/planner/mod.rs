//! Generate and apply study plans.
//!
//! The planner sits between the pure [`TimetableGenerator`] and storage:
//! - [`generate`] reads a user's pending deadlines and proposes a plan
//! - [`apply`] replaces the user's calendar with a (possibly edited) plan
//!
//! Storage is reached only through the [`DeadlineSource`] and
//! [`TimetableSink`] traits, implemented by [`crate::storage::Database`].

mod context;
mod entry;

use serde::{Deserialize, Serialize};

pub use context::StudyContext;
pub use entry::{resolve_entries, NewTimetableEntry, TimetableEntry, ENTRY_TYPE_STUDY};

use crate::deadline::Deadline;
use crate::error::Result;
use crate::timetable::{GeneratorConfig, Timetable, TimetableGenerator};

/// Read side: where pending deadlines come from.
pub trait DeadlineSource {
    /// All non-completed deadlines of `user_id`, earliest due first.
    fn pending_deadlines(&self, user_id: i64) -> Result<Vec<Deadline>>;
}

/// Write side: where applied plans go.
pub trait TimetableSink {
    /// Delete every entry of `user_id`, then insert `entries`.
    ///
    /// Returns the number of inserted entries.
    fn replace_timetable(&mut self, user_id: i64, entries: &[NewTimetableEntry]) -> Result<usize>;

    /// Entries of `user_id`, ordered by start time then insertion.
    fn timetable_entries(&self, user_id: i64) -> Result<Vec<TimetableEntry>>;
}

/// What an apply did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub inserted: usize,
    pub skipped_breaks: usize,
}

/// Propose a plan from the user's pending deadlines.
///
/// Reads from `source` and never writes; deadline budgets in the store are
/// left untouched. An empty deadline list yields a plan whose outcome is
/// `NothingToSchedule`.
///
/// # Errors
/// Returns an error if the config is invalid or the source fails.
pub fn generate<S: DeadlineSource + ?Sized>(
    ctx: &StudyContext,
    source: &S,
    config: &GeneratorConfig,
) -> Result<Timetable> {
    let generator = TimetableGenerator::with_config(config.clone())?;
    let deadlines = source.pending_deadlines(ctx.user_id)?;
    tracing::debug!(user_id = ctx.user_id, count = deadlines.len(), "loaded pending deadlines");
    Ok(generator.generate(&deadlines, ctx.now))
}

/// Persist `timetable` as the user's calendar, replacing any previous plan.
///
/// Break sessions are not persisted. Applying a plan with no study sessions
/// clears the calendar.
///
/// # Errors
/// Returns a validation error for malformed sessions (nothing is written),
/// or the sink's error if the replacement fails.
pub fn apply<S: TimetableSink + ?Sized>(
    ctx: &StudyContext,
    sink: &mut S,
    timetable: &Timetable,
    default_subject: &str,
) -> Result<ApplySummary> {
    let entries = resolve_entries(ctx.user_id, timetable, default_subject)?;
    let skipped_breaks = timetable
        .days
        .iter()
        .flat_map(|d| d.sessions.iter())
        .filter(|s| s.is_break())
        .count();

    let inserted = sink.replace_timetable(ctx.user_id, &entries)?;
    tracing::info!(user_id = ctx.user_id, inserted, skipped_breaks, "applied timetable");

    Ok(ApplySummary {
        inserted,
        skipped_breaks,
    })
}
