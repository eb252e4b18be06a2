//! # Studymate Core Library
//!
//! This library provides the core logic for the Studymate study planner.
//! Every operation is available through the standalone `studymate` CLI binary,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timetable**: A pure generator that spreads remaining study hours of
//!   pending deadlines over a short horizon of days, using urgency tiers
//! - **Planner**: Reads deadlines, proposes a plan and applies it to the
//!   user's calendar through storage traits
//! - **Timer**: Catalogue of study timers and the session log statistics
//! - **Storage**: SQLite-based persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimetableGenerator`]: Deadline to day-by-day plan allocation
//! - [`Database`]: Deadline, calendar and study session persistence
//! - [`Config`]: Application configuration management

pub mod deadline;
pub mod error;
pub mod planner;
pub mod storage;
pub mod timer;
pub mod timetable;

pub use deadline::{Deadline, NewDeadline, Priority};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use planner::{ApplySummary, StudyContext, TimetableEntry};
pub use storage::{Config, Database};
pub use timer::{StudySession, TimerKind, TimerOutcome, TIMER_CATALOGUE};
pub use timetable::{
    DaySchedule, GeneratorConfig, PlanOutcome, ScheduledSession, SessionKind, Timetable,
    TimetableGenerator, UrgencyTier,
};
