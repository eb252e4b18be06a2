use clap::Subcommand;
use serde::Serialize;
use studymate_core::storage::Database;
use studymate_core::timer::{self, DailyMinutes, TimerUsage};
use studymate_core::{Config, TimerOutcome, ValidationError};

use super::study_context;

#[derive(Subcommand)]
pub enum TimerAction {
    /// List available timers
    Types,
    /// Log the start of a timer session
    Start {
        /// Timer slug or name (defaults to timers.default_timer)
        timer: Option<String>,
        /// Planned minutes (defaults to the timer's own length)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Log the end of a timer session
    End {
        /// Session ID printed by `timer start`
        id: i64,
        /// Seconds actually studied
        #[arg(long)]
        seconds: u64,
        /// Number of interruptions
        #[arg(long, default_value_t = 0)]
        interruptions: u32,
        /// Self-reported focus score (0-100)
        #[arg(long, default_value_t = 0.0)]
        focus: f64,
    },
    /// Per timer usage and the last 7 days as JSON
    Stats,
    /// Dashboard summary as JSON
    Summary,
}

#[derive(Serialize)]
struct TimerStats {
    usage: Vec<TimerUsage>,
    daily: Vec<DailyMinutes>,
}

pub fn run(action: TimerAction, user: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let ctx = study_context(user, &config);
    let db = Database::open()?;

    match action {
        TimerAction::Types => {
            println!("{}", serde_json::to_string_pretty(timer::TIMER_CATALOGUE)?);
        }
        TimerAction::Start { timer, minutes } => {
            let key = timer.unwrap_or_else(|| config.timers.default_timer.clone());
            let kind = timer::find_timer(&key).ok_or_else(|| ValidationError::InvalidValue {
                field: "timer".to_string(),
                message: format!("unknown timer '{key}', see `studymate timer types`"),
            })?;
            let planned = minutes.unwrap_or(kind.default_minutes);
            let id = db.start_study_session(&ctx, kind.name, planned)?;
            println!("Timer started: {id}");
        }
        TimerAction::End {
            id,
            seconds,
            interruptions,
            focus,
        } => {
            let outcome = TimerOutcome {
                completed_seconds: seconds,
                interruptions,
                focus_score: focus,
            };
            let session = db.end_study_session(&ctx, id, &outcome)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        TimerAction::Stats => {
            let sessions = db.study_sessions(ctx.user_id)?;
            let stats = TimerStats {
                usage: timer::timer_usage(&sessions),
                daily: timer::daily_minutes(&sessions, ctx.now.date(), 7),
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        TimerAction::Summary => {
            let sessions = db.study_sessions(ctx.user_id)?;
            let summary = timer::dashboard_summary(&sessions, ctx.now.date());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
