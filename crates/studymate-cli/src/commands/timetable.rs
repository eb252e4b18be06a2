//! Timetable commands for CLI.

use std::path::PathBuf;

use clap::Subcommand;
use studymate_core::planner::{self, TimetableSink};
use studymate_core::storage::Database;
use studymate_core::{Config, Timetable};

use super::study_context;

const NOTHING_TO_SCHEDULE: &str = "Nothing to schedule: no pending deadlines with study hours left";

#[derive(Subcommand)]
pub enum TimetableAction {
    /// Propose a plan from pending deadlines (nothing is saved)
    Generate {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the calendar with a plan
    Apply {
        /// Plan JSON (as printed by `generate --json`); regenerated when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show the applied calendar
    Show {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
}

fn print_plan(plan: &Timetable) {
    for day in &plan.days {
        if day.sessions.is_empty() {
            continue;
        }
        println!("{} {}", day.day_name, day.date);
        for s in &day.sessions {
            let subject = if s.subject.is_empty() {
                String::new()
            } else {
                format!(" ({})", s.subject)
            };
            println!(
                "  {}-{}  {}{}",
                s.start.format("%H:%M"),
                s.end.format("%H:%M"),
                s.title,
                subject
            );
        }
    }
    println!(
        "{} sessions, {:.1}h total, subjects: {}",
        plan.total_sessions,
        plan.total_hours,
        plan.subjects.join(", ")
    );
}

pub fn run(action: TimetableAction, user: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let ctx = study_context(user, &config);
    let generator_config = config.planner.generator_config();
    let mut db = Database::open()?;

    match action {
        TimetableAction::Generate { json } => {
            let plan = planner::generate(&ctx, &db, &generator_config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else if plan.is_nothing_to_schedule() {
                println!("{NOTHING_TO_SCHEDULE}");
            } else {
                print_plan(&plan);
            }
        }
        TimetableAction::Apply { file } => {
            let plan = match file {
                Some(path) => Timetable::from_json(&std::fs::read_to_string(&path)?)?,
                None => planner::generate(&ctx, &db, &generator_config)?,
            };
            if plan.is_nothing_to_schedule() {
                println!("{NOTHING_TO_SCHEDULE}");
            }
            let summary =
                planner::apply(&ctx, &mut db, &plan, &config.planner.default_subject)?;
            println!(
                "Applied {} sessions ({} breaks skipped)",
                summary.inserted, summary.skipped_breaks
            );
        }
        TimetableAction::Show { json } => {
            let entries = db.timetable_entries(ctx.user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No timetable entries");
            } else {
                for e in &entries {
                    println!(
                        "{}  {}-{}  {} ({})",
                        e.start_time.format("%a %Y-%m-%d"),
                        e.start_time.format("%H:%M"),
                        e.end_time.format("%H:%M"),
                        e.title,
                        e.subject
                    );
                }
            }
        }
    }
    Ok(())
}
