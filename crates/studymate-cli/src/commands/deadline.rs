//! Deadline management commands for CLI.

use clap::Subcommand;
use studymate_core::deadline::parse_due_date;
use studymate_core::storage::Database;
use studymate_core::{Config, Deadline, NewDeadline, Priority, StudyContext, ValidationError};

use super::study_context;

#[derive(Subcommand)]
pub enum DeadlineAction {
    /// Add a deadline
    Add {
        /// Deadline title
        title: String,
        /// Due date: "YYYY-MM-DD HH:MM[:SS]" or "YYYY-MM-DD" (end of day)
        #[arg(long)]
        due: String,
        /// Subject (e.g. "Mathematics")
        #[arg(long, default_value = "")]
        subject: String,
        /// Priority: low, medium, high or critical
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Study hours budget
        #[arg(long, default_value_t = 5)]
        hours: u32,
        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List deadlines
    List {
        /// Include completed deadlines
        #[arg(long)]
        all: bool,
        /// Print JSON instead of one line per deadline
        #[arg(long)]
        json: bool,
    },
    /// Show deadline details
    Show {
        /// Deadline ID
        id: i64,
    },
    /// Set the remaining study hours of a deadline
    Hours {
        /// Deadline ID
        id: i64,
        /// Remaining hours
        hours: u32,
    },
    /// Mark a deadline completed
    Complete {
        /// Deadline ID
        id: i64,
    },
    /// Mark a completed deadline pending again
    Reopen {
        /// Deadline ID
        id: i64,
    },
    /// Delete a deadline
    Delete {
        /// Deadline ID
        id: i64,
    },
}

/// Fetch a deadline of the context user, treating other users' ids as missing.
fn owned(db: &Database, ctx: &StudyContext, id: i64) -> studymate_core::Result<Deadline> {
    db.get_deadline(id)?
        .filter(|d| d.user_id == ctx.user_id)
        .ok_or_else(|| {
            ValidationError::NotFound {
                entity: "deadline",
                id,
            }
            .into()
        })
}

pub fn run(action: DeadlineAction, user: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let ctx = study_context(user, &config);
    let db = Database::open()?;

    match action {
        DeadlineAction::Add {
            title,
            due,
            subject,
            priority,
            hours,
            description,
        } => {
            let due_date = parse_due_date(&due).ok_or_else(|| ValidationError::InvalidValue {
                field: "due".to_string(),
                message: format!("cannot parse '{due}' as a date"),
            })?;
            let id = db.add_deadline(&NewDeadline {
                user_id: ctx.user_id,
                title,
                subject,
                due_date,
                priority: Priority::parse_lenient(&priority),
                study_hours: hours,
                description,
            })?;
            println!("Deadline created: {id}");
        }
        DeadlineAction::List { all, json } => {
            let deadlines = db.list_deadlines(ctx.user_id, all)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&deadlines)?);
            } else if deadlines.is_empty() {
                println!("No deadlines");
            } else {
                for d in &deadlines {
                    let mark = if d.completed { "x" } else { " " };
                    println!(
                        "[{mark}] {:>4}  {}  {:<8}  {:>3}h  {} ({})",
                        d.id,
                        d.due_date.format("%Y-%m-%d %H:%M"),
                        d.priority.as_str(),
                        d.remaining_hours,
                        d.title,
                        d.subject,
                    );
                }
            }
        }
        DeadlineAction::Show { id } => {
            let deadline = owned(&db, &ctx, id)?;
            println!("{}", serde_json::to_string_pretty(&deadline)?);
        }
        DeadlineAction::Hours { id, hours } => {
            owned(&db, &ctx, id)?;
            db.set_remaining_hours(id, hours)?;
            println!("Deadline {id}: {hours}h remaining");
        }
        DeadlineAction::Complete { id } => {
            owned(&db, &ctx, id)?;
            db.set_completed(id, true)?;
            println!("Deadline {id} completed");
        }
        DeadlineAction::Reopen { id } => {
            owned(&db, &ctx, id)?;
            db.set_completed(id, false)?;
            println!("Deadline {id} reopened");
        }
        DeadlineAction::Delete { id } => {
            owned(&db, &ctx, id)?;
            db.delete_deadline(id)?;
            println!("Deadline {id} deleted");
        }
    }
    Ok(())
}
