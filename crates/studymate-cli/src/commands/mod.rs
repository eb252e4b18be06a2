pub mod config;
pub mod deadline;
pub mod timer;
pub mod timetable;

use studymate_core::{Config, StudyContext};

/// Context for one invocation: the `--user` flag wins over the configured
/// profile, and "now" is the local wall clock.
pub fn study_context(user: Option<i64>, config: &Config) -> StudyContext {
    StudyContext::now_local(user.unwrap_or(config.profile.user_id))
}
