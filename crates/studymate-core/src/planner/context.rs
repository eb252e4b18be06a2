//! Per-request context.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Who is asking, and when.
///
/// Every planner and timer operation takes one of these instead of reading
/// ambient state, so two requests never share a notion of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyContext {
    pub user_id: i64,
    /// Local wall-clock time the request is anchored at.
    pub now: NaiveDateTime,
}

impl StudyContext {
    pub fn new(user_id: i64, now: NaiveDateTime) -> Self {
        Self { user_id, now }
    }

    /// Context anchored at the current local time.
    pub fn now_local(user_id: i64) -> Self {
        Self::new(user_id, Local::now().naive_local())
    }
}
