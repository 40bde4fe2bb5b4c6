//! Per-user activity tracking.
//!
//! One upserted row per user: the most recent action name and time, plus
//! the last day a symptom was added and the last day a daily task was
//! completed. Engagement features (streaks, re-engagement pushes) read
//! from here.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::analytics::{EVENT_SYMPTOM_ADDED, EVENT_TASK_COMPLETED};
use crate::db::DatabaseError;

/// Snapshot of a user's activity row.
#[derive(Debug, Clone, Serialize)]
pub struct UserActivity {
    pub user_id: String,
    pub last_action_name: String,
    pub last_action_at: String,
    pub last_symptom_at: Option<String>,
    pub last_task_done_at: Option<String>,
}

/// Upserts the user's activity row for the given action.
///
/// `symptom_added` also stamps `last_symptom_at` with the local day;
/// `daily_task_completed` stamps `last_task_done_at`. Other actions only
/// touch the last-action columns.
pub fn mark_action(
    conn: &Connection,
    user_id: &str,
    action: &str,
    now: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let day = now.format("%Y-%m-%d").to_string();
    let symptom_day = (action == EVENT_SYMPTOM_ADDED).then(|| day.clone());
    let task_day = (action == EVENT_TASK_COMPLETED).then(|| day.clone());

    conn.execute(
        "INSERT INTO user_activity
            (user_id, last_action_name, last_action_at, last_symptom_at, last_task_done_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            last_action_name = excluded.last_action_name,
            last_action_at = excluded.last_action_at,
            last_symptom_at = COALESCE(excluded.last_symptom_at, user_activity.last_symptom_at),
            last_task_done_at = COALESCE(excluded.last_task_done_at, user_activity.last_task_done_at)",
        params![
            user_id,
            action,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
            symptom_day,
            task_day,
        ],
    )?;

    Ok(())
}

/// Fetches the user's activity row, if any.
pub fn fetch_activity(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<UserActivity>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT user_id, last_action_name, last_action_at, last_symptom_at, last_task_done_at
             FROM user_activity WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(UserActivity {
                    user_id: row.get(0)?,
                    last_action_name: row.get(1)?,
                    last_action_at: row.get(2)?,
                    last_symptom_at: row.get(3)?,
                    last_task_done_at: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}
