//! Notification history — the feed behind the notifications screen.
//!
//! Every scheduled wellness notification also leaves a history row so the
//! user can review what the app sent, with an unread badge count.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DatabaseError;

/// A delivered (or scheduled) notification as shown in the history feed.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub message: String,
    /// Navigation target when tapped (e.g. "DailyTask", "AddSymptoms").
    pub screen: String,
    pub read: bool,
    pub created_at: String,
}

/// Saves a notification to the user's history, unread by default.
pub fn save_notification(
    conn: &Connection,
    user_id: &str,
    title: &str,
    message: &str,
    screen: &str,
    now: NaiveDateTime,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO notification_history (id, user_id, title, message, screen, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            id.to_string(),
            user_id,
            title,
            message,
            screen,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(id)
}

/// Lists the user's notification history, newest first.
pub fn list_notifications(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<NotificationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, message, screen, read, created_at
         FROM notification_history
         WHERE user_id = ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        let read: i32 = row.get(4)?;
        Ok(NotificationRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            message: row.get(2)?,
            screen: row.get(3)?,
            read: read != 0,
            created_at: row.get(5)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Number of unread notifications (the badge count).
pub fn unread_count(conn: &Connection, user_id: &str) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notification_history WHERE user_id = ?1 AND read = 0",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Marks one notification as read.
pub fn mark_read(conn: &Connection, notification_id: &str) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE notification_history SET read = 1 WHERE id = ?1",
        params![notification_id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Notification".into(),
            id: notification_id.into(),
        });
    }
    Ok(())
}

/// Marks all of the user's notifications as read.
pub fn mark_all_read(conn: &Connection, user_id: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE notification_history SET read = 1 WHERE user_id = ?1",
        params![user_id],
    )?;
    Ok(())
}
