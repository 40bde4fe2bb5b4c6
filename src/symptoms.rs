//! Symptom journal — repository functions over the `symptoms` table.
//!
//! The five most recent entries double as the context sent to the remote
//! task generator when a new daily task set is produced.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::activity;
use crate::analytics::EVENT_SYMPTOM_ADDED;
use crate::db::DatabaseError;
use crate::models::{StoredSymptom, SymptomEntry};

/// Records a new symptom entry. Returns the generated UUID.
pub fn record_symptom(
    conn: &Connection,
    user_id: &str,
    entry: &SymptomEntry,
    now: NaiveDateTime,
) -> Result<Uuid, DatabaseError> {
    let text = entry.text.trim();
    if text.is_empty() {
        return Err(DatabaseError::ConstraintViolation(
            "symptom text must not be empty".into(),
        ));
    }
    if !(1..=5).contains(&entry.severity) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "severity must be 1-5, got {}",
            entry.severity
        )));
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO symptoms (id, user_id, text, notes, severity, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            user_id,
            text,
            entry.notes,
            entry.severity as i32,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;

    // The entry is saved at this point; a failed activity stamp must not
    // undo that.
    if let Err(err) = activity::mark_action(conn, user_id, EVENT_SYMPTOM_ADDED, now) {
        tracing::warn!("could not record activity '{EVENT_SYMPTOM_ADDED}': {err}");
    }

    Ok(id)
}

/// Fetches the user's most recent symptoms, newest first.
pub fn fetch_recent_symptoms(
    conn: &Connection,
    user_id: &str,
    limit: u32,
) -> Result<Vec<StoredSymptom>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, text, notes, severity, created_at
         FROM symptoms
         WHERE user_id = ?1
         ORDER BY created_at DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![user_id, limit], |row| {
        Ok(StoredSymptom {
            id: row.get(0)?,
            user_id: row.get(1)?,
            text: row.get(2)?,
            notes: row.get(3)?,
            severity: row.get::<_, i32>(4)? as u8,
            created_at: row.get(5)?,
        })
    })?;

    let mut symptoms = Vec::new();
    for row in rows {
        symptoms.push(row?);
    }
    Ok(symptoms)
}

/// Symptom texts recorded on the given local day (`YYYY-MM-DD`).
pub fn fetch_symptom_texts_on(
    conn: &Connection,
    user_id: &str,
    day: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT text FROM symptoms
         WHERE user_id = ?1 AND DATE(created_at) = ?2
         ORDER BY created_at ASC",
    )?;

    let rows = stmt.query_map(params![user_id, day], |row| row.get(0))?;

    let mut texts = Vec::new();
    for row in rows {
        texts.push(row?);
    }
    Ok(texts)
}
