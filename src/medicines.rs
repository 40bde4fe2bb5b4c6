//! Medicine reminders — repository functions over the `medicines` table.
//!
//! Each row backs one daily repeating notification at the stored
//! wall-clock time; `notify::plan_medicine_reminders` turns the list into
//! the reminders to register. Guests never reach this store.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DatabaseError;

/// A stored medicine reminder.
#[derive(Debug, Clone, Serialize)]
pub struct MedicineRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub hour: u32,
    pub minute: u32,
    pub created_at: String,
}

/// Adds a medicine reminder. Returns the generated UUID.
pub fn add_medicine(
    conn: &Connection,
    user_id: &str,
    name: &str,
    hour: u32,
    minute: u32,
    now: NaiveDateTime,
) -> Result<Uuid, DatabaseError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DatabaseError::ConstraintViolation(
            "medicine name must not be empty".into(),
        ));
    }
    if hour > 23 || minute > 59 {
        return Err(DatabaseError::ConstraintViolation(format!(
            "invalid reminder time {hour:02}:{minute:02}"
        )));
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO medicines (id, user_id, name, hour, minute, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            user_id,
            name,
            hour,
            minute,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;

    Ok(id)
}

/// Lists the user's medicine reminders in daily-schedule order.
pub fn list_medicines(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<MedicineRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, hour, minute, created_at
         FROM medicines
         WHERE user_id = ?1
         ORDER BY hour, minute, created_at",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(MedicineRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            hour: row.get::<_, i64>(3)? as u32,
            minute: row.get::<_, i64>(4)? as u32,
            created_at: row.get(5)?,
        })
    })?;

    let mut medicines = Vec::new();
    for row in rows {
        medicines.push(row?);
    }
    Ok(medicines)
}

/// Removes a medicine reminder. The caller also cancels its scheduled
/// notification by the id `notify::plan_medicine_reminder` derives.
pub fn remove_medicine(
    conn: &Connection,
    user_id: &str,
    medicine_id: &str,
) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM medicines WHERE user_id = ?1 AND id = ?2",
        params![user_id, medicine_id],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medicine".into(),
            id: medicine_id.into(),
        });
    }
    Ok(())
}
