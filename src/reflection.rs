//! Weekly reflection — aggregates the trailing week for the AI summary.
//!
//! The prose summary itself comes from the remote service; this module only
//! builds its input: per-day completed/total task counts plus that day's
//! symptom texts. Generation is gated to Sundays, matching the app's
//! "reflection ready on Sunday" behavior.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::DatabaseError;
use crate::symptoms;

/// One day's slice of the reflection input. Days with neither tasks nor
/// symptoms are omitted entirely.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub symptoms: Vec<String>,
    pub done: u32,
    pub total: u32,
}

/// The reflection input for the trailing week.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReflection {
    /// False outside Sundays — the summary is only produced once a week.
    pub available: bool,
    pub days: Vec<DaySummary>,
}

/// The last seven local days, today first.
pub fn last_seven_days(today: NaiveDate) -> Vec<String> {
    (0..7)
        .map(|i| (today - Duration::days(i)).format("%Y-%m-%d").to_string())
        .collect()
}

fn task_counts(conn: &Connection, user_id: &str, day: &str) -> Result<(u32, u32), DatabaseError> {
    let (total, done) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(completed), 0)
         FROM daily_tasks WHERE user_id = ?1 AND day = ?2",
        params![user_id, day],
        |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
    )?;
    Ok((total, done))
}

/// Builds the reflection input for the trailing week.
pub fn build_weekly_reflection(
    conn: &Connection,
    user_id: &str,
    today: NaiveDate,
) -> Result<WeeklyReflection, DatabaseError> {
    if today.weekday() != Weekday::Sun {
        return Ok(WeeklyReflection {
            available: false,
            days: Vec::new(),
        });
    }

    let mut days = Vec::new();
    for day in last_seven_days(today) {
        let (total, done) = task_counts(conn, user_id, &day)?;
        let symptom_texts = symptoms::fetch_symptom_texts_on(conn, user_id, &day)?;

        if total == 0 && symptom_texts.is_empty() {
            continue;
        }

        days.push(DaySummary {
            day,
            symptoms: if symptom_texts.is_empty() {
                vec!["None".to_string()]
            } else {
                symptom_texts
            },
            done,
            total,
        });
    }

    Ok(WeeklyReflection {
        available: true,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::SymptomEntry;

    // 2025-01-12 is a Sunday, 2025-01-10 a Friday.
    const SUNDAY: (i32, u32, u32) = (2025, 1, 12);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_task(conn: &Connection, user: &str, day: &str, task_id: &str, completed: bool) {
        conn.execute(
            "INSERT INTO daily_tasks (user_id, day, task_id, type, task, reason, completed, created_at)
             VALUES (?1, ?2, ?3, 'body', 'Walk', 'Energy', ?4, ?2 || ' 09:00:00')",
            params![user, day, task_id, completed],
        )
        .unwrap();
    }

    #[test]
    fn last_seven_days_counts_back_from_today() {
        let days = last_seven_days(date(2025, 1, 10));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], "2025-01-10");
        assert_eq!(days[6], "2025-01-04");
    }

    #[test]
    fn not_available_outside_sunday() {
        let conn = open_memory_database().unwrap();
        let reflection = build_weekly_reflection(&conn, "u1", date(2025, 1, 10)).unwrap();
        assert!(!reflection.available);
        assert!(reflection.days.is_empty());
    }

    #[test]
    fn empty_week_yields_no_days() {
        let conn = open_memory_database().unwrap();
        let (y, m, d) = SUNDAY;
        let reflection = build_weekly_reflection(&conn, "u1", date(y, m, d)).unwrap();
        assert!(reflection.available);
        assert!(reflection.days.is_empty());
    }

    #[test]
    fn aggregates_tasks_and_symptoms_per_day() {
        let conn = open_memory_database().unwrap();
        seed_task(&conn, "u1", "2025-01-10", "body", true);
        seed_task(&conn, "u1", "2025-01-10", "mind", false);
        symptoms::record_symptom(
            &conn,
            "u1",
            &SymptomEntry {
                text: "headache".into(),
                notes: None,
                severity: 3,
            },
            date(2025, 1, 10).and_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();

        let (y, m, d) = SUNDAY;
        let reflection = build_weekly_reflection(&conn, "u1", date(y, m, d)).unwrap();
        assert_eq!(reflection.days.len(), 1);
        let summary = &reflection.days[0];
        assert_eq!(summary.day, "2025-01-10");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.symptoms, vec!["headache".to_string()]);
    }

    #[test]
    fn task_only_day_reports_none_for_symptoms() {
        let conn = open_memory_database().unwrap();
        seed_task(&conn, "u1", "2025-01-11", "body", false);

        let (y, m, d) = SUNDAY;
        let reflection = build_weekly_reflection(&conn, "u1", date(y, m, d)).unwrap();
        assert_eq!(reflection.days.len(), 1);
        assert_eq!(reflection.days[0].symptoms, vec!["None".to_string()]);
    }

    #[test]
    fn days_older_than_a_week_excluded() {
        let conn = open_memory_database().unwrap();
        seed_task(&conn, "u1", "2025-01-01", "body", true);

        let (y, m, d) = SUNDAY;
        let reflection = build_weekly_reflection(&conn, "u1", date(y, m, d)).unwrap();
        assert!(reflection.days.is_empty());
    }
}
