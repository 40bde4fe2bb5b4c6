//! Daily Task Resolution Engine.
//!
//! Produces "today's" wellness tasks for a user: reuses the persisted set
//! when it is fully real, regenerates through the remote generator when the
//! set is empty or contains fallback entries, and guarantees the user never
//! sees zero tasks — generator failure degrades to a canned fallback set
//! instead of an error.
//!
//! Key invariants:
//! - At most one remote generation per user per local day (a fully-real
//!   persisted set is returned without any remote call).
//! - The fallback-delete + real-insert runs as one transaction, so no
//!   observer sees a mixed or empty state mid-transition.
//! - A regeneration attempt that loses a cross-device race (real rows
//!   already present when its fallback write would run) returns the
//!   existing rows and writes nothing.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::activity;
use crate::analytics::{
    EventLogger, EVENT_TASK_COMPLETED, EVENT_TASK_GENERATED, EVENT_TASK_OPENED,
};
use crate::db::DatabaseError;
use crate::generator::{GeneratedTasks, TaskGenerator};
use crate::identity::UserIdentity;
use crate::models::{TaskKind, TaskRecord};
use crate::notify::{
    plan_pending_task_reminder, plan_task_reminders, ReminderScheduler, PENDING_TASK_REMINDER_ID,
};
use crate::symptoms;

/// How many recent symptoms are sent to the generator as context.
const SYMPTOM_CONTEXT_LIMIT: u32 = 5;

// ---------------------------------------------------------------------------
// Canned templates
// ---------------------------------------------------------------------------

/// A canned wellness task.
#[derive(Debug, PartialEq, Eq)]
pub struct TaskTemplate {
    pub task: &'static str,
    pub reason: &'static str,
}

/// The fixed template set. Order matters: the guest rotation indexes into
/// this array, and the fallback set is drawn from it.
pub const TEMPLATES: &[TaskTemplate] = &[
    TaskTemplate {
        task: "Drink 8\u{2013}10 glasses of water",
        reason: "Hydration supports focus and helps reduce headaches",
    },
    TaskTemplate {
        task: "Take a 10 minute walk",
        reason: "Light movement improves circulation and energy levels",
    },
    TaskTemplate {
        task: "Sleep before 11 PM",
        reason: "Consistent sleep supports recovery and mental clarity",
    },
    TaskTemplate {
        task: "Practice deep breathing for 5 minutes",
        reason: "Breathing exercises help calm the nervous system",
    },
    TaskTemplate {
        task: "Stretch your body for 5 minutes",
        reason: "Stretching keeps muscles active and flexible",
    },
];

const WATER: usize = 0;
const WALK: usize = 1;
const SLEEP: usize = 2;
const BREATHE: usize = 3;
const GENERIC: usize = 4;

/// The three canned tasks written when generation fails, in slot order
/// `fallback_0..2`.
fn fallback_templates() -> [&'static TaskTemplate; 3] {
    [&TEMPLATES[WATER], &TEMPLATES[WALK], &TEMPLATES[BREATHE]]
}

/// Deterministic template index for a local day: sum the digits of the
/// date's digits-only form, modulo the template count. The same guest sees
/// the same task all day and (usually) a different one the next day,
/// without any storage.
pub fn rotation_index(day: &str) -> usize {
    let digit_sum: u32 = day.chars().filter_map(|c| c.to_digit(10)).sum();
    digit_sum as usize % TEMPLATES.len()
}

/// Picks a canned template from symptom texts by case-insensitive substring
/// match, first match wins. Only used as a stand-in generator in tests; the
/// production path asks the remote service.
pub fn template_for_symptoms(texts: &[String]) -> &'static TaskTemplate {
    let joined = texts.join(" ").to_lowercase();

    if joined.contains("headache") {
        return &TEMPLATES[WATER];
    }
    if joined.contains("fatigue") || joined.contains("weak") {
        return &TEMPLATES[WALK];
    }
    if joined.contains("stress") || joined.contains("anxiety") {
        return &TEMPLATES[BREATHE];
    }
    if joined.contains("sleep") {
        return &TEMPLATES[SLEEP];
    }
    &TEMPLATES[GENERIC]
}

/// The local calendar day key (`YYYY-MM-DD`, zero-padded). Local, not UTC:
/// tasks must not roll over at UTC midnight while the user's day hasn't
/// changed.
pub fn local_day(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d").to_string()
}

fn timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DailyTaskError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Guest sessions cannot complete tasks")]
    GuestSession,

    #[error("No task '{task_id}' for day {day}")]
    TaskNotFound { task_id: String, day: String },
}

/// Result of a completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed,
    /// The task was already completed — the call changed nothing.
    AlreadyCompleted,
}

// ---------------------------------------------------------------------------
// Store functions
// ---------------------------------------------------------------------------

/// Fetches the persisted task set for (user, day), real slots first in
/// body/mind/awareness order, fallback entries after by id.
fn fetch_day_tasks(
    conn: &Connection,
    user_id: &str,
    day: &str,
) -> Result<Vec<TaskRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT task_id, type, task, reason, completed, completed_at, created_at
         FROM daily_tasks
         WHERE user_id = ?1 AND day = ?2
         ORDER BY CASE type
                    WHEN 'body' THEN 0
                    WHEN 'mind' THEN 1
                    WHEN 'awareness' THEN 2
                    ELSE 3
                  END,
                  task_id",
    )?;

    let rows = stmt.query_map(params![user_id, day], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i32>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut tasks = Vec::new();
    for row in rows {
        let (id, kind, task, reason, completed, completed_at, created_at) = row?;
        tasks.push(TaskRecord {
            id,
            kind: kind.parse()?,
            task,
            reason,
            completed: completed != 0,
            completed_at,
            created_at,
        });
    }
    Ok(tasks)
}

/// Atomically replaces any fallback rows for the day with the three real
/// generated tasks. One transaction: delete fallback, upsert real slots.
fn replace_with_real(
    conn: &Connection,
    user_id: &str,
    day: &str,
    generated: &GeneratedTasks,
    now: NaiveDateTime,
) -> Result<Vec<TaskRecord>, DatabaseError> {
    let created_at = timestamp(now);
    let slots = [
        (TaskKind::Body, &generated.body),
        (TaskKind::Mind, &generated.mind),
        (TaskKind::Awareness, &generated.awareness),
    ];

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM daily_tasks WHERE user_id = ?1 AND day = ?2 AND type = 'fallback'",
        params![user_id, day],
    )?;
    for (kind, task) in &slots {
        tx.execute(
            "INSERT OR REPLACE INTO daily_tasks
                (user_id, day, task_id, type, task, reason, completed, completed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7)",
            params![user_id, day, kind.as_str(), kind.as_str(), task.task, task.reason, created_at],
        )?;
    }
    tx.commit()?;

    Ok(slots
        .iter()
        .map(|(kind, task)| TaskRecord {
            id: kind.as_str().to_string(),
            kind: *kind,
            task: task.task.clone(),
            reason: task.reason.clone(),
            completed: false,
            completed_at: None,
            created_at: created_at.clone(),
        })
        .collect())
}

/// Writes the fixed three-task fallback set for the day.
fn write_fallback(
    conn: &Connection,
    user_id: &str,
    day: &str,
    now: NaiveDateTime,
) -> Result<Vec<TaskRecord>, DatabaseError> {
    let created_at = timestamp(now);
    let templates = fallback_templates();

    let tx = conn.unchecked_transaction()?;
    for (i, template) in templates.iter().enumerate() {
        tx.execute(
            "INSERT OR REPLACE INTO daily_tasks
                (user_id, day, task_id, type, task, reason, completed, completed_at, created_at)
             VALUES (?1, ?2, ?3, 'fallback', ?4, ?5, 0, NULL, ?6)",
            params![user_id, day, format!("fallback_{i}"), template.task, template.reason, created_at],
        )?;
    }
    tx.commit()?;

    Ok(templates
        .iter()
        .enumerate()
        .map(|(i, template)| TaskRecord {
            id: format!("fallback_{i}"),
            kind: TaskKind::Fallback,
            task: template.task.to_string(),
            reason: template.reason.to_string(),
            completed: false,
            completed_at: None,
            created_at: created_at.clone(),
        })
        .collect())
}

/// The ephemeral guest task: pure function of the date, never persisted.
fn guest_task(day: &str, now: NaiveDateTime) -> TaskRecord {
    let template = &TEMPLATES[rotation_index(day)];
    TaskRecord {
        id: "guest".to_string(),
        kind: TaskKind::Fallback,
        task: template.task.to_string(),
        reason: template.reason.to_string(),
        completed: false,
        completed_at: None,
        created_at: timestamp(now),
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The resolution engine. Holds its collaborators by reference — callers
/// construct it per screen visit with whatever identity the session has.
pub struct DailyTaskEngine<'a> {
    conn: &'a Connection,
    generator: &'a dyn TaskGenerator,
    scheduler: &'a dyn ReminderScheduler,
    events: &'a dyn EventLogger,
}

impl<'a> DailyTaskEngine<'a> {
    pub fn new(
        conn: &'a Connection,
        generator: &'a dyn TaskGenerator,
        scheduler: &'a dyn ReminderScheduler,
        events: &'a dyn EventLogger,
    ) -> Self {
        Self {
            conn,
            generator,
            scheduler,
            events,
        }
    }

    /// Resolves today's task set for the given identity.
    ///
    /// Guests get a single date-rotated ephemeral task. Signed-in users get
    /// the persisted set when it is fully real, a fresh generation when the
    /// set is empty or contains fallback entries, and the canned fallback
    /// set when the generator is unreachable or returns garbage.
    pub fn resolve_daily_tasks(
        &self,
        identity: &UserIdentity,
        now: NaiveDateTime,
    ) -> Result<Vec<TaskRecord>, DailyTaskError> {
        let day = local_day(now);
        self.events.log_event(EVENT_TASK_OPENED, &[]);

        let Some(user_id) = identity.resolved_user() else {
            return Ok(vec![guest_task(&day, now)]);
        };
        self.mark_action_best_effort(user_id, EVENT_TASK_OPENED, now);

        let existing = fetch_day_tasks(self.conn, user_id, &day)?;
        if !existing.is_empty() && existing.iter().all(|t| !t.is_fallback()) {
            // Fully real set: reuse, no remote call.
            return Ok(existing);
        }
        // Empty, pure-fallback, or mixed: regenerate. A mixed set also
        // regenerates (rather than just stripping fallback rows), matching
        // the shipped behavior.

        let context = symptoms::fetch_recent_symptoms(self.conn, user_id, SYMPTOM_CONTEXT_LIMIT)?;

        match self.generator.generate(&context) {
            Ok(generated) => {
                let records = replace_with_real(self.conn, user_id, &day, &generated, now)?;
                self.events.log_event(EVENT_TASK_GENERATED, &[]);
                self.mark_action_best_effort(user_id, EVENT_TASK_GENERATED, now);
                self.schedule_task_reminders(&generated.body.task, now);
                Ok(records)
            }
            Err(err) => {
                tracing::warn!("daily task generation failed, degrading to fallback: {err}");
                let current = fetch_day_tasks(self.conn, user_id, &day)?;
                if current.iter().any(|t| !t.is_fallback()) {
                    // A concurrent generation already wrote real tasks;
                    // keep them, skip the fallback write.
                    return Ok(current);
                }
                Ok(write_fallback(self.conn, user_id, &day, now)?)
            }
        }
    }

    /// Marks one of today's tasks complete, exactly once.
    ///
    /// A repeat call reports `AlreadyCompleted` and changes nothing.
    /// Guests cannot complete tasks.
    pub fn mark_task_complete(
        &self,
        identity: &UserIdentity,
        now: NaiveDateTime,
        task_id: &str,
    ) -> Result<CompletionOutcome, DailyTaskError> {
        let Some(user_id) = identity.resolved_user() else {
            return Err(DailyTaskError::GuestSession);
        };
        let day = local_day(now);

        let updated = self.conn.execute(
            "UPDATE daily_tasks SET completed = 1, completed_at = ?1
             WHERE user_id = ?2 AND day = ?3 AND task_id = ?4 AND completed = 0",
            params![timestamp(now), user_id, day, task_id],
        ).map_err(DatabaseError::from)?;

        if updated == 0 {
            let exists: Option<String> = self
                .conn
                .query_row(
                    "SELECT type FROM daily_tasks
                     WHERE user_id = ?1 AND day = ?2 AND task_id = ?3",
                    params![user_id, day, task_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(DatabaseError::from)?;
            return match exists {
                Some(_) => Ok(CompletionOutcome::AlreadyCompleted),
                None => Err(DailyTaskError::TaskNotFound {
                    task_id: task_id.to_string(),
                    day,
                }),
            };
        }

        let kind: String = self
            .conn
            .query_row(
                "SELECT type FROM daily_tasks
                 WHERE user_id = ?1 AND day = ?2 AND task_id = ?3",
                params![user_id, day, task_id],
                |row| row.get(0),
            )
            .map_err(DatabaseError::from)?;

        if let Err(err) = self.scheduler.cancel(PENDING_TASK_REMINDER_ID) {
            tracing::warn!("could not cancel pending-task reminder: {err}");
        }
        self.events
            .log_event(EVENT_TASK_COMPLETED, &[("task_type", &kind)]);
        self.mark_action_best_effort(user_id, EVENT_TASK_COMPLETED, now);

        Ok(CompletionOutcome::Completed)
    }

    /// Reminder scheduling never fails the resolution — tasks are already
    /// persisted by the time reminders are registered.
    fn schedule_task_reminders(&self, body_task: &str, now: NaiveDateTime) {
        for reminder in plan_task_reminders(body_task, now) {
            if let Err(err) = self.scheduler.schedule(&reminder) {
                tracing::warn!("could not schedule reminder {}: {err}", reminder.id);
            }
        }
        let pending = plan_pending_task_reminder(body_task, now);
        if let Err(err) = self.scheduler.schedule(&pending) {
            tracing::warn!("could not schedule pending-task reminder: {err}");
        }
    }

    /// Activity tracking is telemetry, not state the user sees; a write
    /// failure must not fail the operation that triggered it.
    fn mark_action_best_effort(&self, user_id: &str, action: &str, now: NaiveDateTime) {
        if let Err(err) = activity::mark_action(self.conn, user_id, action, now) {
            tracing::warn!("could not record activity '{action}': {err}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
