//! Local reminder planning and the scheduler seam.
//!
//! Planning is pure: given "now", produce the reminders that should exist.
//! Actually registering them with the platform notification subsystem goes
//! through the `ReminderScheduler` trait, so the engine and all planning
//! logic run in tests without any OS integration.

use std::cell::RefCell;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::medicines::MedicineRecord;

/// Stable id of the single "task still pending" reminder. Completing any
/// task for the day cancels this id.
pub const PENDING_TASK_REMINDER_ID: &str = "DAILY_TASK_REMINDER";

/// Fixed-hour reminders attached to a freshly generated task set.
const TASK_REMINDER_HOURS: &[(u32, &str)] = &[
    (9, "Morning reminder"),
    (14, "Afternoon reminder"),
    (20, "Evening reminder"),
];

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Notification backend error: {0}")]
    Backend(String),
}

/// A reminder to register with the platform scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub body: String,
    pub fire_at: NaiveDateTime,
    pub repeat_daily: bool,
}

/// Platform notification scheduler seam.
pub trait ReminderScheduler {
    fn schedule(&self, reminder: &Reminder) -> Result<(), ScheduleError>;
    fn cancel(&self, id: &str) -> Result<(), ScheduleError>;
}

fn wall_clock(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0)
        .expect("valid wall-clock time")
}

/// One-shot reminders at 09:00/14:00/20:00 local for today's task.
/// Hours already past are skipped, not rolled over — tomorrow gets a
/// fresh task set with fresh reminders.
pub fn plan_task_reminders(task_text: &str, now: NaiveDateTime) -> Vec<Reminder> {
    TASK_REMINDER_HOURS
        .iter()
        .filter_map(|&(hour, title)| {
            let fire_at = wall_clock(now.date(), hour, 0);
            if fire_at <= now {
                return None;
            }
            Some(Reminder {
                id: format!("daily-task-{hour:02}00"),
                title: title.to_string(),
                body: format!("You haven't completed today's task:\n{task_text}"),
                fire_at,
                repeat_daily: false,
            })
        })
        .collect()
}

/// The single pending-task reminder at 20:00 local, pushed to tomorrow
/// when 20:00 has already passed.
pub fn plan_pending_task_reminder(task_text: &str, now: NaiveDateTime) -> Reminder {
    let mut fire_at = wall_clock(now.date(), 20, 0);
    if fire_at <= now {
        fire_at += Duration::days(1);
    }
    Reminder {
        id: PENDING_TASK_REMINDER_ID.to_string(),
        title: "Daily health task pending".to_string(),
        body: format!("You haven't completed today's task:\n{task_text}"),
        fire_at,
        repeat_daily: false,
    }
}

/// Recurring wellness notifications: morning task nudge (08:00, daily),
/// missed-task reminder (14:00, one-shot), night wind-down (21:30, daily).
/// Each rolls to tomorrow when its time today has passed.
pub fn plan_wellness_notifications(now: NaiveDateTime) -> Vec<Reminder> {
    let plan = |hour: u32, minute: u32| {
        let mut fire_at = wall_clock(now.date(), hour, minute);
        if fire_at <= now {
            fire_at += Duration::days(1);
        }
        fire_at
    };

    vec![
        Reminder {
            id: "wellness-morning".into(),
            title: "Your daily health task".into(),
            body: "Small steps today lead to better health".into(),
            fire_at: plan(8, 0),
            repeat_daily: true,
        },
        Reminder {
            id: "wellness-missed-task".into(),
            title: "You missed today's task".into(),
            body: "It's not too late - take 5 minutes for yourself".into(),
            fire_at: plan(14, 0),
            repeat_daily: false,
        },
        Reminder {
            id: "wellness-wind-down".into(),
            title: "Wind down".into(),
            body: "Take a deep breath and prepare for restful sleep".into(),
            fire_at: plan(21, 30),
            repeat_daily: true,
        },
    ]
}

/// The daily repeating reminder for one stored medicine. First fire is at
/// the medicine's wall-clock time today, or tomorrow when that has passed.
/// The reminder id is derived from the row id so deleting the medicine can
/// cancel it.
pub fn plan_medicine_reminder(medicine: &MedicineRecord, now: NaiveDateTime) -> Reminder {
    let mut fire_at = wall_clock(now.date(), medicine.hour, medicine.minute);
    if fire_at <= now {
        fire_at += Duration::days(1);
    }
    Reminder {
        id: format!("medicine-{}", medicine.id),
        title: "Medicine reminder".to_string(),
        body: format!("Time for {}", medicine.name),
        fire_at,
        repeat_daily: true,
    }
}

/// One reminder per stored medicine, in the list's order.
pub fn plan_medicine_reminders(medicines: &[MedicineRecord], now: NaiveDateTime) -> Vec<Reminder> {
    medicines
        .iter()
        .map(|m| plan_medicine_reminder(m, now))
        .collect()
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Scheduler double that records every schedule/cancel call.
#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: RefCell<Vec<Reminder>>,
    cancelled: RefCell<Vec<String>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<Reminder> {
        self.scheduled.borrow().clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.borrow().clone()
    }
}

impl ReminderScheduler for RecordingScheduler {
    fn schedule(&self, reminder: &Reminder) -> Result<(), ScheduleError> {
        self.scheduled.borrow_mut().push(reminder.clone());
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), ScheduleError> {
        self.cancelled.borrow_mut().push(id.to_string());
        Ok(())
    }
}

/// Scheduler double whose calls all fail, for degraded-path tests.
pub struct FailingScheduler;

impl ReminderScheduler for FailingScheduler {
    fn schedule(&self, _reminder: &Reminder) -> Result<(), ScheduleError> {
        Err(ScheduleError::Backend("notification service unavailable".into()))
    }

    fn cancel(&self, _id: &str) -> Result<(), ScheduleError> {
        Err(ScheduleError::Backend("notification service unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn all_three_reminders_before_nine() {
        let reminders = plan_task_reminders("Drink water", at(8, 0));
        assert_eq!(reminders.len(), 3);
        let hours: Vec<u32> = reminders
            .iter()
            .map(|r| chrono::Timelike::hour(&r.fire_at))
            .collect();
        assert_eq!(hours, vec![9, 14, 20]);
        assert!(reminders.iter().all(|r| !r.repeat_daily));
        assert!(reminders[0].body.contains("Drink water"));
    }

    #[test]
    fn past_hours_skipped_mid_afternoon() {
        let reminders = plan_task_reminders("Drink water", at(15, 30));
        assert_eq!(reminders.len(), 1);
        assert_eq!(chrono::Timelike::hour(&reminders[0].fire_at), 20);
    }

    #[test]
    fn no_reminders_late_evening() {
        let reminders = plan_task_reminders("Drink water", at(21, 0));
        assert!(reminders.is_empty());
    }

    #[test]
    fn exact_hour_counts_as_past() {
        let reminders = plan_task_reminders("Drink water", at(9, 0));
        assert_eq!(reminders.len(), 2);
    }

    #[test]
    fn pending_reminder_today_before_eight_pm() {
        let reminder = plan_pending_task_reminder("Drink water", at(10, 0));
        assert_eq!(reminder.id, PENDING_TASK_REMINDER_ID);
        assert_eq!(reminder.fire_at, at(20, 0));
    }

    #[test]
    fn pending_reminder_rolls_to_tomorrow_after_eight_pm() {
        let reminder = plan_pending_task_reminder("Drink water", at(20, 30));
        assert_eq!(
            reminder.fire_at,
            NaiveDate::from_ymd_opt(2025, 1, 11)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn wellness_plan_has_two_daily_repeats() {
        let plan = plan_wellness_notifications(at(6, 0));
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.iter().filter(|r| r.repeat_daily).count(), 2);
        // All in the future at 06:00
        assert!(plan.iter().all(|r| r.fire_at > at(6, 0)));
    }

    #[test]
    fn wellness_plan_rolls_past_slots_forward() {
        let plan = plan_wellness_notifications(at(22, 0));
        assert!(plan.iter().all(|r| r.fire_at.date() > at(22, 0).date()));
    }

    fn medicine(name: &str, hour: u32, minute: u32) -> MedicineRecord {
        MedicineRecord {
            id: "m1".into(),
            user_id: "u1".into(),
            name: name.into(),
            hour,
            minute,
            created_at: "2025-01-10 07:00:00".into(),
        }
    }

    #[test]
    fn medicine_reminder_repeats_daily_from_today() {
        let reminder = plan_medicine_reminder(&medicine("Vitamin D", 8, 0), at(6, 0));
        assert_eq!(reminder.id, "medicine-m1");
        assert!(reminder.repeat_daily);
        assert_eq!(reminder.fire_at, at(8, 0));
        assert!(reminder.body.contains("Vitamin D"));
    }

    #[test]
    fn medicine_reminder_rolls_to_tomorrow_when_time_passed() {
        let reminder = plan_medicine_reminder(&medicine("Iron", 8, 0), at(9, 30));
        assert_eq!(
            reminder.fire_at,
            NaiveDate::from_ymd_opt(2025, 1, 11)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
        assert!(reminder.repeat_daily);
    }

    #[test]
    fn medicine_plan_covers_every_stored_medicine() {
        let meds = vec![medicine("Vitamin D", 8, 0), medicine("Iron", 21, 15)];
        let plan = plan_medicine_reminders(&meds, at(6, 0));
        assert_eq!(plan.len(), 2);
        assert_eq!(chrono::Timelike::hour(&plan[1].fire_at), 21);
        assert_eq!(chrono::Timelike::minute(&plan[1].fire_at), 15);
    }

    #[test]
    fn recording_scheduler_captures_calls() {
        let scheduler = RecordingScheduler::new();
        let reminder = plan_pending_task_reminder("Walk", at(10, 0));
        scheduler.schedule(&reminder).unwrap();
        scheduler.cancel(PENDING_TASK_REMINDER_ID).unwrap();

        assert_eq!(scheduler.scheduled().len(), 1);
        assert_eq!(scheduler.cancelled(), vec![PENDING_TASK_REMINDER_ID.to_string()]);
    }
}
