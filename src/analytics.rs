//! Fire-and-forget usage events.
//!
//! The engine emits named events with optional key-value payloads; nothing
//! in the engine ever waits on or fails because of analytics. Production
//! routes events through `tracing`, tests use a recording double.

use std::cell::RefCell;

pub const EVENT_TASK_GENERATED: &str = "daily_task_generated";
pub const EVENT_TASK_COMPLETED: &str = "daily_task_completed";
pub const EVENT_TASK_OPENED: &str = "daily_task_opened";
pub const EVENT_SYMPTOM_ADDED: &str = "symptom_added";

/// Sink for named usage events.
pub trait EventLogger {
    fn log_event(&self, name: &str, params: &[(&str, &str)]);
}

/// Production logger — events become structured tracing lines.
pub struct TracingEventLogger;

impl EventLogger for TracingEventLogger {
    fn log_event(&self, name: &str, params: &[(&str, &str)]) {
        if params.is_empty() {
            tracing::info!(event = name, "analytics");
        } else {
            tracing::info!(event = name, ?params, "analytics");
        }
    }
}

/// Test double that records every event it sees.
#[derive(Default)]
pub struct RecordingEventLogger {
    events: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl RecordingEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl EventLogger for RecordingEventLogger {
    fn log_event(&self, name: &str, params: &[(&str, &str)]) {
        self.events.borrow_mut().push((
            name.to_string(),
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
    }
}
