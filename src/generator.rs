//! Remote daily-task generator client.
//!
//! The AI service is an opaque HTTP collaborator: `POST /daily-tasks` with
//! the user's recent symptoms, bearer-token auth, 30s timeout. A valid
//! response carries exactly three task objects (body/mind/awareness), each
//! with a non-empty task and reason. Everything else — transport failure,
//! timeout, bad status, wrong shape — is a single failure class; the engine
//! treats them all identically and degrades to canned fallback tasks.

use std::cell::Cell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StoredSymptom;

/// Hard ceiling on a generation request. The hosted service cold-starts
/// slowly, so this is generous.
pub const GENERATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Cannot reach task generator at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Generator returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed generator response: {0}")]
    MalformedResponse(String),
}

/// One generated task: a short imperative instruction plus its rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub task: String,
    pub reason: String,
}

/// The full generation result — one task per real slot.
#[derive(Debug, Clone)]
pub struct GeneratedTasks {
    pub body: GeneratedTask,
    pub mind: GeneratedTask,
    pub awareness: GeneratedTask,
}

/// Abstraction over the remote generator so the engine is testable
/// without the network.
pub trait TaskGenerator {
    fn generate(&self, symptoms: &[StoredSymptom]) -> Result<GeneratedTasks, GeneratorError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DailyTasksRequest<'a> {
    symptoms: Vec<SymptomContext<'a>>,
}

#[derive(Serialize)]
struct SymptomContext<'a> {
    text: &'a str,
    severity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

#[derive(Deserialize)]
struct DailyTasksResponse {
    body: Option<WireTask>,
    mind: Option<WireTask>,
    awareness: Option<WireTask>,
}

#[derive(Deserialize)]
struct WireTask {
    task: Option<String>,
    reason: Option<String>,
}

/// Validate one slot of the wire response into a usable task.
fn validate_slot(slot: Option<WireTask>, name: &str) -> Result<GeneratedTask, GeneratorError> {
    let wire = slot.ok_or_else(|| {
        GeneratorError::MalformedResponse(format!("missing '{name}' task"))
    })?;
    let task = wire.task.unwrap_or_default();
    let reason = wire.reason.unwrap_or_default();
    if task.trim().is_empty() || reason.trim().is_empty() {
        return Err(GeneratorError::MalformedResponse(format!(
            "'{name}' task has empty text or reason"
        )));
    }
    Ok(GeneratedTask { task, reason })
}

fn validate_response(parsed: DailyTasksResponse) -> Result<GeneratedTasks, GeneratorError> {
    Ok(GeneratedTasks {
        body: validate_slot(parsed.body, "body")?,
        mind: validate_slot(parsed.mind, "mind")?,
        awareness: validate_slot(parsed.awareness, "awareness")?,
    })
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// HTTP client for the hosted task-generation service.
pub struct RemoteTaskGenerator {
    base_url: String,
    client_key: String,
    client: reqwest::blocking::Client,
}

impl RemoteTaskGenerator {
    pub fn new(base_url: &str, client_key: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_key: client_key.to_string(),
            client,
        }
    }
}

impl TaskGenerator for RemoteTaskGenerator {
    fn generate(&self, symptoms: &[StoredSymptom]) -> Result<GeneratedTasks, GeneratorError> {
        let url = format!("{}/daily-tasks", self.base_url);
        let request = DailyTasksRequest {
            symptoms: symptoms
                .iter()
                .map(|s| SymptomContext {
                    text: &s.text,
                    severity: s.severity,
                    notes: s.notes.as_deref(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.client_key)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GeneratorError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GeneratorError::Timeout(GENERATION_TIMEOUT_SECS)
                } else {
                    GeneratorError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: DailyTasksResponse = response
            .json()
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))?;

        validate_response(parsed)
    }
}

// ---------------------------------------------------------------------------
// Mock for tests
// ---------------------------------------------------------------------------

/// Mock generator — returns a fixed triple or always fails, and counts
/// how many times it was called.
pub struct MockTaskGenerator {
    succeed: bool,
    calls: Cell<u32>,
}

impl MockTaskGenerator {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: Cell::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.get()
    }

    pub fn canned_triple() -> GeneratedTasks {
        GeneratedTasks {
            body: GeneratedTask {
                task: "Take a 15 minute walk after lunch".into(),
                reason: "Light movement helps circulation and energy".into(),
            },
            mind: GeneratedTask {
                task: "Write down one thing on your mind".into(),
                reason: "Naming a worry makes it easier to set aside".into(),
            },
            awareness: GeneratedTask {
                task: "Notice your posture once every hour".into(),
                reason: "Small posture checks reduce neck and back strain".into(),
            },
        }
    }
}

impl TaskGenerator for MockTaskGenerator {
    fn generate(&self, _symptoms: &[StoredSymptom]) -> Result<GeneratedTasks, GeneratorError> {
        self.calls.set(self.calls.get() + 1);
        if self.succeed {
            Ok(Self::canned_triple())
        } else {
            Err(GeneratorError::Connection("http://localhost:9".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GeneratedTasks, GeneratorError> {
        let parsed: DailyTasksResponse = serde_json::from_str(json).unwrap();
        validate_response(parsed)
    }

    #[test]
    fn valid_triple_accepted() {
        let tasks = parse(
            r#"{
                "body": {"task": "Walk", "reason": "Energy"},
                "mind": {"task": "Journal", "reason": "Clarity"},
                "awareness": {"task": "Posture check", "reason": "Strain"}
            }"#,
        )
        .unwrap();
        assert_eq!(tasks.body.task, "Walk");
        assert_eq!(tasks.awareness.reason, "Strain");
    }

    #[test]
    fn missing_slot_rejected() {
        let err = parse(
            r#"{
                "body": {"task": "Walk", "reason": "Energy"},
                "mind": {"task": "Journal", "reason": "Clarity"}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeneratorError::MalformedResponse(_)));
        assert!(err.to_string().contains("awareness"));
    }

    #[test]
    fn empty_task_text_rejected() {
        let err = parse(
            r#"{
                "body": {"task": "  ", "reason": "Energy"},
                "mind": {"task": "Journal", "reason": "Clarity"},
                "awareness": {"task": "Posture", "reason": "Strain"}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeneratorError::MalformedResponse(_)));
    }

    #[test]
    fn missing_reason_rejected() {
        let err = parse(
            r#"{
                "body": {"task": "Walk"},
                "mind": {"task": "Journal", "reason": "Clarity"},
                "awareness": {"task": "Posture", "reason": "Strain"}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeneratorError::MalformedResponse(_)));
    }

    #[test]
    fn remote_generator_trims_trailing_slash() {
        let client = RemoteTaskGenerator::new("https://example.test/", "key");
        assert_eq!(client.base_url, "https://example.test");
    }

    #[test]
    fn mock_counts_calls() {
        let generator = MockTaskGenerator::succeeding();
        assert_eq!(generator.call_count(), 0);
        generator.generate(&[]).unwrap();
        generator.generate(&[]).unwrap();
        assert_eq!(generator.call_count(), 2);
    }

    #[test]
    fn failing_mock_reports_connection_error() {
        let generator = MockTaskGenerator::failing();
        let err = generator.generate(&[]).unwrap_err();
        assert!(matches!(err, GeneratorError::Connection(_)));
        assert_eq!(generator.call_count(), 1);
    }
}
