use serde::{Deserialize, Serialize};

use super::enums::TaskKind;

/// A single daily wellness task as shown to the user.
///
/// Persisted under the composite key (user, local day, id). The id is the
/// slot name for real tasks (`body`, `mind`, `awareness`), `fallback_<n>`
/// for canned substitutes, or `guest` for the ephemeral non-persisted case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub task: String,
    pub reason: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub created_at: String,
}

impl TaskRecord {
    pub fn is_fallback(&self) -> bool {
        self.kind == TaskKind::Fallback
    }
}
