use serde::{Deserialize, Serialize};

/// Input for recording a new symptom entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub text: String,
    pub notes: Option<String>,
    pub severity: u8, // 1..=5
}

/// Stored symptom entry, newest-first in history queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSymptom {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub notes: Option<String>,
    pub severity: u8,
    pub created_at: String,
}
