use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Kind of a daily wellness task.
///
/// `Body`, `Mind`, and `Awareness` are the three AI-generated slots;
/// `Fallback` marks canned substitutes written when generation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Body,
    Mind,
    Awareness,
    Fallback,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Mind => "mind",
            Self::Awareness => "awareness",
            Self::Fallback => "fallback",
        }
    }
}

impl std::str::FromStr for TaskKind {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "body" => Ok(Self::Body),
            "mind" => Ok(Self::Mind),
            "awareness" => Ok(Self::Awareness),
            "fallback" => Ok(Self::Fallback),
            _ => Err(DatabaseError::InvalidEnum {
                field: "TaskKind".into(),
                value: s.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_all_variants() {
        for kind in [TaskKind::Body, TaskKind::Mind, TaskKind::Awareness, TaskKind::Fallback] {
            assert_eq!(TaskKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_value_rejected() {
        assert!(TaskKind::from_str("wellness").is_err());
    }
}
