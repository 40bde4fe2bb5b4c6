pub mod enums;
pub mod symptom;
pub mod task;

pub use enums::TaskKind;
pub use symptom::{StoredSymptom, SymptomEntry};
pub use task::TaskRecord;
