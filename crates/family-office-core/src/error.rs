use thiserror::Error;

#[derive(Debug, Error)]
pub enum FamilyOfficeError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid bracket table: bracket {index}: {reason}")]
    InvalidBracketTable { index: usize, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FamilyOfficeError {
    fn from(e: serde_json::Error) -> Self {
        FamilyOfficeError::SerializationError(e.to_string())
    }
}
