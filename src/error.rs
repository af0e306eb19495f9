//! Heal Error Types
//!
//! 코어 전역 에러 타입 정의

use serde::Serialize;
use thiserror::Error;

/// Heal 코어 에러
#[derive(Error, Debug)]
pub enum HealError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Message not found: {0}")]
    MessageNotFound(i64),

    #[error("Medical term not found: {0}")]
    TermNotFound(i64),

    #[error("No translation of term {term_id} for language '{language}'")]
    TranslationMissing { term_id: i64, language: String },

    #[error("Term link not found for message {message_id}, term {term_id}")]
    LinkNotFound { message_id: i64, term_id: i64 },

    #[error("Term link row not found: {0}")]
    LinkRowNotFound(i64),

    #[error("Ambiguous link target: message {message_id}, term {term_id} has {count} untranslated mentions")]
    AmbiguousTarget {
        message_id: i64,
        term_id: i64,
        count: usize,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// 서비스 레이어 응답용 직렬화 가능한 에러
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<HealError> for ApiError {
    fn from(error: HealError) -> Self {
        let code = match &error {
            HealError::Database(_) => "DB_ERROR",
            HealError::Io(_) => "IO_ERROR",
            HealError::Serialization(_) => "SERIALIZATION_ERROR",
            HealError::MessageNotFound(_) => "MESSAGE_NOT_FOUND",
            HealError::TermNotFound(_) => "TERM_NOT_FOUND",
            HealError::TranslationMissing { .. } => "TRANSLATION_MISSING",
            HealError::LinkNotFound { .. } => "LINK_NOT_FOUND",
            HealError::LinkRowNotFound(_) => "LINK_NOT_FOUND",
            HealError::AmbiguousTarget { .. } => "AMBIGUOUS_TARGET",
            HealError::Validation(_) => "VALIDATION_ERROR",
            HealError::Consistency(_) => "CONSISTENCY_ERROR",
            HealError::Cancelled => "CANCELLED",
        };

        ApiError {
            code: code.to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

/// 서비스 레이어 결과 타입
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_codes() {
        let err: ApiError = HealError::TermNotFound(7).into();
        assert_eq!(err.code, "TERM_NOT_FOUND");
        assert!(err.message.contains('7'));

        let err: ApiError = HealError::TranslationMissing {
            term_id: 7,
            language: "fr".to_string(),
        }
        .into();
        assert_eq!(err.code, "TRANSLATION_MISSING");

        let err: ApiError = HealError::Validation("name is required".to_string()).into();
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_api_error_serializes() {
        let err: ApiError = HealError::Cancelled.into();
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"CANCELLED\""));
    }
}
