//! Domain-level error taxonomy for AOS.

/// Errors produced by configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// AOS domain errors.
#[derive(Debug, thiserror::Error)]
pub enum AosError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("invalid readiness review: {0}")]
    InvalidReview(String),

    #[error("audit log error: {0}")]
    AuditLog(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("event bus error: {0}")]
    Bus(#[from] crate::events::BusError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for AOS domain operations.
pub type Result<T> = std::result::Result<T, AosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aos_error_display() {
        let err = AosError::AgentNotFound("CFO".to_string());
        assert!(err.to_string().contains("agent not found"));
        assert!(err.to_string().contains("CFO"));

        let err = AosError::AuditLog("log closed".to_string());
        assert!(err.to_string().contains("audit log error"));
    }

    #[test]
    fn test_digest_mismatch_error() {
        let err = AosError::DigestMismatch {
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }

    #[test]
    fn test_config_error_wraps() {
        let err: AosError = ConfigError::InvalidValue {
            field: "reasoning.max_iterations".into(),
            reason: "must be at least 1".into(),
        }
        .into();
        assert!(err.to_string().contains("reasoning.max_iterations"));
    }
}
