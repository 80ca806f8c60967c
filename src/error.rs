//! Error types for the tagmail crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TagmailError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TagmailError {
    #[error("Malformed rule on line {line} ({content:?}): {reason}")]
    MalformedRule {
        line: usize,
        content: String,
        reason: String,
    },
    #[error("Render error: {0}")]
    RenderError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("YAML parsing error: {0}")]
    YamlError(String),
    #[error("JSON parsing error: {0}")]
    JsonError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Delivery error: {0}")]
    DeliveryError(String),
}

impl TagmailError {
    pub fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        TagmailError::MalformedRule {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the rule text rather than the environment.
    pub fn is_malformed_rule(&self) -> bool {
        matches!(self, TagmailError::MalformedRule { .. })
    }
}

impl From<std::io::Error> for TagmailError {
    fn from(err: std::io::Error) -> Self {
        TagmailError::IoError(err.to_string())
    }
}

impl From<serde_yaml::Error> for TagmailError {
    fn from(err: serde_yaml::Error) -> Self {
        TagmailError::YamlError(err.to_string())
    }
}

impl From<serde_json::Error> for TagmailError {
    fn from(err: serde_json::Error) -> Self {
        TagmailError::JsonError(err.to_string())
    }
}
