//! Configuration loading errors

use crate::error::GateError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration from {source_name}: {message}")]
    LoadFailed {
        source_name: String,
        message: String,
    },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl ConfigurationError {
    pub fn load_failed(source_name: impl Into<String>, error: config::ConfigError) -> Self {
        Self::LoadFailed {
            source_name: source_name.into(),
            message: error.to_string(),
        }
    }

    pub fn invalid_value(field: &str, value: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ConfigurationError> for GateError {
    fn from(error: ConfigurationError) -> Self {
        GateError::configuration(error.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
