//! # Gate Errors
//!
//! One error type covers wiring, table build, lookup and handler execution.
//! Handler failures travel inside [`GateError::Handler`] untouched: the variant is
//! transparent, so `Display` and `source()` are those of the handler's own error
//! and the original value can be taken back out with
//! [`GateError::into_handler_error`].

use crate::command::CommandType;

/// Error type returned by handler bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Malformed wiring: invalid adapter target, bad builder input, missing channel.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("No handler found for command type {command_type}")]
    MissingHandler { command_type: CommandType },

    #[error("More than one handler found for command type {command_type} (sources: {})", sources.join(", "))]
    AmbiguousHandler {
        command_type: CommandType,
        sources: Vec<String>,
    },

    #[error("Handler table is not ready")]
    NotReady,

    /// Command's runtime type differs from the handler's declared type.
    #[error("Wrong command type {actual} received by a handler for command type {expected}")]
    Argument {
        expected: CommandType,
        actual: CommandType,
    },

    #[error("Internal invariant violated: {reason}")]
    Internal { reason: String },

    #[error("Execution channel {channel} rejected unit of work: {reason}")]
    ChannelRejected { channel: String, reason: String },

    #[error(transparent)]
    Handler(BoxError),
}

impl GateError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// True for failures raised by handler logic rather than by the gate itself.
    pub fn is_handler_error(&self) -> bool {
        matches!(self, Self::Handler(_))
    }

    /// Borrow the handler's error as its concrete type, if this is one.
    pub fn handler_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Handler(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Recover the error exactly as the handler returned it.
    pub fn into_handler_error(self) -> Option<BoxError> {
        match self {
            Self::Handler(inner) => Some(inner),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
