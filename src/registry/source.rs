//! # Handler Sources
//!
//! A [`HandlerSource`] answers, for one command type, zero or one handler.
//! [`CompositeHandlerSource`] asks every child and enforces the system-wide
//! rule that at most one handler exists per command type, whatever the children
//! individually believe.

use std::sync::Arc;

use tracing::{debug, error};

use crate::command::CommandType;
use crate::error::{GateError, Result};
use crate::registry::handler::HandlerRef;

/// Strategy answering which handler, if any, serves a command type.
///
/// A source may fail with [`GateError::AmbiguousHandler`] for candidates it owns
/// itself; it never judges answers from other sources.
pub trait HandlerSource: Send + Sync {
    fn find(&self, command_type: CommandType) -> Result<Option<HandlerRef>>;

    /// Name used in ambiguity diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Ordered composition of handler sources.
///
/// Every child is queried in registration order and every non-empty answer
/// is collected: none yields `None`, one yields that handler, two or more fail
/// with [`GateError::AmbiguousHandler`]. Order only affects the listing of
/// sources in that error.
#[derive(Clone, Default)]
pub struct CompositeHandlerSource {
    sources: Vec<Arc<dyn HandlerSource>>,
}

impl CompositeHandlerSource {
    pub fn new(sources: Vec<Arc<dyn HandlerSource>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|source| source.name().to_string())
            .collect()
    }
}

impl HandlerSource for CompositeHandlerSource {
    fn find(&self, command_type: CommandType) -> Result<Option<HandlerRef>> {
        let mut answers: Vec<(String, HandlerRef)> = Vec::new();

        for source in &self.sources {
            if let Some(handler) = source.find(command_type)? {
                debug!(
                    command_type = %command_type,
                    source = source.name(),
                    handler = handler.name(),
                    "Source answered with handler"
                );
                answers.push((source.name().to_string(), handler));
            }
        }

        match answers.len() {
            0 => Ok(None),
            1 => Ok(answers.pop().map(|(_, handler)| handler)),
            count => {
                let sources: Vec<String> = answers.into_iter().map(|(name, _)| name).collect();
                error!(
                    command_type = %command_type,
                    answers = count,
                    sources = ?sources,
                    "Multiple sources answered for one command type"
                );
                Err(GateError::AmbiguousHandler {
                    command_type,
                    sources,
                })
            }
        }
    }

    fn name(&self) -> &str {
        "composite"
    }
}

impl std::fmt::Debug for CompositeHandlerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHandlerSource")
            .field("sources", &self.source_names())
            .finish()
    }
}
