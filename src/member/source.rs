//! Handler source over candidate members of registered owners.

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use crate::command::CommandType;
use crate::error::{GateError, Result};
use crate::member::descriptor::MemberDescriptor;
use crate::member::handler::MemberHandler;
use crate::registry::handler::HandlerRef;
use crate::registry::source::HandlerSource;

struct Candidate {
    owner: Arc<dyn Any + Send + Sync>,
    member: MemberDescriptor,
}

/// Discovers member handlers among explicitly listed owner members.
///
/// For a command type, every candidate whose single parameter is exactly that
/// type becomes a [`MemberHandler`]. Candidates that otherwise fail adapter
/// validation (for example, by returning a value) fail the lookup.
#[derive(Default)]
pub struct MemberSource {
    name: String,
    candidates: Vec<Candidate>,
}

impl MemberSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Vec::new(),
        }
    }

    /// Offer the members of `owner` as handler candidates.
    pub fn with_owner<O>(mut self, owner: Arc<O>, members: Vec<MemberDescriptor>) -> Self
    where
        O: Any + Send + Sync,
    {
        let owner: Arc<dyn Any + Send + Sync> = owner;
        for member in members {
            debug!(source = %self.name, member = %member.reference(), "Added member candidate");
            self.candidates.push(Candidate {
                owner: owner.clone(),
                member,
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl HandlerSource for MemberSource {
    fn find(&self, command_type: CommandType) -> Result<Option<HandlerRef>> {
        let mut handlers: Vec<MemberHandler> = Vec::new();

        for candidate in &self.candidates {
            let accepts = matches!(
                candidate.member.params(),
                [parameter] if parameter.is_command_type(command_type)
            );
            if accepts {
                handlers.push(MemberHandler::new(
                    candidate.owner.clone(),
                    candidate.member.clone(),
                    command_type,
                )?);
            }
        }

        match handlers.len() {
            0 => Ok(None),
            1 => Ok(handlers.pop().map(MemberHandler::into_ref)),
            _ => Err(GateError::AmbiguousHandler {
                command_type,
                sources: handlers
                    .iter()
                    .map(|handler| format!("{}:{}", self.name, handler.member().reference()))
                    .collect(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
