//! Handler adapter over a single owner member.

use std::any::Any;
use std::panic;
use std::sync::Arc;

use tracing::warn;

use crate::command::{AnyCommand, Command, CommandType};
use crate::error::{BoxError, GateError, Result};
use crate::member::descriptor::{InvocationFailure, MemberDescriptor, MemberFault};
use crate::registry::handler::{DynHandler, HandlerRef};

/// Generic wrapper for member failures outside the ordinary error channel.
#[derive(Debug, thiserror::Error)]
#[error("Command handler member {member} failed: {source}")]
pub struct MemberInvocationError {
    pub member: String,
    #[source]
    pub source: BoxError,
}

/// Handler that invokes one member of an owner value.
///
/// The member's signature is checked when the adapter is built: exactly one
/// parameter, whose type is exactly the declared command type, and no return
/// value. At call time the command's runtime type must equal the declared
/// command type.
pub struct MemberHandler {
    owner: Arc<dyn Any + Send + Sync>,
    member: MemberDescriptor,
    command_type: CommandType,
    reference: String,
}

impl MemberHandler {
    pub fn new(
        owner: Arc<dyn Any + Send + Sync>,
        member: MemberDescriptor,
        command_type: CommandType,
    ) -> Result<Self> {
        Self::validate(owner.as_ref(), &member, command_type)?;

        Ok(Self {
            reference: member.reference(),
            owner,
            member,
            command_type,
        })
    }

    pub fn for_command<C: Command>(
        owner: Arc<dyn Any + Send + Sync>,
        member: MemberDescriptor,
    ) -> Result<Self> {
        Self::new(owner, member, CommandType::of::<C>())
    }

    pub fn into_ref(self) -> HandlerRef {
        Arc::new(self)
    }

    pub fn member(&self) -> &MemberDescriptor {
        &self.member
    }

    fn validate(
        owner: &(dyn Any + Send + Sync),
        member: &MemberDescriptor,
        command_type: CommandType,
    ) -> Result<()> {
        let reference = member.reference();

        if owner.type_id() != member.owner_type().id() {
            return Err(GateError::configuration(format!(
                "Command handler member {reference} cannot be bound to an owner of a different type"
            )));
        }

        if let Some(returns) = member.returns() {
            return Err(GateError::configuration(format!(
                "Command handler member {reference} must not return a value (returns {returns})"
            )));
        }

        let [parameter] = member.params() else {
            return Err(GateError::configuration(format!(
                "Command handler member {reference} should have exactly one parameter but has {}",
                member.params().len()
            )));
        };

        if !parameter.is_command_type(command_type) {
            return Err(GateError::configuration(format!(
                "Parameter of the command handler member {reference} should be of type {command_type} but is of type {parameter}"
            )));
        }

        Ok(())
    }

    /// Peel the single invocation envelope and restore the member's own failure.
    fn translate(&self, failure: InvocationFailure) -> GateError {
        match failure {
            InvocationFailure::Target(MemberFault::Runtime(cause)) => GateError::Handler(cause),
            InvocationFailure::Target(MemberFault::Fatal(payload)) => {
                warn!(member = %self.reference, "Command handler member panicked, resuming unwind");
                panic::resume_unwind(payload)
            }
            InvocationFailure::Target(MemberFault::Checked(cause)) => {
                GateError::Handler(Box::new(MemberInvocationError {
                    member: self.reference.clone(),
                    source: cause,
                }))
            }
            InvocationFailure::Inaccessible(reason) => GateError::internal(format!(
                "command handler member {} is not callable: {reason}",
                self.reference
            )),
        }
    }
}

impl DynHandler for MemberHandler {
    fn command_type(&self) -> CommandType {
        self.command_type
    }

    fn name(&self) -> &str {
        &self.reference
    }

    fn handle_dyn(&self, command: &dyn AnyCommand) -> Result<()> {
        let actual = command.command_type();
        if actual != self.command_type {
            return Err(GateError::Argument {
                expected: self.command_type,
                actual,
            });
        }

        self.member
            .invoke(self.owner.as_ref(), &[command.as_any()])
            .map(|_| ())
            .map_err(|failure| self.translate(failure))
    }
}

impl std::fmt::Debug for MemberHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberHandler")
            .field("member", &self.reference)
            .field("command_type", &self.command_type)
            .finish()
    }
}
