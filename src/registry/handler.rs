//! # Handlers
//!
//! [`Handler`] is the typed capability application code implements: one
//! operation, parameterized by the command type it serves. Tables and sources
//! work with the type-erased [`DynHandler`] so heterogeneous handlers can share
//! one map; [`TypedHandler`] bridges the two.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::command::{AnyCommand, Command, CommandType};
use crate::error::{BoxError, GateError, Result};

/// Result type for handler bodies.
pub type HandlerResult = std::result::Result<(), BoxError>;

/// Executable action for exactly one command type.
///
/// Closures of the shape `Fn(&C) -> HandlerResult` are handlers too.
pub trait Handler<C: Command>: Send + Sync + 'static {
    fn handle(&self, command: &C) -> HandlerResult;
}

impl<C, F> Handler<C> for F
where
    C: Command,
    F: Fn(&C) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, command: &C) -> HandlerResult {
        self(command)
    }
}

/// Type-erased handler bound to one declared command type.
pub trait DynHandler: Send + Sync {
    /// The command type this handler declares it serves.
    fn command_type(&self) -> CommandType;

    /// Handler name for diagnostics.
    fn name(&self) -> &str;

    /// Handle a command whose runtime type must equal [`Self::command_type`].
    fn handle_dyn(&self, command: &dyn AnyCommand) -> Result<()>;
}

/// Shared reference to a handler. Tables hold these; the producing source owns
/// the handler's lifecycle.
pub type HandlerRef = Arc<dyn DynHandler>;

/// Erases a typed [`Handler`] into a [`DynHandler`].
pub struct TypedHandler<C, H> {
    handler: H,
    name: String,
    _command: PhantomData<fn(&C)>,
}

impl<C, H> TypedHandler<C, H>
where
    C: Command,
    H: Handler<C>,
{
    /// Wrap a handler, naming it after its Rust type.
    pub fn new(handler: H) -> Self {
        Self::named(std::any::type_name::<H>(), handler)
    }

    pub fn named(name: impl Into<String>, handler: H) -> Self {
        Self {
            handler,
            name: name.into(),
            _command: PhantomData,
        }
    }

    pub fn into_ref(self) -> HandlerRef {
        Arc::new(self)
    }
}

impl<C, H> DynHandler for TypedHandler<C, H>
where
    C: Command,
    H: Handler<C>,
{
    fn command_type(&self) -> CommandType {
        CommandType::of::<C>()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn handle_dyn(&self, command: &dyn AnyCommand) -> Result<()> {
        let typed = command
            .downcast_ref::<C>()
            .ok_or_else(|| GateError::Argument {
                expected: CommandType::of::<C>(),
                actual: command.command_type(),
            })?;

        self.handler.handle(typed).map_err(GateError::Handler)
    }
}

impl<C, H> std::fmt::Debug for TypedHandler<C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedHandler")
            .field("name", &self.name)
            .field("command_type", &std::any::type_name::<C>())
            .finish()
    }
}

/// Shorthand for `TypedHandler::named(name, handler).into_ref()`.
pub fn handler_ref<C, H>(name: impl Into<String>, handler: H) -> HandlerRef
where
    C: Command,
    H: Handler<C>,
{
    TypedHandler::named(name, handler).into_ref()
}
