//! # Dispatch Gate
//!
//! The call surface producers use. `dispatch` runs the bound handler on the
//! calling thread and returns its outcome; `schedule` wraps that same dispatch
//! into a [`UnitOfWork`] and hands it to the configured [`ExecutionChannel`].

pub mod builder;

use std::sync::Arc;
use std::time::Instant;

use crate::command::{AnyCommand, Command, CommandType};
use crate::error::Result;
use crate::execution::{ExecutionChannel, UnitOfWork};
use crate::logging::log_dispatch_operation;
use crate::registry::table::HandlerTable;

pub use builder::{GateAssembly, GateBuilder, LifecycleHandle};

/// Façade over a handler table and an execution channel.
///
/// Cheap to clone; clones share the table and the channel.
#[derive(Clone)]
pub struct DispatchGate {
    table: Arc<dyn HandlerTable>,
    channel: Arc<dyn ExecutionChannel>,
}

impl DispatchGate {
    pub fn new(table: Arc<dyn HandlerTable>, channel: Arc<dyn ExecutionChannel>) -> Self {
        Self { table, channel }
    }

    pub fn builder() -> GateBuilder {
        GateBuilder::new()
    }

    /// Run the handler for `command` on this thread.
    ///
    /// Returns once the handler body has finished. A handler failure comes
    /// back as [`GateError::Handler`](crate::GateError::Handler) holding the
    /// handler's own error.
    pub fn dispatch<C: Command>(&self, command: C) -> Result<()> {
        self.dispatch_dyn(&command)
    }

    /// [`dispatch`](Self::dispatch) for a type-erased command.
    pub fn dispatch_dyn(&self, command: &dyn AnyCommand) -> Result<()> {
        let command_type = command.command_type();
        let handler = self.table.get(command_type)?;

        let started = Instant::now();
        let result = handler.handle_dyn(command);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        log_dispatch_operation(
            "dispatch",
            command_type.name(),
            Some(handler.name()),
            if result.is_ok() { "completed" } else { "failed" },
            Some(elapsed_ms),
        );
        result
    }

    /// Submit `command` for deferred dispatch and return without waiting.
    ///
    /// The result only reports whether the channel took the unit. Failures of
    /// the deferred dispatch itself are handled by the channel.
    pub fn schedule<C: Command>(&self, command: C) -> Result<()> {
        let command_type = CommandType::of::<C>();
        let gate = self.clone();
        let unit = UnitOfWork::new(command_type, move || gate.dispatch(command));

        log_dispatch_operation("schedule", command_type.name(), None, "submitted", None);
        self.channel.accept(unit)
    }

    pub fn is_ready(&self) -> bool {
        self.table.is_ready()
    }

    /// Command types the underlying table serves.
    pub fn command_types(&self) -> Result<Vec<CommandType>> {
        self.table.command_types()
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }
}

impl std::fmt::Debug for DispatchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchGate")
            .field("ready", &self.is_ready())
            .field("channel", &self.channel.name())
            .finish()
    }
}
