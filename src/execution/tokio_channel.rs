//! Reference pool channel backed by a host-owned tokio runtime.

use tokio::runtime::Handle;
use tracing::error;

use crate::config::ChannelKind;
use crate::error::{GateError, Result};
use crate::execution::channel::{ExecutionChannel, UnitOfWork};
use crate::logging::log_channel_operation;

/// Runs units on the blocking pool of a tokio runtime the host owns.
///
/// Handlers are synchronous and may block, so units go through
/// `spawn_blocking` rather than onto the async workers. Failed and panicking
/// units are logged and dropped; a task the runtime cancels is reported once
/// it is joined.
#[derive(Debug, Clone)]
pub struct TokioChannel {
    handle: Handle,
    name: String,
}

impl TokioChannel {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            name: "tokio".to_string(),
        }
    }

    /// Bind to the runtime of the calling context.
    pub fn from_current() -> Result<Self> {
        Handle::try_current().map(Self::new).map_err(|e| {
            GateError::configuration(format!("tokio channel requires a runtime: {e}"))
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl ExecutionChannel for TokioChannel {
    fn accept(&self, unit: UnitOfWork) -> Result<()> {
        let unit_id = unit.id().to_string();
        let command_type = unit.command_type();
        let name = self.name.clone();

        let task = self.handle.spawn_blocking(move || unit.run_and_report(&name));

        let name = self.name.clone();
        let watched_id = unit_id.clone();
        self.handle.spawn(async move {
            if let Err(e) = task.await {
                error!(
                    channel = %name,
                    unit_id = %watched_id,
                    command_type = %command_type,
                    error = %e,
                    "Scheduled command did not complete"
                );
            }
        });

        log_channel_operation("accept", &self.name, Some(&unit_id), "spawned", None);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> Option<ChannelKind> {
        Some(ChannelKind::Tokio)
    }
}
