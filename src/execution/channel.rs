//! Execution Channel abstraction and the two trivial channels.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::command::CommandType;
use crate::config::ChannelKind;
use crate::error::{GateError, Result};
use crate::logging::{log_channel_operation, log_error};

type Work = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// A deferred, zero-argument action handed to an [`ExecutionChannel`].
pub struct UnitOfWork {
    id: Uuid,
    command_type: CommandType,
    submitted_at: DateTime<Utc>,
    work: Work,
}

impl UnitOfWork {
    pub fn new<F>(command_type: CommandType, work: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            command_type,
            submitted_at: Utc::now(),
            work: Box::new(work),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Type of the command this unit will dispatch.
    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Run the unit on the current thread and return its outcome.
    pub fn run(self) -> Result<()> {
        (self.work)()
    }

    /// Run the unit and apply the reference failure policy: log and drop.
    ///
    /// Both an error result and a panic count as failure. A panic stops at
    /// this boundary so the thread running the unit survives it.
    pub fn run_and_report(self, channel: &str) {
        let id = self.id.to_string();
        let context = format!(
            "channel={channel} unit_id={id} command_type={}",
            self.command_type
        );
        let work = self.work;

        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(())) => log_channel_operation("run", channel, Some(&id), "completed", None),
            Ok(Err(e)) => {
                log_error("execution_channel", "run", &e.to_string(), Some(&context));
            }
            Err(payload) => {
                let message = format!(
                    "scheduled command panicked: {}",
                    panic_message(payload.as_ref())
                );
                log_error("execution_channel", "run", &message, Some(&context));
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("id", &self.id)
            .field("command_type", &self.command_type)
            .field("submitted_at", &self.submitted_at)
            .finish()
    }
}

/// Pluggable substrate that runs deferred units of work.
///
/// `accept` reports only whether the unit was taken. What happens when the
/// unit later fails is the channel's own policy.
pub trait ExecutionChannel: Send + Sync {
    fn accept(&self, unit: UnitOfWork) -> Result<()>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Configured kind this channel implements; `None` for host-defined
    /// channels.
    fn kind(&self) -> Option<ChannelKind> {
        None
    }

    /// Pending-unit bound, when the channel has one.
    fn capacity(&self) -> Option<usize> {
        None
    }
}

/// Runs each unit immediately on the submitting thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineChannel;

impl ExecutionChannel for InlineChannel {
    fn accept(&self, unit: UnitOfWork) -> Result<()> {
        unit.run_and_report(self.name());
        Ok(())
    }

    fn name(&self) -> &str {
        "inline"
    }

    fn kind(&self) -> Option<ChannelKind> {
        Some(ChannelKind::Inline)
    }
}

/// Placeholder used when no channel was configured; refuses every unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredChannel;

impl ExecutionChannel for UnconfiguredChannel {
    fn accept(&self, unit: UnitOfWork) -> Result<()> {
        log_channel_operation(
            "accept",
            self.name(),
            Some(&unit.id().to_string()),
            "rejected",
            Some("no execution channel configured"),
        );
        Err(GateError::configuration("command scheduling is not configured"))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }

    fn kind(&self) -> Option<ChannelKind> {
        Some(ChannelKind::None)
    }
}
