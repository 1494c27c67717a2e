//! # Execution Channels
//!
//! Substrates that run the deferred units produced by
//! [`DispatchGate::schedule`](crate::gate::DispatchGate::schedule).
//!
//! | channel               | policy                                                |
//! |-----------------------|-------------------------------------------------------|
//! | [`InlineChannel`]     | run on the submitting thread                          |
//! | [`TokioChannel`]      | run on a host-owned tokio runtime's blocking pool     |
//! | [`QueueChannel`]      | queue for [`QueueWorker`]s on host-owned threads      |
//! | [`UnconfiguredChannel`] | refuse: scheduling was never configured             |
//!
//! Every reference channel logs a failed unit at error level and drops it. A
//! unit that panics counts as failed: the panic is caught where the unit runs,
//! so it neither unwinds into `schedule` nor stops a queue worker. None of the
//! channels orders units across submissions, retries or applies timeouts.

pub mod channel;
pub mod queue_channel;
pub mod tokio_channel;

pub use channel::{ExecutionChannel, InlineChannel, UnconfiguredChannel, UnitOfWork};
pub use queue_channel::{QueueChannel, QueueWorker};
pub use tokio_channel::TokioChannel;
