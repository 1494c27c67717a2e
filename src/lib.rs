#![allow(clippy::doc_markdown)] // Allow technical terms like TypeId, tokio in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Command Gate
//!
//! In-process command dispatch: every known command type is bound to exactly
//! one handler, and commands are either dispatched on the calling thread or
//! scheduled onto a pluggable execution channel.
//!
//! ## Architecture
//!
//! ```text
//!   CommandCatalog ─┐
//!                   ├─► HandlerTable (eager | lazy) ─┐
//!   HandlerSource* ─┘    one handler per type         ├─► DispatchGate ─► dispatch (caller thread)
//!                                                     │                └► schedule ─► ExecutionChannel
//!   ExecutionChannel ─────────────────────────────────┘
//! ```
//!
//! Handler sources are composed; if two of them answer for the same command
//! type the table refuses to build, and so does a type nobody answers for.
//! Nothing partially resolved is ever exposed.
//!
//! ## Module Organization
//!
//! - [`command`] - Command marker trait and the nominal `CommandType` key
//! - [`catalog`] - Sets of known command types and their unions
//! - [`registry`] - Handlers, handler sources, and the validated handler tables
//! - [`member`] - Handlers built from owner members, with signature validation
//! - [`execution`] - Execution channels for scheduled commands
//! - [`gate`] - The dispatch façade and its builder
//! - [`config`] - File and environment configuration
//! - [`logging`] - Structured logging setup and helpers
//! - [`error`] - Gate error taxonomy
//!
//! ## Quick Start
//!
//! ```rust
//! use command_gate::{Command, DispatchGate, HandlerRegistry, HandlerResult};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct OrderPlaced {
//!     id: u64,
//! }
//! impl Command for OrderPlaced {}
//!
//! let registry = HandlerRegistry::new("orders");
//! registry.register(|cmd: &OrderPlaced| -> HandlerResult {
//!     assert_eq!(cmd.id, 7);
//!     Ok(())
//! });
//!
//! let gate = DispatchGate::builder()
//!     .add_type::<OrderPlaced>()
//!     .add_source(Arc::new(registry))
//!     .build()?
//!     .gate;
//!
//! gate.dispatch(OrderPlaced { id: 7 })?;
//! # Ok::<(), command_gate::GateError>(())
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                          # Unit tests
//! cargo test                                # All tests
//! cargo bench --features benchmarks         # Dispatch benchmarks
//! ```

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod execution;
pub mod gate;
pub mod logging;
pub mod member;
pub mod registry;

pub use catalog::{CatalogUnion, CommandCatalog, TypeCatalog};
pub use command::{AnyCommand, Command, CommandType};
pub use config::{ChannelKind, ConfigManager, GateConfig, TableMode};
pub use error::{BoxError, GateError, Result};
pub use execution::{
    ExecutionChannel, InlineChannel, QueueChannel, QueueWorker, TokioChannel, UnconfiguredChannel,
    UnitOfWork,
};
pub use gate::{DispatchGate, GateAssembly, GateBuilder, LifecycleHandle};
pub use member::{MemberDescriptor, MemberHandler, MemberSource, TypeDescriptor};
pub use registry::{
    handler_ref, CompositeHandlerSource, DynHandler, EagerHandlerTable, Handler, HandlerMap,
    HandlerRef, HandlerRegistry, HandlerResult, HandlerSource, HandlerTable, LazyHandlerTable,
    Lifecycle, TypedHandler,
};
