//! # Handler Registry Infrastructure
//!
//! Everything between "a command type is known" and "a handler is bound to it".
//!
//! ## Architecture
//!
//! ```text
//! CommandCatalog ──► HandlerMap::build ◄── CompositeHandlerSource
//!                          │                 ├── HandlerRegistry   (explicit registration)
//!                          ▼                 ├── MemberSource      (member adapters)
//!              EagerHandlerTable /           └── ...               (any HandlerSource)
//!              LazyHandlerTable
//! ```
//!
//! The composite enforces the "zero or one handler per type" rule across all
//! children; the table turns a missing handler into a build failure.

pub mod explicit;
pub mod handler;
pub mod source;
pub mod table;

pub use explicit::HandlerRegistry;
pub use handler::{handler_ref, DynHandler, Handler, HandlerRef, HandlerResult, TypedHandler};
pub use source::{CompositeHandlerSource, HandlerSource};
pub use table::{EagerHandlerTable, HandlerMap, HandlerTable, LazyHandlerTable, Lifecycle};
