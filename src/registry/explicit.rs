//! # Explicit Handler Registry
//!
//! A [`HandlerSource`] filled by constructor-time registration at program
//! start. Registration never fails; if the same registry receives two handlers
//! for one command type it reports the ambiguity when asked for that type, since
//! it owns both candidates.

use dashmap::DashMap;
use tracing::debug;

use crate::command::{Command, CommandType};
use crate::error::{GateError, Result};
use crate::registry::handler::{Handler, HandlerRef, TypedHandler};
use crate::registry::source::HandlerSource;

/// Handler source backed by explicit registrations.
///
/// ```rust
/// use command_gate::{Command, HandlerRegistry, HandlerResult, HandlerSource, CommandType};
///
/// #[derive(Debug)]
/// struct OrderPlaced {
///     id: u64,
/// }
/// impl Command for OrderPlaced {}
///
/// let registry = HandlerRegistry::new("orders");
/// registry.register(|cmd: &OrderPlaced| -> HandlerResult {
///     println!("placing order {}", cmd.id);
///     Ok(())
/// });
///
/// assert!(registry.find(CommandType::of::<OrderPlaced>()).unwrap().is_some());
/// ```
pub struct HandlerRegistry {
    name: String,
    handlers: DashMap<CommandType, Vec<HandlerRef>>,
}

impl HandlerRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: DashMap::new(),
        }
    }

    /// Register a typed handler for its command type.
    pub fn register<C, H>(&self, handler: H) -> &Self
    where
        C: Command,
        H: Handler<C>,
    {
        self.register_ref(TypedHandler::new(handler).into_ref())
    }

    /// Register a typed handler under an explicit diagnostic name.
    pub fn register_named<C, H>(&self, name: impl Into<String>, handler: H) -> &Self
    where
        C: Command,
        H: Handler<C>,
    {
        self.register_ref(TypedHandler::named(name, handler).into_ref())
    }

    /// Register an already erased handler under the type it declares.
    pub fn register_ref(&self, handler: HandlerRef) -> &Self {
        let command_type = handler.command_type();
        debug!(
            registry = %self.name,
            command_type = %command_type,
            handler = handler.name(),
            "Registered handler"
        );
        self.handlers.entry(command_type).or_default().push(handler);
        self
    }

    pub fn registered_types(&self) -> Vec<CommandType> {
        let mut types: Vec<CommandType> =
            self.handlers.iter().map(|entry| *entry.key()).collect();
        types.sort();
        types
    }

    /// Number of registered handlers, counting duplicates.
    pub fn len(&self) -> usize {
        self.handlers.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerSource for HandlerRegistry {
    fn find(&self, command_type: CommandType) -> Result<Option<HandlerRef>> {
        let Some(entry) = self.handlers.get(&command_type) else {
            return Ok(None);
        };

        match entry.value().as_slice() {
            [] => Ok(None),
            [handler] => Ok(Some(handler.clone())),
            candidates => Err(GateError::AmbiguousHandler {
                command_type,
                sources: candidates
                    .iter()
                    .map(|handler| format!("{}:{}", self.name, handler.name()))
                    .collect(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("name", &self.name)
            .field("types", &self.registered_types())
            .finish()
    }
}
