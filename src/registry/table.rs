//! # Handler Tables
//!
//! A handler table maps every command type in its catalog to exactly one
//! handler. The build is all-or-nothing: the first type with no handler, or
//! with competing handlers, aborts it and nothing partial is kept.
//!
//! Two lifecycle variants exist:
//!
//! - [`EagerHandlerTable`] builds inside its constructor and is Ready for life.
//! - [`LazyHandlerTable`] builds on [`Lifecycle::start`], can be stopped and
//!   started again, and answers [`GateError::NotReady`] in between.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::catalog::CommandCatalog;
use crate::command::CommandType;
use crate::error::{GateError, Result};
use crate::logging::{log_error, log_table_operation};
use crate::registry::handler::HandlerRef;
use crate::registry::source::HandlerSource;

/// Validated, immutable type-to-handler mapping.
#[derive(Clone)]
pub struct HandlerMap {
    handlers: HashMap<CommandType, HandlerRef>,
}

impl HandlerMap {
    /// Resolve every catalog type through `source`.
    ///
    /// Types are resolved in name order so failures are reported
    /// deterministically.
    pub fn build(catalog: &dyn CommandCatalog, source: &dyn HandlerSource) -> Result<Self> {
        let started = Instant::now();
        let mut command_types: Vec<CommandType> = catalog.types().into_iter().collect();
        command_types.sort();

        info!(
            command_types = command_types.len(),
            source = source.name(),
            "Building handler table"
        );

        let mut handlers = HashMap::with_capacity(command_types.len());
        for command_type in command_types {
            let handler = Self::resolve(source, command_type).inspect_err(|e| {
                let context = format!("command_type={command_type} source={}", source.name());
                log_error("handler_table", "build", &e.to_string(), Some(&context));
            })?;
            handlers.insert(command_type, handler);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        log_table_operation("build", handlers.len(), "ready", Some(elapsed_ms), None);

        Ok(Self { handlers })
    }

    fn resolve(source: &dyn HandlerSource, command_type: CommandType) -> Result<HandlerRef> {
        let handler = source
            .find(command_type)?
            .ok_or(GateError::MissingHandler { command_type })?;

        if handler.command_type() != command_type {
            return Err(GateError::internal(format!(
                "source {} answered for {} with handler {} declared for {}",
                source.name(),
                command_type,
                handler.name(),
                handler.command_type()
            )));
        }

        debug!(
            command_type = %command_type,
            handler = handler.name(),
            "Resolved handler"
        );
        Ok(handler)
    }

    pub fn get(&self, command_type: CommandType) -> Result<HandlerRef> {
        let handler = self
            .handlers
            .get(&command_type)
            .ok_or(GateError::MissingHandler { command_type })?;

        if handler.command_type() != command_type {
            return Err(GateError::internal(format!(
                "handler {} bound to {} declares {}",
                handler.name(),
                command_type,
                handler.command_type()
            )));
        }

        Ok(handler.clone())
    }

    pub fn command_types(&self) -> Vec<CommandType> {
        let mut types: Vec<CommandType> = self.handlers.keys().copied().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.command_types()
                    .into_iter()
                    .filter_map(|t| self.handlers.get(&t).map(|h| (t, h.name().to_string()))),
            )
            .finish()
    }
}

/// Read side of a handler table, as seen by the dispatch gate.
pub trait HandlerTable: Send + Sync {
    /// Look up the handler for `command_type`.
    ///
    /// Fails with [`GateError::NotReady`] before the table is built, even for
    /// catalog types, and with [`GateError::MissingHandler`] for unknown types.
    fn get(&self, command_type: CommandType) -> Result<HandlerRef>;

    fn is_ready(&self) -> bool;

    fn command_types(&self) -> Result<Vec<CommandType>>;
}

/// Table built during construction.
#[derive(Debug)]
pub struct EagerHandlerTable {
    map: HandlerMap,
}

impl EagerHandlerTable {
    pub fn new(catalog: &dyn CommandCatalog, source: &dyn HandlerSource) -> Result<Self> {
        Ok(Self {
            map: HandlerMap::build(catalog, source)?,
        })
    }

    pub fn map(&self) -> &HandlerMap {
        &self.map
    }
}

impl HandlerTable for EagerHandlerTable {
    fn get(&self, command_type: CommandType) -> Result<HandlerRef> {
        self.map.get(command_type)
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn command_types(&self) -> Result<Vec<CommandType>> {
        Ok(self.map.command_types())
    }
}

/// Start/stop capability pair delivered by a host lifecycle manager.
pub trait Lifecycle: Send + Sync {
    /// Transition to Ready. A no-op while already Ready.
    fn start(&self) -> Result<()>;

    /// Transition back to NotReady.
    fn stop(&self);

    fn is_running(&self) -> bool;
}

/// Table built on an explicit start signal.
///
/// Transitions are serialized by a mutex; lookups only take the shared side
/// of the state lock.
pub struct LazyHandlerTable {
    catalog: Arc<dyn CommandCatalog>,
    source: Arc<dyn HandlerSource>,
    transition: Mutex<()>,
    state: RwLock<Option<Arc<HandlerMap>>>,
}

impl LazyHandlerTable {
    pub fn new(catalog: Arc<dyn CommandCatalog>, source: Arc<dyn HandlerSource>) -> Self {
        Self {
            catalog,
            source,
            transition: Mutex::new(()),
            state: RwLock::new(None),
        }
    }

    fn current(&self) -> Result<Arc<HandlerMap>> {
        self.state.read().clone().ok_or(GateError::NotReady)
    }
}

impl Lifecycle for LazyHandlerTable {
    fn start(&self) -> Result<()> {
        let _transition = self.transition.lock();

        if self.state.read().is_some() {
            debug!("Handler table already running, start ignored");
            return Ok(());
        }

        let map = HandlerMap::build(self.catalog.as_ref(), self.source.as_ref())?;
        info!(handlers = map.len(), "Handler table started");
        *self.state.write() = Some(Arc::new(map));
        Ok(())
    }

    fn stop(&self) {
        let _transition = self.transition.lock();

        if self.state.write().take().is_some() {
            log_table_operation("stop", 0, "not_ready", None, None);
        }
    }

    fn is_running(&self) -> bool {
        self.state.read().is_some()
    }
}

impl HandlerTable for LazyHandlerTable {
    fn get(&self, command_type: CommandType) -> Result<HandlerRef> {
        self.current()?.get(command_type)
    }

    fn is_ready(&self) -> bool {
        self.is_running()
    }

    fn command_types(&self) -> Result<Vec<CommandType>> {
        Ok(self.current()?.command_types())
    }
}

impl std::fmt::Debug for LazyHandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyHandlerTable")
            .field("source", &self.source.name())
            .field("running", &self.is_running())
            .finish()
    }
}
