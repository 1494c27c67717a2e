//! One-shot assembly of a [`DispatchGate`].
//!
//! ```rust
//! use command_gate::{Command, DispatchGate, HandlerRegistry, HandlerResult, InlineChannel};
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
//!     println!("placing order {}", cmd.id);
//!     Ok(())
//! });
//!
//! let assembly = DispatchGate::builder()
//!     .add_type::<OrderPlaced>()
//!     .add_source(Arc::new(registry))
//!     .channel(Arc::new(InlineChannel))
//!     .build()
//!     .unwrap();
//!
//! assembly.gate.dispatch(OrderPlaced { id: 7 }).unwrap();
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{CatalogUnion, CommandCatalog, TypeCatalog};
use crate::command::{Command, CommandType};
use crate::config::{ChannelConfig, ChannelKind, GateConfig, TableMode};
use crate::error::{GateError, Result};
use crate::execution::{
    ExecutionChannel, InlineChannel, QueueChannel, QueueWorker, TokioChannel, UnconfiguredChannel,
};
use crate::gate::DispatchGate;
use crate::registry::source::{CompositeHandlerSource, HandlerSource};
use crate::registry::table::{EagerHandlerTable, HandlerTable, LazyHandlerTable, Lifecycle};

/// Collects catalogs, handler sources, the table mode and the execution
/// channel, then builds a gate exactly once.
#[derive(Default)]
pub struct GateBuilder {
    catalogs: Vec<Arc<dyn CommandCatalog>>,
    types: TypeCatalog,
    sources: Vec<Arc<dyn HandlerSource>>,
    mode: TableMode,
    channel: Option<Arc<dyn ExecutionChannel>>,
    configured_channel: Option<ChannelConfig>,
}

/// Name of the queue channel the builder creates from configuration.
pub const CONFIGURED_QUEUE_NAME: &str = "queue";

/// Result of [`GateBuilder::build`].
#[derive(Debug)]
pub struct GateAssembly {
    pub gate: DispatchGate,
    /// Present only for a lazily built table; the host drives it.
    pub lifecycle: Option<LifecycleHandle>,
    /// Draining side of the queue channel built from configuration. The host
    /// runs it on its own threads.
    pub worker: Option<QueueWorker>,
}

/// Start/stop capability pair of a lazily built gate.
#[derive(Clone)]
pub struct LifecycleHandle {
    table: Arc<LazyHandlerTable>,
}

impl GateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog to the union of known command types.
    pub fn add_catalog(mut self, catalog: Arc<dyn CommandCatalog>) -> Self {
        self.catalogs.push(catalog);
        self
    }

    pub fn add_type<C: Command>(mut self) -> Self {
        self.types.insert(CommandType::of::<C>());
        self
    }

    pub fn add_types(mut self, types: impl IntoIterator<Item = CommandType>) -> Self {
        for command_type in types {
            self.types.insert(command_type);
        }
        self
    }

    /// Forget the types added with [`add_type`](Self::add_type) and
    /// [`add_types`](Self::add_types). Added catalogs are kept.
    pub fn clear_types(mut self) -> Self {
        self.types = TypeCatalog::new();
        self
    }

    /// Append a handler source.
    pub fn add_source(mut self, source: Arc<dyn HandlerSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Insert a handler source at `position` (at most the current count).
    pub fn insert_source(mut self, position: usize, source: Arc<dyn HandlerSource>) -> Result<Self> {
        if position > self.sources.len() {
            return Err(GateError::configuration(format!(
                "Source position {position} cannot be greater than source list size {}",
                self.sources.len()
            )));
        }
        self.sources.insert(position, source);
        Ok(self)
    }

    pub fn table_mode(mut self, mode: TableMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn channel(mut self, channel: Arc<dyn ExecutionChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Apply file or environment configuration.
    ///
    /// The table mode is taken as is. The channel section is resolved by
    /// [`build`](Self::build), independent of call order:
    ///
    /// - a channel passed to [`channel`](Self::channel) is used, and must
    ///   implement the configured kind (and, for a queue, the configured
    ///   capacity) unless the kind is `none`;
    /// - otherwise `inline` builds an [`InlineChannel`], `tokio` binds a
    ///   [`TokioChannel`] to the runtime current at build time, and `queue`
    ///   builds a [`QueueChannel`] whose worker is returned in
    ///   [`GateAssembly::worker`].
    pub fn with_config(mut self, config: &GateConfig) -> Result<Self> {
        config.validate()?;
        self.mode = config.table.mode;
        self.configured_channel = Some(config.channel.clone());
        Ok(self)
    }

    /// Build the gate. An eager table is built here and any resolution
    /// failure aborts the whole assembly.
    pub fn build(self) -> Result<GateAssembly> {
        let (channel, worker) = resolve_channel(self.channel, self.configured_channel.as_ref())?;

        let mut catalogs = self.catalogs;
        if !self.types.is_empty() {
            catalogs.push(Arc::new(self.types));
        }
        let catalog = CatalogUnion::new(catalogs);
        let source = CompositeHandlerSource::new(self.sources);

        info!(
            catalogs = catalog.len(),
            sources = source.len(),
            mode = ?self.mode,
            channel = channel.name(),
            "Assembling dispatch gate"
        );

        match self.mode {
            TableMode::Eager => {
                let table: Arc<dyn HandlerTable> =
                    Arc::new(EagerHandlerTable::new(&catalog, &source)?);
                Ok(GateAssembly {
                    gate: DispatchGate::new(table, channel),
                    lifecycle: None,
                    worker,
                })
            }
            TableMode::Lazy => {
                let table = Arc::new(LazyHandlerTable::new(Arc::new(catalog), Arc::new(source)));
                Ok(GateAssembly {
                    gate: DispatchGate::new(table.clone(), channel),
                    lifecycle: Some(LifecycleHandle { table }),
                    worker,
                })
            }
        }
    }
}

type ResolvedChannel = (Arc<dyn ExecutionChannel>, Option<QueueWorker>);

fn resolve_channel(
    supplied: Option<Arc<dyn ExecutionChannel>>,
    configured: Option<&ChannelConfig>,
) -> Result<ResolvedChannel> {
    let Some(config) = configured.filter(|c| c.kind != ChannelKind::None) else {
        let channel: Arc<dyn ExecutionChannel> = match supplied {
            Some(channel) => channel,
            None => Arc::new(UnconfiguredChannel),
        };
        return Ok((channel, None));
    };

    if let Some(channel) = supplied {
        check_supplied_channel(channel.as_ref(), config)?;
        debug!(channel = channel.name(), kind = ?config.kind, "Using host supplied channel");
        return Ok((channel, None));
    }

    let mut worker = None;
    let channel: Arc<dyn ExecutionChannel> = match config.kind {
        ChannelKind::Inline => Arc::new(InlineChannel),
        ChannelKind::Tokio => Arc::new(TokioChannel::from_current()?),
        ChannelKind::Queue => {
            let (queue, queue_worker) = match config.queue_capacity {
                Some(capacity) => QueueChannel::bounded(CONFIGURED_QUEUE_NAME, capacity)?,
                None => QueueChannel::unbounded(CONFIGURED_QUEUE_NAME),
            };
            worker = Some(queue_worker);
            Arc::new(queue)
        }
        ChannelKind::None => Arc::new(UnconfiguredChannel),
    };
    debug!(channel = channel.name(), kind = ?config.kind, "Built configured channel");
    Ok((channel, worker))
}

fn check_supplied_channel(channel: &dyn ExecutionChannel, config: &ChannelConfig) -> Result<()> {
    if channel.kind() != Some(config.kind) {
        return Err(GateError::configuration(format!(
            "channel kind {:?} is configured but the supplied channel {} implements {:?}",
            config.kind,
            channel.name(),
            channel.kind()
        )));
    }

    if config.kind == ChannelKind::Queue && channel.capacity() != config.queue_capacity {
        return Err(GateError::configuration(format!(
            "queue capacity {:?} is configured but the supplied queue {} has capacity {:?}",
            config.queue_capacity,
            channel.name(),
            channel.capacity()
        )));
    }

    Ok(())
}

impl GateAssembly {
    /// Split into the gate and its lifecycle handle.
    ///
    /// Take [`worker`](Self::worker) first when the configuration asked for a
    /// queue channel; dropping it leaves the queue with no workers.
    pub fn into_parts(self) -> (DispatchGate, Option<LifecycleHandle>) {
        (self.gate, self.lifecycle)
    }

    pub fn take_worker(&mut self) -> Option<QueueWorker> {
        self.worker.take()
    }
}

impl Lifecycle for LifecycleHandle {
    fn start(&self) -> Result<()> {
        self.table.start()
    }

    fn stop(&self) {
        self.table.stop()
    }

    fn is_running(&self) -> bool {
        self.table.is_running()
    }
}

impl std::fmt::Debug for LifecycleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHandle")
            .field("running", &self.is_running())
            .finish()
    }
}
