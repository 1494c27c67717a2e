//! Shared commands and handlers for the integration suites.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use command_gate::{Command, CommandType, HandlerRegistry, HandlerResult};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub id: u64,
}
impl Command for OrderPlaced {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCancelled {
    pub id: u64,
}
impl Command for OrderCancelled {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub millis: u64,
}
impl Command for RebuildReport {}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("order {order_id} was rejected: {reason}")]
pub struct OrderRejected {
    pub order_id: u64,
    pub reason: String,
}

/// Handler factory that records every command it sees, in order.
pub struct Recorder<C> {
    seen: Arc<Mutex<Vec<C>>>,
}

impl<C: Command + Clone> Recorder<C> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn handler(&self) -> impl Fn(&C) -> HandlerResult + Send + Sync + 'static {
        let seen = self.seen.clone();
        move |command: &C| {
            seen.lock().push(command.clone());
            Ok(())
        }
    }

    pub fn seen(&self) -> Vec<C> {
        self.seen.lock().clone()
    }
}

impl<C> Clone for Recorder<C> {
    fn clone(&self) -> Self {
        Self {
            seen: self.seen.clone(),
        }
    }
}

/// Handler for [`RebuildReport`] that sleeps, then raises a completion flag.
pub fn slow_report_handler(
    finished: Arc<AtomicBool>,
) -> impl Fn(&RebuildReport) -> HandlerResult + Send + Sync + 'static {
    move |report: &RebuildReport| {
        std::thread::sleep(Duration::from_millis(report.millis));
        finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Registry answering for both order commands.
pub fn order_registry(
    placed: &Recorder<OrderPlaced>,
    cancelled: &Recorder<OrderCancelled>,
) -> HandlerRegistry {
    let registry = HandlerRegistry::new("orders");
    registry
        .register_named("place_order", placed.handler())
        .register_named("cancel_order", cancelled.handler());
    registry
}

/// A family of distinct command types for property tests.
#[derive(Debug)]
pub struct Tagged<const N: usize>;
impl<const N: usize> Command for Tagged<N> {}

pub const TAGGED_POOL: usize = 8;

fn accept<C: Command>(_: &C) -> HandlerResult {
    Ok(())
}

pub fn tagged_type(index: usize) -> CommandType {
    match index {
        0 => CommandType::of::<Tagged<0>>(),
        1 => CommandType::of::<Tagged<1>>(),
        2 => CommandType::of::<Tagged<2>>(),
        3 => CommandType::of::<Tagged<3>>(),
        4 => CommandType::of::<Tagged<4>>(),
        5 => CommandType::of::<Tagged<5>>(),
        6 => CommandType::of::<Tagged<6>>(),
        7 => CommandType::of::<Tagged<7>>(),
        _ => panic!("tagged pool holds {TAGGED_POOL} types, asked for {index}"),
    }
}

/// Register a handler for `Tagged<index>` under `name`.
pub fn register_tagged(registry: &HandlerRegistry, index: usize, name: String) {
    match index {
        0 => registry.register_named(name, accept::<Tagged<0>>),
        1 => registry.register_named(name, accept::<Tagged<1>>),
        2 => registry.register_named(name, accept::<Tagged<2>>),
        3 => registry.register_named(name, accept::<Tagged<3>>),
        4 => registry.register_named(name, accept::<Tagged<4>>),
        5 => registry.register_named(name, accept::<Tagged<5>>),
        6 => registry.register_named(name, accept::<Tagged<6>>),
        7 => registry.register_named(name, accept::<Tagged<7>>),
        _ => panic!("tagged pool holds {TAGGED_POOL} types, asked for {index}"),
    };
}
